//! # Storefront
//!
//! Order management for a small storefront: products with stock levels,
//! orders that consume that stock, and a status lifecycle that gives stock
//! back when an order is cancelled or removed.
//!
//! ## Layout
//!
//! - **Foundation**
//!     - **Entity store** - JSON file per collection, loaded lazily and written atomically → [`store::JsonFileStore`]
//!     - **Domain types** - Plain serde structs with an embedded audit block → [`domain::Product`], [`domain::Order`], [`domain::Record`]
//! - **Actors**
//!     - **Generic resource actor** - One task per collection; every request is handled to completion before the next → [`actor_framework::ResourceActor`]
//!     - **Entity hooks** - Validation, conflict checks and custom actions per entity → [`actor_framework::Entity`]
//! - **Clients**
//!     - **Product client** - CRUD plus atomic stock actions, exposed as an [`inventory::Inventory`] → [`clients::ProductClient`]
//!     - **Order client** - The order engine: pricing, deduction with compensation, state machine → [`clients::OrderClient`]
//! - **System**
//!     - **Wiring and lifecycle** → [`app_system::OrderSystem`]
//!     - **Configuration** → [`config::AppConfig`]
//!     - **Tracing setup** → [`app_system::setup_tracing`]
//!
//! ## Usage
//!
//! ```no_run
//! use storefront::app_system::OrderSystem;
//! use storefront::config::AppConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let system = OrderSystem::start(&AppConfig::from_env()?);
//! let products = system.product_client.list_products().await?;
//! println!("{} products", products.len());
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod inventory;
pub mod locks;
pub mod order_actor;
pub mod product_actor;
pub mod store;

#[cfg(test)]
mod mock_framework;
