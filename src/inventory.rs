//! The stock capability the order engine depends on.
//!
//! [`ProductClient`](crate::clients::ProductClient) is the production
//! implementation; tests substitute doubles to force failures at precise
//! points of an order's lifecycle.

use async_trait::async_trait;

use crate::domain::Product;
use crate::product_actor::ProductError;

#[async_trait]
pub trait Inventory: Send + Sync {
    /// Current state of a product, used for price and name snapshots.
    async fn product(&self, id: &str) -> Result<Product, ProductError>;

    /// `NotFound`, `Unavailable` or `InsufficientStock` if `quantity` units
    /// cannot be sold right now. Mutates nothing.
    async fn check_availability(&self, id: &str, quantity: u32) -> Result<(), ProductError>;

    /// Re-checks availability and removes the units in one step. Returns the
    /// remaining stock.
    async fn deduct_stock(&self, id: &str, quantity: u32) -> Result<u32, ProductError>;

    /// Puts units back. Returns the new stock level.
    async fn restore_stock(&self, id: &str, quantity: u32) -> Result<u32, ProductError>;

    /// Takes back units returned by `restore_stock` when the order change
    /// that justified them could not be written. Not subject to the
    /// sellability check. Returns the new stock level.
    async fn withdraw_stock(&self, id: &str, quantity: u32) -> Result<u32, ProductError>;
}
