//! Typed handles over the resource actors.

#[macro_use]
mod macros;
mod order_client;
mod product_client;

pub use order_client::*;
pub use product_client::*;
