//! System orchestration, startup, and shutdown logic.

pub mod order_system;
pub mod tracing;
pub mod error;

pub use order_system::*;
pub use self::tracing::*;
pub use error::*;
