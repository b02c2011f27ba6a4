//! Order-specific domain logic: creation rules and the status state machine.

pub mod entity;
pub mod error;

pub use error::*;
