pub mod record;
pub mod product;
pub mod order;

pub use record::*;
pub use product::*;
pub use order::*;
