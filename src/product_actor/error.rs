use thiserror::Error;

use crate::actor_framework::ResourceError;
use crate::domain::ProductStatus;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product {id} is not available for sale (status {status})")]
    Unavailable { id: String, status: ProductStatus },
    #[error("Insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock { id: String, requested: u32, available: u32 },
    #[error("SKU already in use: {0}")]
    DuplicateSku(String),
    #[error("Product validation error: {0}")]
    Validation(String),
    #[error("Product storage error: {0}")]
    Storage(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    /// HTTP-style status for a boundary layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ProductError::NotFound(_) => 404,
            ProductError::Unavailable { .. }
            | ProductError::InsufficientStock { .. }
            | ProductError::DuplicateSku(_)
            | ProductError::Validation(_) => 400,
            ProductError::Storage(_) | ProductError::ActorCommunicationError(_) => 500,
        }
    }
}

impl From<ResourceError<ProductError>> for ProductError {
    fn from(err: ResourceError<ProductError>) -> Self {
        match err {
            ResourceError::NotFound { id, .. } => ProductError::NotFound(id),
            ResourceError::Rejected(e) => e,
            ResourceError::Storage(e) => ProductError::Storage(e.to_string()),
            e @ (ResourceError::ActorClosed | ResourceError::ActorDropped) => {
                ProductError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
