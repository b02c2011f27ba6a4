use thiserror::Error;

use crate::actor_framework::ResourceError;
use crate::domain::OrderStatus;
use crate::product_actor::ProductError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order is {0} and can no longer be modified")]
    InvalidState(OrderStatus),
    #[error("Invalid order update: {0}")]
    InvalidPatch(String),
    #[error("Order storage error: {0}")]
    Storage(String),
    #[error("Stock restoration failed: {0}")]
    StockRestoration(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// HTTP-style status for a boundary layer.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::NotFound(_) => 404,
            OrderError::InvalidOrder(_)
            | OrderError::InvalidTransition { .. }
            | OrderError::InvalidState(_)
            | OrderError::InvalidPatch(_) => 400,
            OrderError::Storage(_)
            | OrderError::StockRestoration(_)
            | OrderError::ActorCommunicationError(_) => 500,
        }
    }

    /// Maps an inventory failure hit while placing an order. Business
    /// refusals become `InvalidOrder`; infrastructure failures keep their
    /// kind.
    pub fn from_line_item(product_id: &str, err: ProductError) -> Self {
        match err {
            ProductError::Storage(msg) => OrderError::Storage(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
            other => OrderError::InvalidOrder(format!("item {product_id}: {other}")),
        }
    }

    /// Maps a failure to give stock back on cancel or delete. Refusals from
    /// the inventory become `StockRestoration`; infrastructure failures keep
    /// their kind.
    pub fn from_restore(product_id: &str, err: ProductError) -> Self {
        match err {
            ProductError::Storage(msg) => OrderError::Storage(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
            other => OrderError::StockRestoration(format!("item {product_id}: {other}")),
        }
    }
}

impl From<ResourceError<OrderError>> for OrderError {
    fn from(err: ResourceError<OrderError>) -> Self {
        match err {
            ResourceError::NotFound { id, .. } => OrderError::NotFound(id),
            ResourceError::Rejected(e) => e,
            ResourceError::Storage(e) => OrderError::Storage(e.to_string()),
            e @ (ResourceError::ActorClosed | ResourceError::ActorDropped) => {
                OrderError::ActorCommunicationError(e.to_string())
            }
        }
    }
}

