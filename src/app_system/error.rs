use thiserror::Error;

use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("could not stop product actor: {0}")]
    ProductShutdown(#[from] ProductError),
    #[error("could not stop order actor: {0}")]
    OrderShutdown(#[from] OrderError),
    #[error("actor task failed: {0}")]
    ActorTask(#[from] tokio::task::JoinError),
}
