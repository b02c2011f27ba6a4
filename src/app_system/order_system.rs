use std::sync::Arc;

use tracing::{error, info};

use super::SystemError;
use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, ProductClient};
use crate::config::AppConfig;
use crate::domain::{new_id, Order, Product};
use crate::inventory::Inventory;
use crate::store::JsonFileStore;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Must be called from within a tokio runtime.
    pub fn start(config: &AppConfig) -> Self {
        info!(data_dir = %config.data_dir.display(), "Starting order system");

        // 1. Product actor, backed by products.json
        let product_store = JsonFileStore::<Product>::new(config.products_path());
        let (product_actor, product_resource_client) =
            ResourceActor::new(config.mailbox_capacity, product_store, new_id);
        let product_client = ProductClient::new(product_resource_client);
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Order actor, backed by orders.json, with the product client as its inventory
        let order_store = JsonFileStore::<Order>::new(config.orders_path());
        let (order_actor, order_resource_client) =
            ResourceActor::new(config.mailbox_capacity, order_store, new_id);
        let inventory: Arc<dyn Inventory> = Arc::new(product_client.clone());
        let order_client = OrderClient::new(order_resource_client, inventory);
        let order_handle = tokio::spawn(order_actor.run());

        Self {
            order_client,
            product_client,
            handles: vec![product_handle, order_handle],
        }
    }

    /// Stops both actors once their queued requests are handled. Clients
    /// cloned out of the system report `ActorCommunicationError` afterwards.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        self.order_client.shutdown().await?;
        self.product_client.shutdown().await?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
