use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch, ProductReplace, ProductUpdate};
use crate::inventory::Inventory;
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self, params), fields(sku = %params.sku))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        let product = self.inner.create(params).await.map_err(ProductError::from)?;
        info!(product_id = %product.record.id, "Product created");
        Ok(product)
    }

    /// Full replacement (PUT semantics).
    #[instrument(skip(self, replacement))]
    pub async fn replace_product(
        &self,
        id: String,
        replacement: ProductReplace,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner
            .update(id, ProductUpdate::Replace(replacement))
            .await
            .map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn patch_product(
        &self,
        id: String,
        patch: ProductPatch,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner
            .update(id, ProductUpdate::Merge(patch))
            .await
            .map_err(ProductError::from)
    }

    /// Orders that reference the product keep their snapshots.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: String) -> Result<Product, ProductError> {
        debug!("Sending request");
        let product = self.inner.delete(id).await.map_err(ProductError::from)?;
        info!(sku = %product.sku, "Product deleted");
        Ok(product)
    }

    async fn stock_action(
        &self,
        id: &str,
        action: ProductAction,
    ) -> Result<ProductActionResult, ProductError> {
        self.inner
            .perform_action(id.to_string(), action)
            .await
            .map_err(ProductError::from)
    }

    pub(crate) async fn shutdown(&self) -> Result<(), ProductError> {
        self.inner.shutdown().await.map_err(ProductError::from)
    }
}

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {result:?}"))
}

#[async_trait]
impl Inventory for ProductClient {
    async fn product(&self, id: &str) -> Result<Product, ProductError> {
        self.get_product(id.to_string()).await
    }

    #[instrument(skip(self))]
    async fn check_availability(&self, id: &str, quantity: u32) -> Result<(), ProductError> {
        debug!("Sending request");
        match self.stock_action(id, ProductAction::CheckAvailability(quantity)).await? {
            ProductActionResult::CheckAvailability(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    async fn deduct_stock(&self, id: &str, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.stock_action(id, ProductAction::Deduct(quantity)).await {
            Ok(ProductActionResult::Deduct(remaining)) => {
                info!(remaining, "Stock deducted");
                Ok(remaining)
            }
            Ok(other) => Err(unexpected(other)),
            Err(e) => {
                warn!(error = %e, "Stock deduction refused");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn restore_stock(&self, id: &str, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.stock_action(id, ProductAction::Restore(quantity)).await? {
            ProductActionResult::Restore(stock) => {
                info!(stock, "Stock restored");
                Ok(stock)
            }
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    async fn withdraw_stock(&self, id: &str, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.stock_action(id, ProductAction::Withdraw(quantity)).await? {
            ProductActionResult::Withdraw(stock) => {
                info!(stock, "Restored stock withdrawn");
                Ok(stock)
            }
            other => Err(unexpected(other)),
        }
    }
}
