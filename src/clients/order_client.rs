use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{CreateOrder, Order, OrderCreate, OrderItem, OrderStatus, PatchOrder};
use crate::inventory::Inventory;
use crate::locks::KeyedLocks;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// Client for interacting with the Order actor.
///
/// This is the order engine: it validates and prices orders against the
/// inventory, deducts and restores stock, and drives the status state
/// machine. Patches and deletions of one order are serialised through a
/// per-order lock so stock is never restored twice.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    inventory: Arc<dyn Inventory>,
    locks: KeyedLocks,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, inventory: Arc<dyn Inventory>) -> Self {
        Self {
            inner,
            inventory,
            locks: KeyedLocks::new(),
        }
    }

    #[instrument(
        skip(self, request),
        fields(customer_id = %request.customer_id, lines = request.items.len())
    )]
    pub async fn create_order(&self, request: CreateOrder) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        if request.items.is_empty() {
            warn!("Order rejected: no items");
            return Err(OrderError::InvalidOrder("order must contain at least one item".into()));
        }

        // Step 1: Validate and price every line before any stock moves.
        // Lines naming the same product are checked against their sum.
        let mut requested: HashMap<&str, u32> = HashMap::new();
        for line in &request.items {
            if line.quantity == 0 {
                warn!(product_id = %line.product_id, "Order rejected: zero quantity");
                return Err(OrderError::InvalidOrder(format!(
                    "item {}: quantity must be positive",
                    line.product_id
                )));
            }
            let total = requested.entry(line.product_id.as_str()).or_default();
            *total = total.checked_add(line.quantity).ok_or_else(|| {
                OrderError::InvalidOrder(format!("item {}: quantity overflows", line.product_id))
            })?;
        }

        let mut items = Vec::with_capacity(request.items.len());
        let mut checked = HashSet::new();
        for line in &request.items {
            let product = self
                .inventory
                .product(&line.product_id)
                .await
                .map_err(|e| Self::reject_line(&line.product_id, e))?;
            if checked.insert(line.product_id.as_str()) {
                let quantity = requested[line.product_id.as_str()];
                self.inventory
                    .check_availability(&line.product_id, quantity)
                    .await
                    .map_err(|e| Self::reject_line(&line.product_id, e))?;
            }
            items.push(OrderItem::snapshot(&product, line.quantity));
        }
        info!("All items validated");

        // Step 2: Deduct stock in list order, undoing earlier lines on failure
        for (index, item) in items.iter().enumerate() {
            if let Err(e) = self.inventory.deduct_stock(&item.product_id, item.quantity).await {
                warn!(
                    product_id = %item.product_id,
                    error = %e,
                    "Deduction failed, reverting earlier lines"
                );
                self.revert_deductions(&items[..index]).await;
                return Err(OrderError::from_line_item(&item.product_id, e));
            }
        }
        debug!("Stock deducted for all items");

        // Step 3: Persist the order
        let payload = OrderCreate {
            customer_id: request.customer_id,
            items: items.clone(),
            payment_method: request.payment_method,
            shipping_address: request.shipping_address,
            note: request.note,
        };
        match self.inner.create(payload).await {
            Ok(order) => {
                info!(
                    order_id = %order.record.id,
                    total = %order.total_amount,
                    "Order created successfully"
                );
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Persisting order failed, reverting stock");
                self.revert_deductions(&items).await;
                Err(e.into())
            }
        }
    }

    /// Applies a status change and/or field edits.
    ///
    /// Cancelling restores the stock of every item before the new status is
    /// written. If that write fails the restored units are withdrawn again,
    /// so a retried cancel credits the stock only once.
    #[instrument(skip(self))]
    pub async fn patch_order(&self, id: String, patch: PatchOrder) -> Result<Order, OrderError> {
        let _guard = self.locks.lock(&id).await;
        let order = self.get_order(id.clone()).await?;

        let target = match order.validate_patch(&patch) {
            Ok(target) => target,
            Err(e) => {
                warn!(status = %order.status, error = %e, "Patch rejected");
                return Err(e);
            }
        };
        let restored = if target == Some(OrderStatus::Cancelled) {
            self.restore_order_stock(&order).await?
        } else {
            Vec::new()
        };

        match self.inner.update(id, patch).await {
            Ok(updated) => {
                info!(from = %order.status, to = %updated.status, "Order updated");
                Ok(updated)
            }
            Err(e) => {
                error!(error = %e, "Writing order failed, withdrawing restored stock");
                self.withdraw_restored(&restored).await;
                Err(e.into())
            }
        }
    }

    /// Deletes an order, giving its stock back unless a cancellation
    /// already did.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: String) -> Result<Order, OrderError> {
        let _guard = self.locks.lock(&id).await;
        let order = self.get_order(id.clone()).await?;

        let restored = if order.status != OrderStatus::Cancelled {
            self.restore_order_stock(&order).await?
        } else {
            Vec::new()
        };

        match self.inner.delete(id).await {
            Ok(deleted) => {
                info!(status = %deleted.status, "Order deleted");
                Ok(deleted)
            }
            Err(e) => {
                error!(error = %e, "Deleting order failed, withdrawing restored stock");
                self.withdraw_restored(&restored).await;
                Err(e.into())
            }
        }
    }

    /// Returns every item's quantity to its product and reports the items
    /// that were actually restored. Products deleted since the order was
    /// placed are skipped; they cannot block a cancellation.
    ///
    /// All or nothing: if one item fails, the items restored before it are
    /// withdrawn again.
    #[instrument(skip(self, order), fields(order_id = %order.record.id))]
    pub async fn restore_order_stock(&self, order: &Order) -> Result<Vec<OrderItem>, OrderError> {
        let mut restored = Vec::with_capacity(order.items.len());
        for item in &order.items {
            match self.inventory.restore_stock(&item.product_id, item.quantity).await {
                Ok(_) => restored.push(item.clone()),
                Err(ProductError::NotFound(_)) => {
                    warn!(
                        product_id = %item.product_id,
                        "Product gone, skipping stock restoration"
                    );
                }
                Err(e) => {
                    error!(product_id = %item.product_id, error = %e, "Stock restoration failed");
                    self.withdraw_restored(&restored).await;
                    return Err(OrderError::from_restore(&item.product_id, e));
                }
            }
        }
        Ok(restored)
    }

    async fn withdraw_restored(&self, items: &[OrderItem]) {
        for item in items {
            if let Err(e) = self.inventory.withdraw_stock(&item.product_id, item.quantity).await {
                error!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "Could not withdraw restored stock"
                );
            }
        }
    }

    async fn revert_deductions(&self, items: &[OrderItem]) {
        for item in items {
            if let Err(e) = self.inventory.restore_stock(&item.product_id, item.quantity).await {
                error!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "Could not revert deduction"
                );
            }
        }
    }

    fn reject_line(product_id: &str, err: ProductError) -> OrderError {
        warn!(product_id, error = %err, "Order line rejected");
        OrderError::from_line_item(product_id, err)
    }

    pub(crate) async fn shutdown(&self) -> Result<(), OrderError> {
        self.inner.shutdown().await.map_err(OrderError::from)
    }
}

impl_client_methods!(OrderClient, Order, OrderError, order);
