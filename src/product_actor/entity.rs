use rust_decimal::Decimal;

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, ProductStatus, ProductUpdate, Record};
use crate::store::Identified;

impl Identified for Product {
    fn id(&self) -> &str {
        &self.record.id
    }
}

impl Entity for Product {
    const KIND: &'static str = "product";

    type CreatePayload = ProductCreate;
    type Patch = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    /// Creates a new Product from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the product
    /// * `params` - Product creation parameters; status defaults to ACTIVE
    fn from_create(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        let product = Self {
            record: Record::new(id),
            name: params.name,
            description: params.description,
            price: params.price,
            stock_quantity: params.stock_quantity,
            sku: params.sku,
            category: params.category,
            brand: params.brand,
            images: params.images,
            weight: params.weight,
            status: params.status.unwrap_or(ProductStatus::Active),
        };
        product.validate()?;
        Ok(product)
    }

    fn on_create(&mut self) -> Result<(), ProductError> {
        self.settle_status();
        Ok(())
    }

    /// Applies a full replacement or a partial patch.
    ///
    /// # Fields Updated
    /// Every descriptive field plus `stock_quantity` and `status`. An ACTIVE
    /// product left with zero stock is moved to OUT_OF_STOCK.
    fn on_update(&mut self, update: ProductUpdate) -> Result<(), ProductError> {
        match update {
            ProductUpdate::Replace(full) => {
                self.name = full.name;
                self.description = full.description;
                self.price = full.price;
                self.stock_quantity = full.stock_quantity;
                self.sku = full.sku;
                self.category = full.category;
                self.brand = full.brand;
                self.images = full.images;
                self.weight = full.weight;
                self.status = full.status;
            }
            ProductUpdate::Merge(patch) => self.merge(patch),
        }
        self.validate()?;
        self.settle_status();
        self.record.touch();
        Ok(())
    }

    fn check_conflicts(&self, others: &[Self]) -> Result<(), ProductError> {
        if others.iter().any(|other| other.sku == self.sku) {
            return Err(ProductError::DuplicateSku(self.sku.clone()));
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckAvailability(n)`: Fails unless ACTIVE with at least `n` units
    /// - `Deduct(n)`: Same check, then decrements; zero stock means OUT_OF_STOCK
    /// - `Restore(n)`: Increments; OUT_OF_STOCK becomes ACTIVE again, but a
    ///   DISCONTINUED product stays discontinued
    /// - `Withdraw(n)`: Undoes a `Restore(n)`; decrements whatever the status
    fn handle_action(
        &mut self,
        action: ProductAction,
    ) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckAvailability(quantity) => {
                self.ensure_available(quantity)?;
                Ok(ProductActionResult::CheckAvailability(self.stock_quantity))
            }
            ProductAction::Deduct(quantity) => {
                self.ensure_available(quantity)?;
                self.stock_quantity -= quantity;
                self.settle_status();
                self.record.touch();
                Ok(ProductActionResult::Deduct(self.stock_quantity))
            }
            ProductAction::Restore(quantity) => {
                self.stock_quantity = self.stock_quantity.checked_add(quantity).ok_or_else(|| {
                    ProductError::Validation(format!("restoring {quantity} units overflows stock"))
                })?;
                if self.status == ProductStatus::OutOfStock && self.stock_quantity > 0 {
                    self.status = ProductStatus::Active;
                }
                self.record.touch();
                Ok(ProductActionResult::Restore(self.stock_quantity))
            }
            ProductAction::Withdraw(quantity) => {
                if self.stock_quantity < quantity {
                    return Err(ProductError::InsufficientStock {
                        id: self.record.id.clone(),
                        requested: quantity,
                        available: self.stock_quantity,
                    });
                }
                self.stock_quantity -= quantity;
                self.settle_status();
                self.record.touch();
                Ok(ProductActionResult::Withdraw(self.stock_quantity))
            }
        }
    }

    fn is_read_only(action: &ProductAction) -> bool {
        matches!(action, ProductAction::CheckAvailability(_))
    }
}

impl Product {
    fn ensure_available(&self, quantity: u32) -> Result<(), ProductError> {
        if !self.status.is_sellable() {
            return Err(ProductError::Unavailable {
                id: self.record.id.clone(),
                status: self.status,
            });
        }
        if self.stock_quantity < quantity {
            return Err(ProductError::InsufficientStock {
                id: self.record.id.clone(),
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        Ok(())
    }

    fn merge(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            self.stock_quantity = stock_quantity;
        }
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(brand) = patch.brand {
            self.brand = brand;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(weight) = patch.weight {
            self.weight = Some(weight);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    // An active product that has run dry is out of stock.
    fn settle_status(&mut self) {
        if self.stock_quantity == 0 && self.status == ProductStatus::Active {
            self.status = ProductStatus::OutOfStock;
        }
    }

    fn validate(&self) -> Result<(), ProductError> {
        if self.price <= Decimal::ZERO {
            return Err(ProductError::Validation("price must be positive".into()));
        }
        if self.images.is_empty() {
            return Err(ProductError::Validation("at least one image is required".into()));
        }
        Ok(())
    }
}
