use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Books,
    Home,
    Sports,
    Beauty,
    Toys,
    Food,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    /// Only active products can be ordered.
    pub fn is_sellable(self) -> bool {
        self == ProductStatus::Active
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::OutOfStock => "OUT_OF_STOCK",
            ProductStatus::Discontinued => "DISCONTINUED",
        };
        f.write_str(name)
    }
}

/// Represents a product in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub record: Record,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock_quantity: u32,
    pub sku: String,
    pub category: ProductCategory,
    pub brand: String,
    pub images: Vec<String>,
    pub weight: Option<f64>,
    pub status: ProductStatus,
}

/// Payload for creating a new product. `status` defaults to ACTIVE.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock_quantity: u32,
    pub sku: String,
    pub category: ProductCategory,
    pub brand: String,
    pub images: Vec<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

/// Full replacement of a product's descriptive and stock fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReplace {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock_quantity: u32,
    pub sku: String,
    pub category: ProductCategory,
    pub brand: String,
    pub images: Vec<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    pub status: ProductStatus,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock_quantity: Option<u32>,
    pub sku: Option<String>,
    pub category: Option<ProductCategory>,
    pub brand: Option<String>,
    pub images: Option<Vec<String>>,
    pub weight: Option<f64>,
    pub status: Option<ProductStatus>,
}

/// The two shapes a product update can take.
#[derive(Debug, Clone)]
pub enum ProductUpdate {
    Replace(ProductReplace),
    Merge(ProductPatch),
}
