//! Product Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Furniture category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sofa,
    Bed,
    Chair,
    Table,
    Cupboard,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Sofa,
        Category::Bed,
        Category::Chair,
        Category::Table,
        Category::Cupboard,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sofa => "sofa",
            Category::Bed => "bed",
            Category::Chair => "chair",
            Category::Table => "table",
            Category::Cupboard => "cupboard",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Indicative price bounds (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Both bounds finite, non-negative and ordered
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

/// Stored product image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub filename: String,
    /// Public path under `/uploads`, e.g. `uploads/products/<filename>`
    pub path: String,
    pub mimetype: String,
}

/// Product entity (full record)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub model_name: String,
    pub category: Category,
    pub price_range: PriceRange,
    pub images: Vec<ProductImage>,
    pub description: Option<String>,
    pub manufacturer_name: String,
    pub manufacturer_phone: String,
    pub factory_name: String,
    pub is_available: bool,
    pub created_at: i64,
}

/// Create product payload (validated fields, images stored separately)
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub model_name: String,
    pub category: Category,
    pub price_range: PriceRange,
    pub description: Option<String>,
    pub manufacturer_name: String,
    pub manufacturer_phone: String,
    pub factory_name: String,
}

/// User-facing catalog projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub model_name: String,
    pub images: Vec<ProductImage>,
    pub price_range: PriceRange,
    pub factory_name: String,
    pub description: Option<String>,
    pub category: Category,
}

impl From<Product> for CatalogItem {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            model_name: p.model_name,
            images: p.images,
            price_range: p.price_range,
            factory_name: p.factory_name,
            description: p.description,
            category: p.category,
        }
    }
}

/// Admin dashboard projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub images: Vec<ProductImage>,
    pub manufacturer_name: String,
    pub factory_name: String,
    pub model_name: String,
    pub price_range: PriceRange,
}

impl From<Product> for ProductSummary {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            images: p.images,
            manufacturer_name: p.manufacturer_name,
            factory_name: p.factory_name,
            model_name: p.model_name,
            price_range: p.price_range,
        }
    }
}
