// src/dtos/product.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::{Validate, ValidationError};

use crate::models::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Public,
    Private,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Public => "public",
            ProductType::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Price,
    Quantity,
    CreatedAt,
}

impl SortKey {
    // Whitelisted column names; ORDER BY is interpolated, never user text
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::Quantity => "quantity",
            SortKey::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

fn default_product_type() -> ProductType {
    ProductType::Public
}

// Monetary values carry at most two fractional digits. A real third digit
// puts the cent value at least 0.1 off an integer; float noise stays below
// 1e-6 for any plausible price.
fn validate_money_scale(value: f64) -> Result<(), ValidationError> {
    let cents = value * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        let mut err = ValidationError::new("money_scale");
        err.message = Some("should have only 2 decimal points maximum".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 3, max = 50))]
    pub sku: String,
    #[validate(length(min = 3, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 100))]
    pub category: String,
    #[serde(rename = "type", default = "default_product_type")]
    pub product_type: ProductType,
    #[validate(range(exclusive_min = 0.0), custom(function = "validate_money_scale"))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 3, max = 200))]
    pub name: Option<String>,
    #[validate(range(exclusive_min = 0.0), custom(function = "validate_money_scale"))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[validate(length(min = 2, max = 100))]
    pub category: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[validate(length(min = 1))]
    pub search: String,
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
    #[validate(range(exclusive_min = 0.0), custom(function = "validate_money_scale"))]
    pub min_price: f64,
    #[validate(range(exclusive_min = 0.0), custom(function = "validate_money_scale"))]
    pub max_price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Convert from Model to Response DTO
impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            sku: product.sku,
            name: product.name,
            description: product.description,
            category: product.category,
            product_type: product.product_type,
            price: product.price,
            discount_price: product.discount_price,
            quantity: product.quantity,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl Pagination {
    // totalItems counts the whole table and totalPages floors the division,
    // matching the wire behavior this service replaces
    pub fn compute(page: i64, limit: i64, returned: i64, total_items: i64) -> Self {
        let offset = (page - 1) * limit;
        Self {
            current_page: page,
            total_pages: total_items / limit,
            total_items,
            items_per_page: limit,
            has_previous_page: offset > 0,
            has_next_page: returned + offset < total_items,
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DeletedProduct {
    pub id: i64,
    pub sku: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: i64,
    pub total_inventory_value: f64,
    pub total_discounted_value: f64,
    pub average_price: f64,
    pub out_of_stock_count: i64,
    pub by_category: Vec<CategoryStat>,
    pub by_type: Vec<TypeStat>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub total_value: f64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TypeStat {
    #[serde(rename = "type")]
    pub product_type: String,
    pub count: i64,
    pub total_value: f64,
}
