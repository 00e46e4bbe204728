//! Product models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub product_brand: String,
    pub created_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "product_name must be 1-255 characters"))]
    pub product_name: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "product_brand must be at most 255 characters"))]
    pub product_brand: String,
    /// Defaults to the creation time
    pub created_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "product_name must be 1-255 characters"))]
    pub product_name: Option<String>,
    #[validate(length(max = 255, message = "product_brand must be at most 255 characters"))]
    pub product_brand: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
}
