//! Owner models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Owner {
    pub id: i64,
    pub owner_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOwnerRequest {
    #[validate(length(min = 1, max = 255, message = "owner_name must be 1-255 characters"))]
    pub owner_name: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOwnerRequest {
    #[validate(length(min = 1, max = 255, message = "owner_name must be 1-255 characters"))]
    pub owner_name: Option<String>,
}
