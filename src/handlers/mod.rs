//! HTTP 处理器

pub mod auth;
pub mod health;
pub mod owner;
pub mod product;
pub mod user;
