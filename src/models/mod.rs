//! 数据模型模块

pub mod auth;
pub mod owner;
pub mod product;
pub mod user;
