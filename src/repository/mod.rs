//! Persistence layer
//!
//! Each entity has an async repository trait keyed by numeric ID. Handlers and
//! services only see the traits; [`Repositories`] bundles the Postgres or the
//! in-memory implementations chosen at startup.

use crate::{
    error::AppError,
    models::{owner::*, product::*, user::*},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub mod memory;
pub mod owner_repo;
pub mod product_repo;
pub mod user_repo;

pub use memory::{MemoryOwnerRepository, MemoryProductRepository, MemoryUserRepository};
pub use owner_repo::PgOwnerRepository;
pub use product_repo::PgProductRepository;
pub use user_repo::PgUserRepository;

/// Deliberately does not say which of the two collided
pub const USER_CONFLICT_MESSAGE: &str = "Username or Email already exists";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// True when any stored user has this username or this email
    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError>;

    /// Fails with `AppError::Conflict` if the username or email is taken
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    async fn update(&self, id: i64, req: &UpdateUserRequest) -> Result<Option<User>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn create(&self, req: &CreateOwnerRequest) -> Result<Owner, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, AppError>;

    async fn list(&self) -> Result<Vec<Owner>, AppError>;

    async fn update(&self, id: i64, req: &UpdateOwnerRequest) -> Result<Option<Owner>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, req: &CreateProductRequest) -> Result<Product, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError>;

    async fn list(&self) -> Result<Vec<Product>, AppError>;

    async fn update(
        &self,
        id: i64,
        req: &UpdateProductRequest,
    ) -> Result<Option<Product>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// The set of repositories shared by all requests
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub owners: Arc<dyn OwnerRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.clone())),
            owners: Arc::new(PgOwnerRepository::new(db.clone())),
            products: Arc::new(PgProductRepository::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            owners: Arc::new(MemoryOwnerRepository::default()),
            products: Arc::new(MemoryProductRepository::default()),
        }
    }
}
