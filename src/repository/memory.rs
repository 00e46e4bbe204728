//! In-memory repositories
//!
//! Mirror the Postgres tables closely enough for local runs and tests:
//! sequential IDs starting at 1, unique username/email for users.

use super::{OwnerRepository, ProductRepository, UserRepository, USER_CONFLICT_MESSAGE};
use crate::{
    error::AppError,
    models::{owner::*, product::*, user::*},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<Table<User>>,
}

#[derive(Default)]
pub struct MemoryOwnerRepository {
    table: RwLock<Table<Owner>>,
}

#[derive(Default)]
pub struct MemoryProductRepository {
    table: RwLock<Table<Product>>,
}

// A shared username or a shared email both count as a collision
fn collides(
    rows: &BTreeMap<i64, User>,
    skip_id: Option<i64>,
    username: &str,
    email: &str,
) -> bool {
    rows.values()
        .filter(|u| Some(u.id) != skip_id)
        .any(|u| u.username == username || u.email == email)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let table = self.table.read().await;
        Ok(collides(&table.rows, None, username, email))
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let mut table = self.table.write().await;

        if collides(&table.rows, None, &user.username, &user.email) {
            return Err(AppError::Conflict(USER_CONFLICT_MESSAGE.to_string()));
        }

        let now = Utc::now();
        let id = table.allocate_id();
        let stored = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, id: i64, req: &UpdateUserRequest) -> Result<Option<User>, AppError> {
        let mut table = self.table.write().await;

        let Some(current) = table.rows.get(&id) else {
            return Ok(None);
        };

        let username = req.username.clone().unwrap_or_else(|| current.username.clone());
        let email = req.email.clone().unwrap_or_else(|| current.email.clone());

        if collides(&table.rows, Some(id), &username, &email) {
            return Err(AppError::Conflict(USER_CONFLICT_MESSAGE.to_string()));
        }

        let Some(user) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        user.username = username;
        user.email = email;
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }
}

#[async_trait]
impl OwnerRepository for MemoryOwnerRepository {
    async fn create(&self, req: &CreateOwnerRequest) -> Result<Owner, AppError> {
        let mut table = self.table.write().await;

        let now = Utc::now();
        let id = table.allocate_id();
        let owner = Owner {
            id,
            owner_name: req.owner_name.clone(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, owner.clone());

        Ok(owner)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Owner>, AppError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, req: &UpdateOwnerRequest) -> Result<Option<Owner>, AppError> {
        let mut table = self.table.write().await;

        Ok(table.rows.get_mut(&id).map(|owner| {
            if let Some(name) = &req.owner_name {
                owner.owner_name = name.clone();
            }
            owner.updated_at = Utc::now();
            owner.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, req: &CreateProductRequest) -> Result<Product, AppError> {
        let mut table = self.table.write().await;

        let now = Utc::now();
        let id = table.allocate_id();
        let product = Product {
            product_id: id,
            product_name: req.product_name.clone(),
            product_brand: req.product_brand.clone(),
            created_date: req.created_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, product.clone());

        Ok(product)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(
        &self,
        id: i64,
        req: &UpdateProductRequest,
    ) -> Result<Option<Product>, AppError> {
        let mut table = self.table.write().await;

        Ok(table.rows.get_mut(&id).map(|product| {
            if let Some(name) = &req.product_name {
                product.product_name = name.clone();
            }
            if let Some(brand) = &req.product_brand {
                product.product_brand = brand.clone();
            }
            if let Some(date) = req.created_date {
                product.created_date = date;
            }
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let repo = MemoryUserRepository::default();

        let a = repo.create(&new_user("a", "a@x.com")).await.unwrap();
        let b = repo.create(&new_user("b", "b@x.com")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.find_by_username("b").await.unwrap().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_user_uniqueness_is_enforced() {
        let repo = MemoryUserRepository::default();
        repo.create(&new_user("al", "al@x.com")).await.unwrap();

        assert!(matches!(
            repo.create(&new_user("al", "other@x.com")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            repo.create(&new_user("other", "al@x.com")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(repo.exists_by_username_or_email("nobody", "al@x.com").await.unwrap());
        assert!(!repo.exists_by_username_or_email("nobody", "nobody@x.com").await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_update_keeps_hash_and_checks_collisions() {
        let repo = MemoryUserRepository::default();
        let al = repo.create(&new_user("al", "al@x.com")).await.unwrap();
        repo.create(&new_user("bo", "bo@x.com")).await.unwrap();

        let req = UpdateUserRequest {
            username: Some("bo".to_string()),
            email: None,
        };
        assert!(matches!(repo.update(al.id, &req).await, Err(AppError::Conflict(_))));

        let req = UpdateUserRequest {
            username: None,
            email: Some("al@y.com".to_string()),
        };
        let updated = repo.update(al.id, &req).await.unwrap().unwrap();
        assert_eq!(updated.username, "al");
        assert_eq!(updated.email, "al@y.com");
        assert_eq!(updated.password_hash, al.password_hash);

        assert!(repo.update(99, &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_owner_crud() {
        let repo = MemoryOwnerRepository::default();

        let owner = repo
            .create(&CreateOwnerRequest {
                owner_name: "Acme".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);

        let renamed = repo
            .update(
                owner.id,
                &UpdateOwnerRequest {
                    owner_name: Some("Acme Ltd".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.owner_name, "Acme Ltd");

        assert!(repo.delete(owner.id).await.unwrap());
        assert!(!repo.delete(owner.id).await.unwrap());
        assert!(repo.find_by_id(owner.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_product_partial_update() {
        let repo = MemoryProductRepository::default();

        let product = repo
            .create(&CreateProductRequest {
                product_name: "Widget".to_string(),
                product_brand: "Acme".to_string(),
                created_date: None,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                product.product_id,
                &UpdateProductRequest {
                    product_brand: Some("Globex".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.product_name, "Widget");
        assert_eq!(updated.product_brand, "Globex");
        assert_eq!(updated.created_date, product.created_date);
    }
}
