//! Product repository (Postgres)

use super::ProductRepository;
use crate::{error::AppError, models::product::*};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, req: &CreateProductRequest) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (product_name, product_brand, created_date)
            VALUES ($1, $2, COALESCE($3, NOW()))
            RETURNING *
            "#,
        )
        .bind(&req.product_name)
        .bind(&req.product_brand)
        .bind(req.created_date)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE product_id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_id")
            .fetch_all(&self.db)
            .await?;

        Ok(products)
    }

    async fn update(
        &self,
        id: i64,
        req: &UpdateProductRequest,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET
                product_name = COALESCE($2, product_name),
                product_brand = COALESCE($3, product_brand),
                created_date = COALESCE($4, created_date),
                updated_at = NOW()
            WHERE product_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.product_name)
        .bind(&req.product_brand)
        .bind(req.created_date)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
