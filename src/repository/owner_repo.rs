//! Owner repository (Postgres)

use super::OwnerRepository;
use crate::{error::AppError, models::owner::*};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgOwnerRepository {
    db: PgPool,
}

impl PgOwnerRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn create(&self, req: &CreateOwnerRequest) -> Result<Owner, AppError> {
        let owner = sqlx::query_as::<_, Owner>(
            "INSERT INTO owners (owner_name) VALUES ($1) RETURNING *",
        )
        .bind(&req.owner_name)
        .fetch_one(&self.db)
        .await?;

        Ok(owner)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, AppError> {
        let owner = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(owner)
    }

    async fn list(&self) -> Result<Vec<Owner>, AppError> {
        let owners = sqlx::query_as::<_, Owner>("SELECT * FROM owners ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(owners)
    }

    async fn update(&self, id: i64, req: &UpdateOwnerRequest) -> Result<Option<Owner>, AppError> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            UPDATE owners
            SET
                owner_name = COALESCE($2, owner_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.owner_name)
        .fetch_optional(&self.db)
        .await?;

        Ok(owner)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
