//! PostgreSQL implementation of the asset catalog repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{AssetRow, NewAsset, NewAssetStorage, asset};
use crate::domain::repositories::AssetRepository;
use crate::error::AppError;

const SELECT_COLUMNS: &str = r#"
    id, asset_prefix, filename, content_type, size, storage_type, content, remote_key
"#;

/// PostgreSQL repository for template asset catalog rows.
pub struct PgAssetRepository {
    pool: Arc<PgPool>,
}

impl PgAssetRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    async fn find_by_name(
        &self,
        asset_prefix: &str,
        filename: &str,
    ) -> Result<Option<AssetRow>, AppError> {
        let row = sqlx::query_as::<_, AssetRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM template_assets WHERE asset_prefix = $1 AND filename = $2",
        ))
        .bind(asset_prefix)
        .bind(filename)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn insert(&self, new_asset: NewAsset) -> Result<i64, AppError> {
        let (storage_type, content, remote_key) = match new_asset.storage {
            NewAssetStorage::Db(bytes) => (asset::STORAGE_DB, Some(bytes), None),
            NewAssetStorage::Remote(key) => (asset::STORAGE_REMOTE, None, Some(key)),
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO template_assets
                (asset_prefix, filename, content_type, size, checksum,
                 storage_type, content, remote_key, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(new_asset.asset_prefix)
        .bind(new_asset.filename)
        .bind(new_asset.content_type)
        .bind(new_asset.size)
        .bind(new_asset.checksum)
        .bind(storage_type)
        .bind(content)
        .bind(remote_key)
        .bind(new_asset.is_public)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn list_by_prefix(&self, asset_prefix: &str) -> Result<Vec<AssetRow>, AppError> {
        let rows = sqlx::query_as::<_, AssetRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM template_assets WHERE asset_prefix = $1 ORDER BY id",
        ))
        .bind(asset_prefix)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM template_assets WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
