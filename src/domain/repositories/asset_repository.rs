//! Repository trait for the template asset catalog.

use crate::domain::entities::{AssetRow, NewAsset};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for template asset catalog rows.
///
/// Payload bytes for `DB`-stored assets live on the row itself; `REMOTE`
/// rows only carry the object key. The object tier is managed separately by
/// [`crate::infrastructure::object_store::ObjectStore`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Fetches a catalog row by `(asset_prefix, filename)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_name(
        &self,
        asset_prefix: &str,
        filename: &str,
    ) -> Result<Option<AssetRow>, AppError>;

    /// Inserts a catalog row and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when `(asset_prefix, filename)` or
    /// `remote_key` already exists, [`AppError::Internal`] on other
    /// database errors.
    async fn insert(&self, new_asset: NewAsset) -> Result<i64, AppError>;

    /// Lists all catalog rows under a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_prefix(&self, asset_prefix: &str) -> Result<Vec<AssetRow>, AppError>;

    /// Deletes a single catalog row by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;
}
