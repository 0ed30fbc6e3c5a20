//! Tiered asset storage service.
//!
//! Resolves named assets across the catalog (inline bytes) and the remote
//! object tier, and owns the ingestion paths that populate them: single-shot
//! small uploads and the multipart session protocol for large objects.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::domain::entities::{AssetPayload, NewAsset, NewAssetStorage};
use crate::domain::repositories::AssetRepository;
use crate::error::AppError;
use crate::infrastructure::object_store::{
    CompletedPart, ObjectStore, ObjectStoreError,
};

/// Asset bytes plus the content type recorded at ingest time.
#[derive(Debug, Clone)]
pub struct ResolvedAssetContent {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Storage tier requested for a single-shot ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    /// Inline in the catalog row; subject to the configured size ceiling.
    Db,
    /// Whole object written to the remote tier.
    Remote,
}

/// A reserved multipart session.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub upload_id: String,
    pub remote_key: String,
}

/// Everything needed to finalize a multipart upload.
#[derive(Debug, Clone)]
pub struct CompleteUpload {
    pub asset_prefix: String,
    pub filename: String,
    pub remote_key: String,
    pub upload_id: String,
    pub parts: Vec<CompletedPart>,
    pub size: i64,
    pub content_type: Option<String>,
    pub is_public: bool,
}

/// Service resolving and ingesting template assets.
pub struct AssetService {
    catalog: Arc<dyn AssetRepository>,
    store: Arc<dyn ObjectStore>,
    inline_max_bytes: usize,
}

impl AssetService {
    /// Creates the service over a catalog repository and an object store.
    ///
    /// `inline_max_bytes` is the ceiling for DB-stored payloads.
    pub fn new(
        catalog: Arc<dyn AssetRepository>,
        store: Arc<dyn ObjectStore>,
        inline_max_bytes: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            inline_max_bytes,
        }
    }

    /// Resolves an asset to its bytes.
    ///
    /// Returns `Ok(None)` for a missing catalog row, a malformed row, or a
    /// remote key whose object has vanished: catalog/object divergence is a
    /// silent not-found, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on catalog or object-tier faults.
    pub async fn resolve(
        &self,
        asset_prefix: &str,
        filename: &str,
    ) -> Result<Option<ResolvedAssetContent>, AppError> {
        let Some(row) = self.catalog.find_by_name(asset_prefix, filename).await? else {
            return Ok(None);
        };

        let Some(asset) = row.into_asset() else {
            return Ok(None);
        };

        let bytes = match asset.payload {
            AssetPayload::Db(content) => Bytes::from(content),
            AssetPayload::Remote(remote_key) => {
                match self.store.get(&remote_key).await.map_err(map_store_error)? {
                    Some(bytes) => bytes,
                    None => return Ok(None),
                }
            }
        };

        Ok(Some(ResolvedAssetContent {
            bytes,
            content_type: asset.content_type,
        }))
    }

    /// Single-shot ingest for small objects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when DB storage is requested for a
    /// payload above the inline ceiling, or when the prefix/filename are not
    /// valid path components. Returns [`AppError::Conflict`] when the asset
    /// already exists.
    pub async fn ingest_small(
        &self,
        asset_prefix: &str,
        filename: &str,
        bytes: Bytes,
        content_type: Option<String>,
        is_public: bool,
        class: StorageClass,
    ) -> Result<i64, AppError> {
        validate_name_component(asset_prefix, "asset_prefix")?;
        validate_name_component(filename, "filename")?;

        let size = bytes.len() as i64;
        let checksum = Some(hex::encode(Sha256::digest(&bytes)));

        let storage = match class {
            StorageClass::Db => {
                if bytes.len() > self.inline_max_bytes {
                    return Err(AppError::bad_request(
                        "Payload too large for inline storage",
                        json!({ "size": size, "max": self.inline_max_bytes }),
                    ));
                }
                NewAssetStorage::Db(bytes.to_vec())
            }
            StorageClass::Remote => {
                let remote_key = remote_key_for(asset_prefix, filename);
                self.store
                    .put(&remote_key, bytes)
                    .await
                    .map_err(map_store_error)?;
                NewAssetStorage::Remote(remote_key)
            }
        };

        self.catalog
            .insert(NewAsset {
                asset_prefix: asset_prefix.to_string(),
                filename: filename.to_string(),
                content_type,
                size,
                checksum,
                storage,
                is_public,
            })
            .await
    }

    /// Reserves a multipart session for a large object.
    ///
    /// No catalog row is created here; the asset stays invisible until
    /// [`complete_upload`](Self::complete_upload) succeeds.
    pub async fn create_upload(
        &self,
        asset_prefix: &str,
        filename: &str,
    ) -> Result<UploadSession, AppError> {
        validate_name_component(asset_prefix, "asset_prefix")?;
        validate_name_component(filename, "filename")?;

        let remote_key = remote_key_for(asset_prefix, filename);
        let upload_id = self
            .store
            .create_multipart(&remote_key)
            .await
            .map_err(map_store_error)?;

        Ok(UploadSession {
            upload_id,
            remote_key,
        })
    }

    /// Stages one part of a multipart upload.
    pub async fn upload_part(
        &self,
        remote_key: &str,
        upload_id: &str,
        part_number: i32,
        bytes: Bytes,
    ) -> Result<CompletedPart, AppError> {
        let etag = self
            .store
            .upload_part(remote_key, upload_id, part_number, bytes)
            .await
            .map_err(map_store_error)?;

        Ok(CompletedPart { part_number, etag })
    }

    /// Finalizes a multipart upload: materializes the remote object from the
    /// ordered part list, then inserts the catalog row.
    pub async fn complete_upload(&self, req: CompleteUpload) -> Result<i64, AppError> {
        validate_name_component(&req.asset_prefix, "asset_prefix")?;
        validate_name_component(&req.filename, "filename")?;

        self.store
            .complete_multipart(&req.remote_key, &req.upload_id, &req.parts)
            .await
            .map_err(map_store_error)?;

        self.catalog
            .insert(NewAsset {
                asset_prefix: req.asset_prefix,
                filename: req.filename,
                content_type: req.content_type,
                size: req.size,
                checksum: None,
                storage: NewAssetStorage::Remote(req.remote_key),
                is_public: req.is_public,
            })
            .await
    }

    /// Discards an abandoned multipart session. Unknown sessions are a no-op.
    pub async fn abort_upload(&self, remote_key: &str, upload_id: &str) -> Result<(), AppError> {
        self.store
            .abort_multipart(remote_key, upload_id)
            .await
            .map_err(map_store_error)
    }

    /// Deletes every asset under a prefix, catalog row and payload together.
    ///
    /// All-or-nothing per asset: a remote delete failure propagates and
    /// leaves that asset's catalog row in place, so the catalog never claims
    /// an object is gone while it still exists.
    pub async fn delete_by_prefix(&self, asset_prefix: &str) -> Result<u64, AppError> {
        let rows = self.catalog.list_by_prefix(asset_prefix).await?;

        let mut deleted = 0u64;
        for row in rows {
            if let Some(remote_key) = &row.remote_key {
                self.store
                    .delete(remote_key)
                    .await
                    .map_err(map_store_error)?;
            }
            self.catalog.delete_by_id(row.id).await?;
            deleted += 1;
        }

        Ok(deleted)
    }
}

fn remote_key_for(asset_prefix: &str, filename: &str) -> String {
    format!("{}/{}", asset_prefix, filename)
}

fn validate_name_component(value: &str, field: &str) -> Result<(), AppError> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains('/')
        && !value.contains('\\');

    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Invalid name component",
            json!({ "field": field }),
        ))
    }
}

fn map_store_error(e: ObjectStoreError) -> AppError {
    match e {
        ObjectStoreError::UploadNotFound(id) => {
            AppError::bad_request("Upload session not found", json!({ "upload_id": id }))
        }
        ObjectStoreError::PartMismatch(reason) => {
            AppError::bad_request("Part list rejected", json!({ "reason": reason }))
        }
        ObjectStoreError::Storage(detail) => {
            tracing::error!("object store error: {}", detail);
            AppError::internal("Object storage error", json!({}))
        }
    }
}
