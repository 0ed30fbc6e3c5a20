//! DTOs for the asset ingestion protocol.
//!
//! Wire field names are camelCase, matching the admin upload client.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::infrastructure::object_store::CompletedPart;

/// Query parameters for a single-shot small upload; the request body carries
/// the raw payload bytes.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SmallUploadQuery {
    #[validate(length(min = 1))]
    pub asset_prefix: String,
    #[validate(length(min = 1))]
    pub filename: String,
    pub content_type: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    /// `"db"` (default) or `"remote"`.
    pub storage: Option<String>,
}

/// Request to reserve a multipart session.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MultipartCreateRequest {
    #[validate(length(min = 1))]
    pub asset_prefix: String,
    #[validate(length(min = 1))]
    pub filename: String,
    /// Advisory; the value presented at completion is what the catalog
    /// records.
    pub content_type: Option<String>,
}

/// A reserved multipart session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSessionData {
    pub upload_id: String,
    pub remote_key: String,
}

/// Query parameters for a part upload; the request body carries the part
/// bytes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartQuery {
    pub remote_key: String,
    pub upload_id: String,
    pub part_number: i32,
}

/// Acknowledgement for one staged part.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartDto {
    pub part_number: i32,
    pub etag: String,
}

impl From<CompletedPart> for PartDto {
    fn from(part: CompletedPart) -> Self {
        Self {
            part_number: part.part_number,
            etag: part.etag,
        }
    }
}

impl From<PartDto> for CompletedPart {
    fn from(part: PartDto) -> Self {
        Self {
            part_number: part.part_number,
            etag: part.etag,
        }
    }
}

/// Request to finalize a multipart upload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MultipartCompleteRequest {
    #[validate(length(min = 1))]
    pub asset_prefix: String,
    #[validate(length(min = 1))]
    pub filename: String,
    #[validate(length(min = 1))]
    pub remote_key: String,
    #[validate(length(min = 1))]
    pub upload_id: String,
    #[validate(length(min = 1))]
    pub parts: Vec<PartDto>,
    pub size: i64,
    pub content_type: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Request to discard an abandoned multipart session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartAbortRequest {
    pub remote_key: String,
    pub upload_id: String,
}

/// Catalog id of an ingested asset.
#[derive(Debug, Serialize)]
pub struct AssetIdData {
    pub id: i64,
}

/// Count of assets removed by a prefix delete.
#[derive(Debug, Serialize)]
pub struct DeletedData {
    pub deleted: u64,
}
