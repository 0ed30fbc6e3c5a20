//! Handlers for the asset ingestion protocol.
//!
//! All endpoints answer the `{code, message, data?}` envelope with HTTP 200;
//! `code = 0` signals success and a non-zero code carries the caller-facing
//! error message. Authentication happens in middleware before any handler
//! runs.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::api::dto::ApiEnvelope;
use crate::api::dto::asset::{
    AssetIdData, DeletedData, MultipartAbortRequest, MultipartCompleteRequest,
    MultipartCreateRequest, PartDto, PartQuery, SmallUploadQuery, UploadSessionData,
};
use crate::application::services::{CompleteUpload, StorageClass};
use crate::state::AppState;

/// Single-shot ingest for small objects.
///
/// # Endpoint
///
/// `POST /api/asset/upload?assetPrefix=..&filename=..&storage=db|remote`
///
/// The raw request body is the payload. DB storage is the default and is
/// rejected above the configured inline ceiling; callers with larger objects
/// use the multipart protocol instead.
pub async fn upload_small_handler(
    State(state): State<AppState>,
    Query(query): Query<SmallUploadQuery>,
    body: Bytes,
) -> Json<ApiEnvelope<AssetIdData>> {
    if let Err(e) = query.validate() {
        return Json(ApiEnvelope::rejected(e.to_string()));
    }

    let class = match query.storage.as_deref() {
        None | Some("db") => StorageClass::Db,
        Some("remote") => StorageClass::Remote,
        Some(other) => {
            return Json(ApiEnvelope::rejected(format!(
                "unknown storage class: {}",
                other
            )));
        }
    };

    match state
        .asset_service
        .ingest_small(
            &query.asset_prefix,
            &query.filename,
            body,
            query.content_type,
            query.is_public,
            class,
        )
        .await
    {
        Ok(id) => Json(ApiEnvelope::ok(AssetIdData { id })),
        Err(e) => Json(ApiEnvelope::failure(&e)),
    }
}

/// Reserves a multipart session for a large object.
///
/// # Endpoint
///
/// `POST /api/asset/multipart/create`
///
/// No catalog row exists until completion; an abandoned session only holds
/// staged data in the object tier.
pub async fn multipart_create_handler(
    State(state): State<AppState>,
    Json(req): Json<MultipartCreateRequest>,
) -> Json<ApiEnvelope<UploadSessionData>> {
    if let Err(e) = req.validate() {
        return Json(ApiEnvelope::rejected(e.to_string()));
    }

    match state
        .asset_service
        .create_upload(&req.asset_prefix, &req.filename)
        .await
    {
        Ok(session) => Json(ApiEnvelope::ok(UploadSessionData {
            upload_id: session.upload_id,
            remote_key: session.remote_key,
        })),
        Err(e) => Json(ApiEnvelope::failure(&e)),
    }
}

/// Stages one part of a multipart upload.
///
/// # Endpoint
///
/// `PUT /api/asset/multipart/part?remoteKey=..&uploadId=..&partNumber=N`
///
/// Part numbers are 1-based; parts may arrive sequentially or in parallel.
pub async fn multipart_part_handler(
    State(state): State<AppState>,
    Query(query): Query<PartQuery>,
    body: Bytes,
) -> Json<ApiEnvelope<PartDto>> {
    match state
        .asset_service
        .upload_part(&query.remote_key, &query.upload_id, query.part_number, body)
        .await
    {
        Ok(part) => Json(ApiEnvelope::ok(part.into())),
        Err(e) => Json(ApiEnvelope::failure(&e)),
    }
}

/// Finalizes a multipart upload and inserts the catalog row.
///
/// # Endpoint
///
/// `POST /api/asset/multipart/complete`
pub async fn multipart_complete_handler(
    State(state): State<AppState>,
    Json(req): Json<MultipartCompleteRequest>,
) -> Json<ApiEnvelope<AssetIdData>> {
    if let Err(e) = req.validate() {
        return Json(ApiEnvelope::rejected(e.to_string()));
    }

    let complete = CompleteUpload {
        asset_prefix: req.asset_prefix,
        filename: req.filename,
        remote_key: req.remote_key,
        upload_id: req.upload_id,
        parts: req.parts.into_iter().map(Into::into).collect(),
        size: req.size,
        content_type: req.content_type,
        is_public: req.is_public,
    };

    match state.asset_service.complete_upload(complete).await {
        Ok(id) => Json(ApiEnvelope::ok(AssetIdData { id })),
        Err(e) => Json(ApiEnvelope::failure(&e)),
    }
}

/// Discards an abandoned multipart session.
///
/// # Endpoint
///
/// `POST /api/asset/multipart/abort`
///
/// Aborting an unknown session succeeds, so clients can clean up
/// unconditionally after a failed part loop.
pub async fn multipart_abort_handler(
    State(state): State<AppState>,
    Json(req): Json<MultipartAbortRequest>,
) -> Json<ApiEnvelope<()>> {
    match state
        .asset_service
        .abort_upload(&req.remote_key, &req.upload_id)
        .await
    {
        Ok(()) => Json(ApiEnvelope::ok(())),
        Err(e) => Json(ApiEnvelope::failure(&e)),
    }
}

/// Deletes every asset under a prefix.
///
/// # Endpoint
///
/// `DELETE /api/asset/prefix/{asset_prefix}`
pub async fn delete_prefix_handler(
    State(state): State<AppState>,
    Path(asset_prefix): Path<String>,
) -> Json<ApiEnvelope<DeletedData>> {
    match state.asset_service.delete_by_prefix(&asset_prefix).await {
        Ok(deleted) => Json(ApiEnvelope::ok(DeletedData { deleted })),
        Err(e) => Json(ApiEnvelope::failure(&e)),
    }
}
