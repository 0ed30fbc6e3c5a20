//! Asset protocol route configuration.
//!
//! All endpoints here require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    delete_prefix_handler, multipart_abort_handler, multipart_complete_handler,
    multipart_create_handler, multipart_part_handler, upload_small_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, post, put},
};

/// Part uploads carry raw bytes; clients chunk at 10 MiB, so allow headroom
/// above that.
const MAX_UPLOAD_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Asset ingestion protocol routes, protected by Bearer token auth.
///
/// # Endpoints
///
/// - `POST   /asset/upload`             - Single-shot small object ingest
/// - `POST   /asset/multipart/create`   - Reserve a multipart session
/// - `PUT    /asset/multipart/part`     - Stage one part
/// - `POST   /asset/multipart/complete` - Finalize and insert the catalog row
/// - `POST   /asset/multipart/abort`    - Discard an abandoned session
/// - `DELETE /asset/prefix/{asset_prefix}` - Delete everything under a prefix
pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/asset/upload", post(upload_small_handler))
        .route("/asset/multipart/create", post(multipart_create_handler))
        .route("/asset/multipart/part", put(multipart_part_handler))
        .route("/asset/multipart/complete", post(multipart_complete_handler))
        .route("/asset/multipart/abort", post(multipart_abort_handler))
        .route("/asset/prefix/{asset_prefix}", delete(delete_prefix_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}
