//! Remote object tier for template assets.
//!
//! Large file-backed assets live outside the relational catalog, behind the
//! [`ObjectStore`] trait. Two backends ship: a filesystem store for
//! deployments and an in-memory store for tests and development. An
//! S3-compatible backend is a seam of this trait, not a shipped integration.

mod fs_store;
mod memory_store;

pub use fs_store::FsObjectStore;
pub use memory_store::MemoryObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Errors from object tier operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("multipart upload not found: {0}")]
    UploadNotFound(String),
    #[error("part list rejected: {0}")]
    PartMismatch(String),
    #[error("object storage error: {0}")]
    Storage(String),
}

/// Result type for object tier operations.
pub type ObjectResult<T> = Result<T, ObjectStoreError>;

/// One finished part of a multipart upload, as acknowledged to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// 1-based position within the object.
    pub part_number: i32,
    /// Opaque integrity tag returned by the part upload.
    pub etag: String,
}

/// Object storage backend with multipart session support.
///
/// Multipart contract: [`create_multipart`](Self::create_multipart) reserves
/// a session without making anything visible under `key`;
/// [`upload_part`](Self::upload_part) stages parts and returns their etags;
/// [`complete_multipart`](Self::complete_multipart) atomically materializes
/// the object from the full ordered part list. A session that is never
/// completed holds staged data until [`abort_multipart`](Self::abort_multipart)
/// or out-of-band garbage collection removes it; this engine never
/// auto-aborts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores a whole object at `key`, replacing any previous content.
    async fn put(&self, key: &str, content: Bytes) -> ObjectResult<()>;

    /// Fetches the full body of the object at `key`.
    ///
    /// An absent object is `Ok(None)`, not an error: catalog rows pointing
    /// at vanished objects are treated as not-found by callers.
    async fn get(&self, key: &str) -> ObjectResult<Option<Bytes>>;

    /// Removes the object at `key`. Removing an absent object succeeds.
    async fn delete(&self, key: &str) -> ObjectResult<()>;

    /// Reserves a multipart session for `key`, returning its upload id.
    async fn create_multipart(&self, key: &str) -> ObjectResult<String>;

    /// Stages one part and returns its etag.
    ///
    /// Part numbers are 1-based; re-uploading a part number replaces the
    /// staged part. Parts may be uploaded sequentially or in parallel.
    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        content: Bytes,
    ) -> ObjectResult<String>;

    /// Materializes the object from the full ordered part list.
    ///
    /// Fails with [`ObjectStoreError::PartMismatch`] when the list is empty,
    /// out of order, omits staged parts, or carries etags that do not match
    /// the staged data. On success the session is consumed.
    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> ObjectResult<()>;

    /// Discards a multipart session and its staged parts.
    ///
    /// Aborting an unknown session is a no-op so callers can clean up
    /// unconditionally.
    async fn abort_multipart(&self, key: &str, upload_id: &str) -> ObjectResult<()>;
}

/// Computes the etag for a part: SHA-256 hex over its bytes.
pub fn part_etag(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Checks that a presented part list is plausible on its own: non-empty and
/// strictly increasing 1-based part numbers.
pub(crate) fn check_part_sequence(parts: &[CompletedPart]) -> ObjectResult<()> {
    if parts.is_empty() {
        return Err(ObjectStoreError::PartMismatch("empty part list".into()));
    }

    let mut previous = 0;
    for part in parts {
        if part.part_number < 1 {
            return Err(ObjectStoreError::PartMismatch(format!(
                "part number {} is not 1-based",
                part.part_number
            )));
        }
        if part.part_number <= previous {
            return Err(ObjectStoreError::PartMismatch(format!(
                "part number {} out of order",
                part.part_number
            )));
        }
        previous = part.part_number;
    }

    Ok(())
}

/// Generates a random multipart upload id.
pub(crate) fn new_upload_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(n: i32) -> CompletedPart {
        CompletedPart {
            part_number: n,
            etag: String::new(),
        }
    }

    #[test]
    fn test_part_sequence_rules() {
        assert!(check_part_sequence(&[]).is_err());
        assert!(check_part_sequence(&[part(0)]).is_err());
        assert!(check_part_sequence(&[part(2), part(1)]).is_err());
        assert!(check_part_sequence(&[part(1), part(1)]).is_err());
        assert!(check_part_sequence(&[part(1), part(2), part(3)]).is_ok());
    }

    #[test]
    fn test_part_etag_is_stable() {
        assert_eq!(part_etag(b"abc"), part_etag(b"abc"));
        assert_ne!(part_etag(b"abc"), part_etag(b"abd"));
        assert_eq!(part_etag(b"abc").len(), 64);
    }
}
