//! In-memory object store for tests and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{
    CompletedPart, ObjectResult, ObjectStore, ObjectStoreError, check_part_sequence,
    new_upload_id, part_etag,
};

/// An [`ObjectStore`] holding everything in process memory.
///
/// Follows the same multipart semantics as the filesystem store; used where
/// persistence is not wanted.
#[derive(Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Bytes>,
    uploads: HashMap<String, Session>,
}

struct Session {
    key: String,
    parts: BTreeMap<i32, (String, Bytes)>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens after a panic elsewhere; propagate it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content: Bytes) -> ObjectResult<()> {
        self.lock().objects.insert(key.to_string(), content);
        Ok(())
    }

    async fn get(&self, key: &str) -> ObjectResult<Option<Bytes>> {
        Ok(self.lock().objects.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> ObjectResult<()> {
        self.lock().objects.remove(key);
        Ok(())
    }

    async fn create_multipart(&self, key: &str) -> ObjectResult<String> {
        let upload_id = new_upload_id();
        self.lock().uploads.insert(
            upload_id.clone(),
            Session {
                key: key.to_string(),
                parts: BTreeMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        content: Bytes,
    ) -> ObjectResult<String> {
        if part_number < 1 {
            return Err(ObjectStoreError::PartMismatch(format!(
                "part number {} is not 1-based",
                part_number
            )));
        }

        let mut inner = self.lock();
        let session = inner
            .uploads
            .get_mut(upload_id)
            .filter(|s| s.key == key)
            .ok_or_else(|| ObjectStoreError::UploadNotFound(upload_id.to_string()))?;

        let etag = part_etag(&content);
        session.parts.insert(part_number, (etag.clone(), content));
        Ok(etag)
    }

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> ObjectResult<()> {
        check_part_sequence(parts)?;

        let mut inner = self.lock();
        let session = inner
            .uploads
            .get(upload_id)
            .filter(|s| s.key == key)
            .ok_or_else(|| ObjectStoreError::UploadNotFound(upload_id.to_string()))?;

        if session.parts.len() != parts.len() {
            return Err(ObjectStoreError::PartMismatch(format!(
                "{} parts presented, {} staged",
                parts.len(),
                session.parts.len()
            )));
        }

        let mut assembled = Vec::new();
        for part in parts {
            let (etag, content) = session.parts.get(&part.part_number).ok_or_else(|| {
                ObjectStoreError::PartMismatch(format!("part {} not staged", part.part_number))
            })?;
            if *etag != part.etag {
                return Err(ObjectStoreError::PartMismatch(format!(
                    "etag mismatch for part {}",
                    part.part_number
                )));
            }
            assembled.extend_from_slice(content);
        }

        inner.objects.insert(key.to_string(), Bytes::from(assembled));
        inner.uploads.remove(upload_id);
        Ok(())
    }

    async fn abort_multipart(&self, _key: &str, upload_id: &str) -> ObjectResult<()> {
        self.lock().uploads.remove(upload_id);
        Ok(())
    }
}
