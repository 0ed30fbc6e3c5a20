//! Filesystem-backed object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{
    CompletedPart, ObjectResult, ObjectStore, ObjectStoreError, check_part_sequence,
    new_upload_id, part_etag,
};

const UPLOADS_DIR: &str = ".uploads";
const KEY_META_FILE: &str = ".key";

/// An [`ObjectStore`] keeping objects as files under a root directory.
///
/// Object keys map to relative paths below the root. Writes go through a
/// temp file followed by a rename so a crash never leaves a partial object
/// visible. Multipart sessions stage their parts under
/// `<root>/.uploads/<upload_id>/` until completed or aborted.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Opens a store rooted at `root`, creating the directory layout.
    pub async fn new(root: impl Into<PathBuf>) -> ObjectResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(UPLOADS_DIR))
            .await
            .map_err(io_error)?;
        Ok(Self { root })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn upload_dir(&self, upload_id: &str) -> PathBuf {
        self.root.join(UPLOADS_DIR).join(upload_id)
    }

    fn part_path(&self, upload_id: &str, part_number: i32) -> PathBuf {
        self.upload_dir(upload_id)
            .join(format!("{:05}.part", part_number))
    }

    async fn write_atomic(&self, path: &Path, content: &[u8]) -> ObjectResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(io_error)?;
        file.write_all(content).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        drop(file);

        fs::rename(&temp_path, path).await.map_err(io_error)?;
        Ok(())
    }

    /// Checks the session directory exists and was created for `key`.
    async fn load_session_key(&self, key: &str, upload_id: &str) -> ObjectResult<()> {
        let meta = self.upload_dir(upload_id).join(KEY_META_FILE);
        let stored = match fs::read_to_string(&meta).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ObjectStoreError::UploadNotFound(upload_id.to_string()));
            }
            Err(e) => return Err(io_error(e)),
        };

        if stored != key {
            return Err(ObjectStoreError::UploadNotFound(upload_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, content: Bytes) -> ObjectResult<()> {
        self.write_atomic(&self.object_path(key), &content).await
    }

    async fn get(&self, key: &str) -> ObjectResult<Option<Bytes>> {
        match fs::read(self.object_path(key)).await {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }

    async fn delete(&self, key: &str) -> ObjectResult<()> {
        match fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }

    async fn create_multipart(&self, key: &str) -> ObjectResult<String> {
        let upload_id = new_upload_id();
        let dir = self.upload_dir(&upload_id);
        fs::create_dir_all(&dir).await.map_err(io_error)?;
        fs::write(dir.join(KEY_META_FILE), key)
            .await
            .map_err(io_error)?;
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

        self.load_session_key(key, upload_id).await?;

        let etag = part_etag(&content);
        self.write_atomic(&self.part_path(upload_id, part_number), &content)
            .await?;
        Ok(etag)
    }

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> ObjectResult<()> {
        check_part_sequence(parts)?;
        self.load_session_key(key, upload_id).await?;

        let staged = count_staged_parts(&self.upload_dir(upload_id)).await?;
        if staged != parts.len() {
            return Err(ObjectStoreError::PartMismatch(format!(
                "{} parts presented, {} staged",
                parts.len(),
                staged
            )));
        }

        let mut assembled = Vec::new();
        for part in parts {
            let path = self.part_path(upload_id, part.part_number);
            let content = match fs::read(&path).await {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(ObjectStoreError::PartMismatch(format!(
                        "part {} not staged",
                        part.part_number
                    )));
                }
                Err(e) => return Err(io_error(e)),
            };
            if part_etag(&content) != part.etag {
                return Err(ObjectStoreError::PartMismatch(format!(
                    "etag mismatch for part {}",
                    part.part_number
                )));
            }
            assembled.extend_from_slice(&content);
        }

        self.write_atomic(&self.object_path(key), &assembled).await?;
        fs::remove_dir_all(self.upload_dir(upload_id))
            .await
            .map_err(io_error)?;
        Ok(())
    }

    async fn abort_multipart(&self, _key: &str, upload_id: &str) -> ObjectResult<()> {
        match fs::remove_dir_all(self.upload_dir(upload_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
}

async fn count_staged_parts(dir: &Path) -> ObjectResult<usize> {
    let mut entries = fs::read_dir(dir).await.map_err(io_error)?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        if entry.file_name().to_string_lossy().ends_with(".part") {
            count += 1;
        }
    }
    Ok(count)
}

fn io_error(e: std::io::Error) -> ObjectStoreError {
    ObjectStoreError::Storage(e.to_string())
}
