//! Template asset catalog entities with tiered storage.

/// `storage_type` column value for payloads stored in the relational catalog.
pub const STORAGE_DB: i16 = 0;
/// `storage_type` column value for payloads stored in the remote object tier.
pub const STORAGE_REMOTE: i16 = 1;

/// Where an asset's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    /// Bytes stored inline on the catalog row.
    Db(Vec<u8>),
    /// Key into the remote object tier.
    Remote(String),
}

/// A catalog asset with validated payload location.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    pub id: i64,
    pub asset_prefix: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub payload: AssetPayload,
}

/// Raw catalog row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssetRow {
    pub id: i64,
    pub asset_prefix: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub storage_type: i16,
    pub content: Option<Vec<u8>>,
    pub remote_key: Option<String>,
}

impl AssetRow {
    /// Validates the row into a usable asset, or `None` when the payload
    /// field required by its `storage_type` tag is absent.
    pub fn into_asset(self) -> Option<TemplateAsset> {
        let payload = match self.storage_type {
            STORAGE_DB => AssetPayload::Db(self.content?),
            STORAGE_REMOTE => AssetPayload::Remote(self.remote_key?),
            _ => return None,
        };

        Some(TemplateAsset {
            id: self.id,
            asset_prefix: self.asset_prefix,
            filename: self.filename,
            content_type: self.content_type,
            size: self.size,
            payload,
        })
    }
}

/// Input data for inserting a catalog row.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_prefix: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    /// SHA-256 hex of the payload, when known at ingest time.
    pub checksum: Option<String>,
    pub storage: NewAssetStorage,
    pub is_public: bool,
}

/// Payload location for a new catalog row.
#[derive(Debug, Clone)]
pub enum NewAssetStorage {
    Db(Vec<u8>),
    Remote(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(storage_type: i16) -> AssetRow {
        AssetRow {
            id: 1,
            asset_prefix: "landing".to_string(),
            filename: "index.html".to_string(),
            content_type: Some("text/html".to_string()),
            size: 5,
            storage_type,
            content: None,
            remote_key: None,
        }
    }

    #[test]
    fn test_db_asset_requires_content() {
        assert!(row(STORAGE_DB).into_asset().is_none());

        let mut r = row(STORAGE_DB);
        r.content = Some(b"bytes".to_vec());
        let asset = r.into_asset().unwrap();
        assert_eq!(asset.payload, AssetPayload::Db(b"bytes".to_vec()));
    }

    #[test]
    fn test_remote_asset_requires_key() {
        assert!(row(STORAGE_REMOTE).into_asset().is_none());

        let mut r = row(STORAGE_REMOTE);
        r.remote_key = Some("landing/index.html".to_string());
        let asset = r.into_asset().unwrap();
        assert_eq!(
            asset.payload,
            AssetPayload::Remote("landing/index.html".to_string())
        );
    }

    #[test]
    fn test_unknown_storage_type_is_malformed() {
        assert!(row(7).into_asset().is_none());
    }
}
