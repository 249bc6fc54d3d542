use async_trait::async_trait;

use super::checksum::Checksum;
use super::error::StorageError;

/// Location and fingerprint of a file after it has been written.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Relative key under the store root, e.g. `documents/{user}/{uuid}.pdf`.
    pub key: String,
    pub size: u64,
    pub checksum: Checksum,
}

/// Keyed file storage for user uploads.
///
/// Keys are generated by the store; callers only choose the namespace
/// (a `/`-separated relative directory) and an optional extension.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `data` under a fresh key inside `namespace`.
    async fn put(
        &self,
        namespace: &str,
        extension: Option<&str>,
        data: &[u8],
    ) -> Result<StoredFile, StorageError>;

    /// Read the whole file stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}
