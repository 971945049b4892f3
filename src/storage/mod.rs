// Object storage collaborator
// Trait seam so handlers never touch a concrete store; the default
// implementation writes to a local directory served under a public base URL.

pub mod local;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),
}

/// Storage buckets known to the application
pub mod buckets {
    pub const PHOTOS: &str = "photos";
    pub const VIDEOS: &str = "videos";
    pub const STORIES: &str = "stories";
    pub const VERIFICATIONS: &str = "verifications";
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object and return its public URL
    async fn upload(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Remove an object. Deleting something that is already gone is not an
    /// error so failed-write cleanup can retry safely.
    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError>;

    /// Public URL for an already-stored object
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
