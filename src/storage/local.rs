// Local filesystem object storage
// Objects land under {root}/{bucket}/{path} and are addressed as
// {public_base}/{bucket}/{path}. Path segments are restricted to names the
// application generates itself.

use async_trait::async_trait;
use std::path::PathBuf;

use super::{ObjectStorage, StorageError};

pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub fn from_config() -> Self {
        let config = crate::app_config::config();
        Self::new(
            config.storage_root.clone(),
            config.storage_public_base_url.clone(),
        )
    }

    fn check_segment(segment: &str) -> Result<(), StorageError> {
        if segment.is_empty()
            || segment.contains("..")
            || segment.contains('/')
            || segment.contains('\\')
        {
            return Err(StorageError::InvalidPath(segment.to_string()));
        }
        Ok(())
    }

    /// Object paths may contain '/' separators; every segment is validated
    fn checked_relative(path: &str) -> Result<PathBuf, StorageError> {
        let mut relative = PathBuf::new();
        for segment in path.split('/') {
            Self::check_segment(segment)?;
            relative.push(segment);
        }
        Ok(relative)
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<String, StorageError> {
        Self::check_segment(bucket)?;
        let relative = Self::checked_relative(path)?;

        let target = self.root.join(bucket).join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::debug!(bucket, path, size = bytes.len(), "Stored object");

        Ok(self.public_url(bucket, path))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        Self::check_segment(bucket)?;
        let relative = Self::checked_relative(path)?;

        let target = self.root.join(bucket).join(relative);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                tracing::debug!(bucket, path, "Deleted object");
                Ok(())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            bucket,
            path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_shape() {
        let storage = LocalStorage::new("/tmp/store", "/media/");
        assert_eq!(
            storage.public_url("photos", "abc.jpg"),
            "/media/photos/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_rejects_traversal_segments() {
        let storage = LocalStorage::new(std::env::temp_dir(), "/media");
        let err = storage.upload("photos", "../escape.jpg", b"x").await;
        assert!(matches!(err, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_upload_roundtrip() {
        let root = std::env::temp_dir().join("vitrina-storage-test");
        let storage = LocalStorage::new(&root, "/media");

        let url = storage.upload("photos", "t.jpg", b"bytes").await.unwrap();
        assert_eq!(url, "/media/photos/t.jpg");

        let stored = tokio::fs::read(root.join("photos/t.jpg")).await.unwrap();
        assert_eq!(stored, b"bytes");

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_delete_removes_object_and_tolerates_absent() {
        let root = std::env::temp_dir().join("vitrina-storage-delete-test");
        let storage = LocalStorage::new(&root, "/media");

        storage
            .upload("stories", "p-1/clip.jpg", b"img")
            .await
            .unwrap();
        storage.delete("stories", "p-1/clip.jpg").await.unwrap();
        assert!(!root.join("stories/p-1/clip.jpg").exists());

        // Double delete is a no-op, not an error
        storage.delete("stories", "p-1/clip.jpg").await.unwrap();

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_nested_object_paths() {
        let root = std::env::temp_dir().join("vitrina-storage-nested-test");
        let storage = LocalStorage::new(&root, "/media");

        let url = storage
            .upload("photos", "prof-1/pic.jpg", b"img")
            .await
            .unwrap();
        assert_eq!(url, "/media/photos/prof-1/pic.jpg");

        let stored = tokio::fs::read(root.join("photos/prof-1/pic.jpg"))
            .await
            .unwrap();
        assert_eq!(stored, b"img");

        // Traversal hidden in a nested path is still refused
        let err = storage.upload("photos", "a/../b.jpg", b"x").await;
        assert!(matches!(err, Err(StorageError::InvalidPath(_))));

        let _ = tokio::fs::remove_dir_all(root).await;
    }
}
