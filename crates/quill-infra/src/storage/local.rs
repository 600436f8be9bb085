//! Local disk image store - uploads live in one flat directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use quill_core::ports::{ImageStore, StorageError};

/// Default upload size limit (5 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Stores images as `image-<millis>-<random><ext>` under `root`.
pub struct LocalImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalImageStore {
    /// Open the store, creating the upload directory if needed.
    pub async fn init(root: impl Into<PathBuf>, max_bytes: usize) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(dir = %root.display(), max_bytes, "Image store ready");
        Ok(Self { root, max_bytes })
    }

    fn extension(original_name: Option<&str>) -> String {
        original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    /// Stored names are flat: anything that could escape the directory is
    /// refused.
    fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let flat = !filename.is_empty()
            && !filename.contains(['/', '\\'])
            && filename != "."
            && filename != "..";
        if !flat {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
            return Err(StorageError::NotAnImage);
        }
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge(self.max_bytes));
        }

        let random = Uuid::new_v4().simple().to_string();
        let filename = format!(
            "image-{}-{}{}",
            Utc::now().timestamp_millis(),
            &random[..8],
            Self::extension(original_name)
        );

        tokio::fs::write(self.path_for(&filename)?, &bytes).await?;
        tracing::debug!(%filename, size = bytes.len(), "Stored image");

        Ok(filename)
    }

    async fn remove(&self, filename: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(filename)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store(dir: &tempfile::TempDir) -> LocalImageStore {
        LocalImageStore::init(dir.path(), 16).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let images = store(&dir).await;

        let name = images
            .store(Some("Cat.PNG"), Some("image/png"), vec![1, 2, 3])
            .await
            .unwrap();

        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), vec![1, 2, 3]);

        images.remove(&name).await.unwrap();
        assert!(!dir.path().join(&name).exists());
    }

    #[tokio::test]
    async fn test_rejects_non_images_and_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let images = store(&dir).await;

        let text = images.store(Some("a.txt"), Some("text/plain"), vec![1]).await;
        let huge = images.store(Some("a.png"), Some("image/png"), vec![0; 17]).await;

        assert!(matches!(text, Err(StorageError::NotAnImage)));
        assert!(matches!(huge, Err(StorageError::TooLarge(16))));
    }

    #[tokio::test]
    async fn test_remove_refuses_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let images = store(&dir).await;

        assert!(matches!(
            images.remove("../secret").await,
            Err(StorageError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_removing_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let images = store(&dir).await;

        assert!(images.remove("image-1-deadbeef.png").await.is_ok());
    }
}
