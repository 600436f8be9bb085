//! Image storage port - where uploaded featured images live.

use async_trait::async_trait;

/// Uploaded-image store.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an upload and return the filename it is served under.
    async fn store(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;

    /// Remove a previously stored image.
    async fn remove(&self, filename: &str) -> Result<(), StorageError>;
}

/// Image storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Only image files are allowed")]
    NotAnImage,

    #[error("Image exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for crate::DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => crate::DomainError::Internal(e.to_string()),
            other => crate::DomainError::Validation(other.to_string()),
        }
    }
}
