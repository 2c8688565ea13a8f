use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::hash::ContentHash;
use super::name::MediaName;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Outcome of storing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Generated flat name the file is served under.
    pub file_name: String,
    pub content_hash: ContentHash,
    pub size: u64,
}

/// Storage for uploaded media files, addressed by generated file name.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, name: &MediaName, data: &[u8]) -> Result<StoredMedia, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(name, reader).await
    }

    /// Copy a local file (typically an upload temp file) into the store.
    ///
    /// The source file is left in place; its owner removes it.
    async fn put_file(&self, name: &MediaName, source: &Path) -> Result<StoredMedia, StorageError> {
        let file = tokio::fs::File::open(source).await?;
        self.put_stream(name, Box::new(file)).await
    }

    /// Store data from an async reader under a freshly generated name.
    async fn put_stream(
        &self,
        name: &MediaName,
        reader: BoxReader,
    ) -> Result<StoredMedia, StorageError>;

    async fn get(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(file_name).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn get_stream(&self, file_name: &str) -> Result<BoxReader, StorageError>;

    async fn exists(&self, file_name: &str) -> Result<bool, StorageError>;

    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, file_name: &str) -> Result<bool, StorageError>;

    async fn size(&self, file_name: &str) -> Result<u64, StorageError>;
}
