use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::hash::ContentHasher;
use super::name::{MediaName, validate_flat_name};
use super::traits::{BoxReader, MediaStore, StoredMedia};

/// Media store keeping every file directly under one directory:
/// `{base_path}/{generated file name}`.
pub struct FilesystemMediaStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create the store, creating `base_path` if needed.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn file_path(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.base_path.join(validate_flat_name(file_name)?))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put_stream(
        &self,
        name: &MediaName,
        mut reader: BoxReader,
    ) -> Result<StoredMedia, StorageError> {
        let temp_path = self.temp_path();
        let mut hasher = ContentHasher::new();

        let mut buf = vec![0u8; 64 * 1024];
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            hasher.update(&buf[..n]);
            if hasher.len() > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: hasher.len(),
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        let size = hasher.len();
        let content_hash = hasher.finish();
        let file_name = name.generate();
        let target = self.file_path(&file_name)?;

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(file_name = %file_name, size, "Stored media file");
        Ok(StoredMedia {
            file_name,
            content_hash,
            size,
        })
    }

    async fn get_stream(&self, file_name: &str) -> Result<BoxReader, StorageError> {
        let path = self.file_path(file_name)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, file_name: &str) -> Result<bool, StorageError> {
        let path = self.file_path(file_name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, file_name: &str) -> Result<bool, StorageError> {
        let path = self.file_path(file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, file_name: &str) -> Result<u64, StorageError> {
        let path = self.file_path(file_name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
