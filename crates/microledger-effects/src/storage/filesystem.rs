//! Filesystem byte store
//!
//! One ledger maps to one file. The file is created lazily by the first write,
//! so `stat` on a fresh path reports `NotFound` and the ledger initializes.

use async_trait::async_trait;
use microledger_core::{StorageEffects, StoreError, StoreStat};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// File-backed byte store for production use
#[derive(Debug, Clone)]
pub struct FilesystemStorageHandler {
    path: PathBuf,
}

impl FilesystemStorageHandler {
    /// Create a handler for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageEffects for FilesystemStorageHandler {
    async fn open(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::io(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }
        tracing::debug!(path = %self.path.display(), "opened filesystem store");
        Ok(())
    }

    async fn stat(&self) -> Result<StoreStat, StoreError> {
        let metadata = fs::metadata(&self.path).await?;
        Ok(StoreStat {
            size: metadata.len(),
        })
    }

    async fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>, StoreError> {
        let mut file = fs::File::open(&self.path).await?;
        let size = file.metadata().await?.len();
        if offset.checked_add(length).map_or(true, |end| end > size) {
            return Err(StoreError::OutOfBounds {
                offset,
                length,
                size,
            });
        }

        let len = usize::try_from(length)
            .map_err(|_| StoreError::io(format!("Read of {length} bytes exceeds address space")))?;
        let mut buf = vec![0u8; len];
        file.seek(SeekFrom::Start(offset)).await?;
        file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn write(&self, offset: u64, data: &[u8]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .await?;
        file.seek(SeekFrom::Start(offset)).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn truncate(&self, size: u64) -> Result<(), StoreError> {
        let file = OpenOptions::new().write(true).open(&self.path).await?;
        if file.metadata().await?.len() > size {
            file.set_len(size).await?;
        }
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let file = OpenOptions::new().write(true).open(&self.path).await?;
        file.sync_data().await?;
        Ok(())
    }
}
