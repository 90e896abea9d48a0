//! Byte store effects
//!
//! A ledger lives on a single random-access byte range. Implementations must
//! report a missing backing object as [`StoreError::NotFound`] from `stat`;
//! the ledger treats that as the signal to initialize a fresh store.

use async_trait::async_trait;
use std::sync::Arc;

/// Byte store operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Read past the end of the stored bytes
    #[error("Out of bounds: read {length} bytes at {offset}, store holds {size}")]
    OutOfBounds {
        /// Requested offset
        offset: u64,
        /// Requested length
        length: u64,
        /// Current size of the store
        size: u64,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Result of a `stat` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStat {
    /// Number of bytes currently stored
    pub size: u64,
}

/// Random-access byte store
///
/// Every call is logically sequential; the engine never issues two calls
/// against the same store concurrently from the write path.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Prepare the store for use (create parent directories, etc.)
    async fn open(&self) -> Result<(), StoreError>;

    /// Report the current size, or `NotFound` if nothing has been written yet
    async fn stat(&self) -> Result<StoreStat, StoreError>;

    /// Read exactly `length` bytes starting at `offset`
    async fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>, StoreError>;

    /// Write `data` at `offset`, growing the store if needed
    async fn write(&self, offset: u64, data: &[u8]) -> Result<(), StoreError>;

    /// Cut the store down to `size` bytes; a no-op when already shorter
    async fn truncate(&self, size: u64) -> Result<(), StoreError>;

    /// Delete the backing object
    async fn delete(&self) -> Result<(), StoreError>;

    /// Push buffered writes to durable storage
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl<T: StorageEffects + ?Sized> StorageEffects for Arc<T> {
    async fn open(&self) -> Result<(), StoreError> {
        (**self).open().await
    }

    async fn stat(&self) -> Result<StoreStat, StoreError> {
        (**self).stat().await
    }

    async fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>, StoreError> {
        (**self).read(offset, length).await
    }

    async fn write(&self, offset: u64, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(offset, data).await
    }

    async fn truncate(&self, size: u64) -> Result<(), StoreError> {
        (**self).truncate(size).await
    }

    async fn delete(&self) -> Result<(), StoreError> {
        (**self).delete().await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        (**self).flush().await
    }
}
