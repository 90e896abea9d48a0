//! In-memory byte store

use async_trait::async_trait;
use microledger_core::{StorageEffects, StoreError, StoreStat};
use parking_lot::RwLock;
use std::sync::Arc;

/// Anonymous in-memory byte range
///
/// Clones share the same bytes, so a test can keep a handle to inspect or
/// corrupt what a ledger wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageHandler {
    data: Arc<RwLock<Vec<u8>>>,
}

impl MemoryStorageHandler {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `bytes`
    pub fn with_data(bytes: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(bytes)),
        }
    }

    /// Copy of the stored bytes
    pub fn contents(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Number of stored bytes
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageEffects for MemoryStorageHandler {
    async fn open(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn stat(&self) -> Result<StoreStat, StoreError> {
        Ok(StoreStat {
            size: self.data.read().len() as u64,
        })
    }

    async fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>, StoreError> {
        let data = self.data.read();
        let size = data.len() as u64;
        let end = offset.checked_add(length).filter(|end| *end <= size);
        match end {
            Some(end) => Ok(data[offset as usize..end as usize].to_vec()),
            None => Err(StoreError::OutOfBounds {
                offset,
                length,
                size,
            }),
        }
    }

    async fn write(&self, offset: u64, bytes: &[u8]) -> Result<(), StoreError> {
        let start = usize::try_from(offset)
            .map_err(|_| StoreError::io(format!("Offset {offset} exceeds address space")))?;
        let end = start + bytes.len();
        let mut data = self.data.write();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(bytes);
        Ok(())
    }

    async fn truncate(&self, size: u64) -> Result<(), StoreError> {
        let mut data = self.data.write();
        if (data.len() as u64) > size {
            data.truncate(size as usize);
        }
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        self.data.write().clear();
        Ok(())
    }
}
