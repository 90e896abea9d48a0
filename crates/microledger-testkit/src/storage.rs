//! Fault-injecting byte store

use async_trait::async_trait;
use microledger_core::{StorageEffects, StoreError, StoreStat};
use microledger_effects::MemoryStorageHandler;
use parking_lot::Mutex;
use std::sync::Arc;

/// Mutating store call that reached the wrapped store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Bytes written at an offset
    Write {
        /// Offset of the first byte
        offset: u64,
        /// Bytes written
        len: usize,
    },
    /// Buffered writes flushed
    Flush,
    /// Store cut to the given size
    Truncate(u64),
}

/// Wraps a store and fails writes on demand
///
/// `fail_write_after(n)` lets the next `n` writes through and fails the one
/// after; the fault then disarms itself. Every write, flush and truncate that
/// succeeds is logged in order. Clones share the fault state and the log.
#[derive(Debug, Clone)]
pub struct FaultyStorageHandler<S = MemoryStorageHandler> {
    inner: S,
    remaining: Arc<Mutex<Option<usize>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
}

impl FaultyStorageHandler<MemoryStorageHandler> {
    /// Wrap a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryStorageHandler::new())
    }
}

impl<S> FaultyStorageHandler<S> {
    /// Wrap `inner` with no fault armed
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            remaining: Arc::new(Mutex::new(None)),
            operations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the write following the next `successes` writes
    pub fn fail_write_after(&self, successes: usize) {
        *self.remaining.lock() = Some(successes);
    }

    /// Fail the very next write
    pub fn fail_next_write(&self) {
        self.fail_write_after(0);
    }

    /// Disarm any pending fault
    pub fn disarm(&self) {
        *self.remaining.lock() = None;
    }

    /// Wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Logged operations, oldest first
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Forget the logged operations
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp) {
        self.operations.lock().push(op);
    }

    fn should_fail(&self) -> bool {
        let mut remaining = self.remaining.lock();
        match *remaining {
            Some(0) => {
                *remaining = None;
                true
            }
            Some(n) => {
                *remaining = Some(n - 1);
                false
            }
            None => false,
        }
    }
}

#[async_trait]
impl<S: StorageEffects> StorageEffects for FaultyStorageHandler<S> {
    async fn open(&self) -> Result<(), StoreError> {
        self.inner.open().await
    }

    async fn stat(&self) -> Result<StoreStat, StoreError> {
        self.inner.stat().await
    }

    async fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>, StoreError> {
        self.inner.read(offset, length).await
    }

    async fn write(&self, offset: u64, data: &[u8]) -> Result<(), StoreError> {
        if self.should_fail() {
            return Err(StoreError::io(format!(
                "injected write failure at offset {offset}"
            )));
        }
        self.inner.write(offset, data).await?;
        self.record(StoreOp::Write {
            offset,
            len: data.len(),
        });
        Ok(())
    }

    async fn truncate(&self, size: u64) -> Result<(), StoreError> {
        self.inner.truncate(size).await?;
        self.record(StoreOp::Truncate(size));
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        self.inner.delete().await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.inner.flush().await?;
        self.record(StoreOp::Flush);
        Ok(())
    }
}
