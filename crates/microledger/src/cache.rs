//! Record cache
//!
//! Bounded LRU of raw frame payloads keyed by sequence number. Payloads stay
//! in their stored form (sealed if the ledger is encrypted); decoding happens
//! on every hit. Besides serving hits, the cached offsets let a scan resume
//! from the closest known frame instead of the start of the ledger.

use std::collections::BTreeMap;

/// Default number of cached frames
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

/// A cached frame payload and where it lives on the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFrame {
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Offset of the payload (just past its leading length)
    pub offset: u64,
    /// Payload length
    pub length: u64,
}

impl CachedFrame {
    /// Offset of the following frame's leading length
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

#[derive(Debug)]
struct Slot {
    frame: CachedFrame,
    tick: u64,
}

/// Fixed-capacity LRU over frame payloads
#[derive(Debug)]
pub struct RecordCache {
    capacity: usize,
    entries: BTreeMap<i64, Slot>,
    recency: BTreeMap<u64, i64>,
    clock: u64,
}

impl RecordCache {
    /// Create a cache holding at most `capacity` frames (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: BTreeMap::new(),
            recency: BTreeMap::new(),
            clock: 0,
        }
    }

    /// Maximum number of cached frames
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached frames
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached frame for `seq`, marking it most recently used
    pub fn get(&mut self, seq: i64) -> Option<CachedFrame> {
        let tick = self.next_tick();
        let slot = self.entries.get_mut(&seq)?;
        self.recency.remove(&slot.tick);
        slot.tick = tick;
        self.recency.insert(tick, seq);
        Some(slot.frame.clone())
    }

    /// Cache `frame` for `seq`, replacing any previous entry
    pub fn insert(&mut self, seq: i64, frame: CachedFrame) {
        let tick = self.next_tick();
        if let Some(old) = self.entries.insert(seq, Slot { frame, tick }) {
            self.recency.remove(&old.tick);
        }
        self.recency.insert(tick, seq);

        while self.entries.len() > self.capacity {
            let Some((_, evicted)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&evicted);
            tracing::trace!(seq = evicted, "evicted cached frame");
        }
    }

    /// Closest cached frame at or below `seq`, without touching recency
    pub fn nearest_at_or_below(&self, seq: i64) -> Option<(i64, &CachedFrame)> {
        self.entries
            .range(..=seq)
            .next_back()
            .map(|(seq, slot)| (*seq, &slot.frame))
    }

    /// Drop every cached frame
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
