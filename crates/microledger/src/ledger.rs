//! Ledger lifecycle, append path and random-access reads
//!
//! Persisted layout:
//!
//! ```text
//! [header][frame 0][frame 1]...[frame N][8B reverse length of frame N]
//! ```
//!
//! `size` is the offset of the reverse length. An append writes the new
//! payload and its reverse length first, then replaces the old reverse length
//! with the new frame's leading length. Each write is flushed before the
//! next, so a failure part way leaves the previous tail readable.

use crate::builder::NodeBuilder;
use crate::cache::{CachedFrame, RecordCache};
use crate::frame::{self, PayloadCodec, LENGTH_BYTES};
use crate::gate::AuthorizationGate;
use crate::header::{self, GENESIS_OFFSET, HEADER_PROLOGUE};
use crate::options::LedgerOptions;
use crate::verify::{is_linked, verify_integrity};
use futures::stream::{self, Stream, StreamExt};
use microledger_authorization::{validate_genesis, AuthorizationError};
use microledger_core::{
    CryptoEffects, LedgerMode, MicroledgerError, Node, Result, StorageEffects, StoreError, Value,
    GENESIS_SEQ,
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// State known once the store has been opened
#[derive(Debug)]
struct OpenState {
    genesis: Arc<Node>,
    first_frame: u64,
    tail: RwLock<Tail>,
}

#[derive(Debug, Clone)]
struct Tail {
    next_seq: i64,
    size: u64,
    last: Arc<Node>,
}

/// Append-only, hash-chained ledger over a byte store
///
/// Opens lazily on the first call that needs the store. Appends take
/// `&mut self`, so a ledger has exactly one writer; reads take `&self` and
/// may run concurrently. Two `Ledger` values over the same backing bytes are
/// not coordinated in any way.
pub struct Ledger<S: StorageEffects> {
    store: S,
    mode: LedgerMode,
    genesis_value: Value,
    crypto: Arc<dyn CryptoEffects>,
    codec: PayloadCodec,
    builder: NodeBuilder,
    gate: Option<AuthorizationGate>,
    cache: Mutex<RecordCache>,
    state: OnceCell<OpenState>,
}

impl<S: StorageEffects> Ledger<S> {
    /// Create an unopened ledger over `store`
    ///
    /// Fails with `Config` when protections are set without a keypair, or
    /// when the genesis document cannot seed a gated ledger.
    pub fn new(store: S, options: LedgerOptions) -> Result<Self> {
        let LedgerOptions {
            genesis,
            passphrase,
            keypair,
            protections,
            cache_capacity,
            crypto,
            document,
            predicate,
        } = options;

        if !genesis.is_object() {
            return Err(MicroledgerError::config("Genesis must be a JSON object"));
        }
        if protections.is_some() {
            if keypair.is_none() {
                return Err(MicroledgerError::config(
                    AuthorizationError::MissingKeypair.to_string(),
                ));
            }
            validate_genesis(&genesis).map_err(|e| MicroledgerError::config(e.to_string()))?;
        }

        let mode =
            LedgerMode::from_options(passphrase.is_some(), keypair.is_some(), protections.is_some());
        let secret_key = passphrase.map(|passphrase| crypto.derive_secret_key(&passphrase));

        Ok(Self {
            store,
            mode,
            genesis_value: genesis,
            codec: PayloadCodec::new(crypto.clone(), secret_key),
            builder: NodeBuilder::new(crypto.clone(), document, keypair),
            gate: protections.map(|protections| AuthorizationGate::new(protections, predicate)),
            crypto,
            cache: Mutex::new(RecordCache::new(cache_capacity)),
            state: OnceCell::new(),
        })
    }

    /// Mode implied by the construction options
    pub fn mode(&self) -> LedgerMode {
        self.mode
    }

    /// Whether the store has been opened
    pub fn is_open(&self) -> bool {
        self.state.initialized()
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open the store, initializing or resuming it
    ///
    /// Idempotent: once open, later calls return without I/O. A version or
    /// mode mismatch leaves the ledger unopened.
    pub async fn open(&self) -> Result<()> {
        self.ensure_open().await.map(|_| ())
    }

    /// Genesis node
    pub async fn genesis(&self) -> Result<Node> {
        Ok(Node::clone(&self.ensure_open().await?.genesis))
    }

    /// Sequence number the next append will receive
    pub async fn next_seq(&self) -> Result<i64> {
        Ok(self.ensure_open().await?.tail.read().next_seq)
    }

    /// Logical persisted size (offset of the reverse length)
    pub async fn size(&self) -> Result<u64> {
        Ok(self.ensure_open().await?.tail.read().size)
    }

    /// Current accumulated document
    pub async fn document(&self) -> Result<Value> {
        Ok(self.ensure_open().await?.tail.read().last.state.clone())
    }

    /// Append `delta`, returning the new node
    ///
    /// Nothing is written when the gate denies the node, and in-memory state
    /// only moves once both writes have succeeded.
    pub async fn append(&mut self, delta: Value) -> Result<Node> {
        let state = self.ensure_open().await?;
        let Tail {
            next_seq: seq,
            size,
            last: previous,
        } = state.tail.read().clone();

        let node = self.builder.next(&previous, delta, seq)?;
        if let Some(gate) = &self.gate {
            gate.check(self.crypto.as_ref(), &node, &previous)?;
        }

        let payload = self.codec.encode(&node)?;
        let length = payload.len() as u64;
        let offset = size + LENGTH_BYTES as u64;

        if let Err(e) = self.write_frame(size, &payload).await {
            self.discard_torn_frame(size).await;
            return Err(e);
        }

        let node = Arc::new(node);
        {
            let mut tail = state.tail.write();
            tail.next_seq = seq + 1;
            tail.size = offset + length;
            tail.last = node.clone();
        }
        self.cache.lock().insert(
            seq,
            CachedFrame {
                payload,
                offset,
                length,
            },
        );

        tracing::debug!(seq, offset, length, "appended node");
        Ok(Node::clone(&node))
    }

    /// Node at `seq`, or `None` when out of range or unreadable
    ///
    /// Read and decode failures are logged and reported as `None`; only a
    /// failure to open the ledger is returned as an error.
    pub async fn get(&self, seq: i64) -> Result<Option<Node>> {
        let state = self.ensure_open().await?;
        if seq == GENESIS_SEQ {
            return Ok(Some(Node::clone(&state.genesis)));
        }

        let (next_seq, size) = {
            let tail = state.tail.read();
            (tail.next_seq, tail.size)
        };
        if seq < GENESIS_SEQ || seq >= next_seq {
            return Ok(None);
        }

        let cached = self.cache.lock().get(seq);
        if let Some(frame) = cached {
            return Ok(self.decode_or_warn(seq, &frame.payload));
        }

        let frame = match self.scan(state, seq, size).await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(seq, error = %e, "failed to locate frame");
                return Ok(None);
            }
        };
        let node = self.decode_or_warn(seq, &frame.payload);
        if node.is_some() {
            self.cache.lock().insert(seq, frame);
        }
        Ok(node)
    }

    /// Last node, read through the reverse length
    ///
    /// Returns the genesis node while no frame has been appended.
    pub async fn last(&self) -> Result<Node> {
        let state = self.ensure_open().await?;
        let size = state.tail.read().size;
        if size == state.first_frame {
            return Ok(Node::clone(&state.genesis));
        }
        let (_, node) = self.read_last(size, state.first_frame).await?;
        Ok(node)
    }

    /// Whether `node` hashes correctly and carries a valid signature if signed
    pub fn verify_integrity(&self, node: &Node) -> bool {
        verify_integrity(self.crypto.as_ref(), node)
    }

    /// Whether the node at `seq` is intact and linked to its predecessor
    pub async fn verify(&self, seq: i64) -> Result<bool> {
        if seq < GENESIS_SEQ {
            return Ok(false);
        }
        let Some(node) = self.get(seq).await? else {
            return Ok(false);
        };
        if seq > GENESIS_SEQ {
            let Some(previous) = self.get(seq - 1).await? else {
                return Ok(false);
            };
            if !is_linked(&previous, &node) {
                return Ok(false);
            }
        }
        Ok(self.verify_integrity(&node))
    }

    /// Whether every node from genesis to the tail is intact and linked
    pub async fn verify_all(&self) -> Result<bool> {
        let nodes = self.nodes();
        futures::pin_mut!(nodes);

        let mut previous: Option<Node> = None;
        while let Some(node) = nodes.next().await {
            let Some(node) = node? else {
                return Ok(false);
            };
            if let Some(previous) = &previous {
                if !is_linked(previous, &node) {
                    tracing::warn!(seq = node.seq, "chain linkage broken");
                    return Ok(false);
                }
            }
            if !self.verify_integrity(&node) {
                tracing::warn!(seq = node.seq, "node failed integrity check");
                return Ok(false);
            }
            previous = Some(node);
        }
        Ok(true)
    }

    /// Lazy stream of every node from genesis up to the current tail
    ///
    /// The bound is taken when the stream is first polled. Each item is the
    /// result of [`Self::get`], so unreadable nodes appear as `Ok(None)`.
    pub fn nodes(&self) -> impl Stream<Item = Result<Option<Node>>> + '_ {
        stream::once(self.next_seq()).flat_map(move |end| match end {
            Ok(end) => stream::iter(GENESIS_SEQ..end)
                .then(move |seq| self.get(seq))
                .left_stream(),
            Err(e) => stream::iter([Err(e)]).right_stream(),
        })
    }

    /// Give back the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Delete the backing store
    pub async fn destroy(self) -> Result<()> {
        self.store.delete().await?;
        tracing::info!("ledger destroyed");
        Ok(())
    }

    async fn ensure_open(&self) -> Result<&OpenState> {
        self.state.get_or_try_init(|| self.open_store()).await
    }

    async fn open_store(&self) -> Result<OpenState> {
        tracing::debug!(mode = %self.mode, "opening ledger");
        match self.store.stat().await {
            Ok(stat) if stat.size > 0 => self.resume(stat.size).await,
            Ok(_) | Err(StoreError::NotFound(_)) => self.initialize().await,
            Err(e) => Err(e.into()),
        }
    }

    async fn initialize(&self) -> Result<OpenState> {
        self.store.open().await?;

        let genesis = self.builder.genesis(self.genesis_value.clone())?;
        let payload = self.codec.encode(&genesis)?;
        let header = header::encode_header(self.mode, &payload);
        self.store.write(0, &header).await?;
        self.store.flush().await?;

        let size = (header.len() - LENGTH_BYTES) as u64;
        tracing::info!(mode = %self.mode, size, "initialized ledger");

        let genesis = Arc::new(genesis);
        Ok(OpenState {
            genesis: genesis.clone(),
            first_frame: size,
            tail: RwLock::new(Tail {
                next_seq: 0,
                size,
                last: genesis,
            }),
        })
    }

    async fn resume(&self, stored: u64) -> Result<OpenState> {
        let minimum = GENESIS_OFFSET + LENGTH_BYTES as u64;
        if stored < minimum {
            return Err(MicroledgerError::corrupt(format!(
                "Store holds {stored} bytes, a header needs at least {minimum}"
            )));
        }

        let prologue = self.store.read(0, HEADER_PROLOGUE as u64).await?;
        header::check_prologue(&prologue, self.mode)?;

        let genesis_length = frame::decode_length(
            &self
                .store
                .read(HEADER_PROLOGUE as u64, LENGTH_BYTES as u64)
                .await?,
        )?;
        let first_frame = GENESIS_OFFSET.saturating_add(genesis_length);
        if stored < first_frame.saturating_add(LENGTH_BYTES as u64) {
            return Err(MicroledgerError::corrupt(format!(
                "Genesis of {genesis_length} bytes does not fit a store of {stored} bytes"
            )));
        }
        let size = self.recover_tail(stored, first_frame).await?;

        let genesis_payload = self.store.read(GENESIS_OFFSET, genesis_length).await?;
        let genesis = Arc::new(self.codec.decode(&genesis_payload)?);

        let last = if size == first_frame {
            genesis.clone()
        } else {
            let (frame, node) = self.read_last(size, first_frame).await?;
            self.cache.lock().insert(node.seq, frame);
            Arc::new(node)
        };

        tracing::info!(
            mode = %self.mode,
            size,
            next_seq = last.seq + 1,
            "resumed ledger"
        );
        Ok(OpenState {
            genesis,
            first_frame,
            tail: RwLock::new(Tail {
                next_seq: last.seq + 1,
                size,
                last,
            }),
        })
    }

    async fn write_frame(&self, size: u64, payload: &[u8]) -> Result<()> {
        let offset = size + LENGTH_BYTES as u64;
        self.store.write(offset, &frame::tail_bytes(payload)).await?;
        self.store.flush().await?;
        self.store
            .write(size, &frame::encode_length(payload.len() as u64))
            .await?;
        self.store.flush().await?;
        Ok(())
    }

    /// Cut away whatever a failed append left past the current tail
    async fn discard_torn_frame(&self, size: u64) {
        if let Err(e) = self.store.truncate(size + LENGTH_BYTES as u64).await {
            tracing::warn!(size, error = %e, "failed to discard torn frame");
        }
    }

    /// Offset of the reverse length of the last complete frame
    ///
    /// A frame whose leading length was never written still ends the store
    /// with its own reverse length. Its leading slot then holds the previous
    /// tail's reverse length instead of a matching value, so the tail steps
    /// back to that slot and the torn bytes are dropped. Nothing is cut unless
    /// that slot is shown to end the genesis or a complete frame.
    async fn recover_tail(&self, stored: u64, first_frame: u64) -> Result<u64> {
        let size = stored - LENGTH_BYTES as u64;
        if size == first_frame {
            return Ok(size);
        }

        let length = frame::decode_length(&self.store.read(size, LENGTH_BYTES as u64).await?)?;
        let leading_at = length
            .checked_add(LENGTH_BYTES as u64)
            .and_then(|span| size.checked_sub(span))
            .filter(|at| *at >= first_frame)
            .ok_or_else(|| {
                MicroledgerError::corrupt(format!(
                    "Reverse length {length} at {size} points before the first frame"
                ))
            })?;
        let leading =
            frame::decode_length(&self.store.read(leading_at, LENGTH_BYTES as u64).await?)?;
        if leading == length {
            return Ok(size);
        }

        if !self.ends_frame(leading_at, leading, first_frame).await? {
            return Err(MicroledgerError::corrupt(format!(
                "Reverse length {length} at {size} does not end a frame"
            )));
        }

        tracing::warn!(
            torn_at = leading_at,
            length,
            "discarding torn tail frame"
        );
        self.discard_torn_frame(leading_at).await;
        Ok(leading_at)
    }

    /// Whether `length` stored at `at` is the reverse length of the genesis
    /// or of a frame whose leading length agrees with it
    async fn ends_frame(&self, at: u64, length: u64, first_frame: u64) -> Result<bool> {
        if at == first_frame {
            return Ok(length == first_frame - GENESIS_OFFSET);
        }
        let Some(leading_at) = length
            .checked_add(LENGTH_BYTES as u64)
            .and_then(|span| at.checked_sub(span))
            .filter(|leading_at| *leading_at >= first_frame)
        else {
            return Ok(false);
        };
        let leading =
            frame::decode_length(&self.store.read(leading_at, LENGTH_BYTES as u64).await?)?;
        Ok(leading == length)
    }

    async fn read_last(&self, size: u64, first_frame: u64) -> Result<(CachedFrame, Node)> {
        let length = frame::decode_length(&self.store.read(size, LENGTH_BYTES as u64).await?)?;
        let offset = size
            .checked_sub(length)
            .filter(|offset| *offset >= first_frame + LENGTH_BYTES as u64)
            .ok_or_else(|| {
                MicroledgerError::corrupt(format!(
                    "Reverse length {length} at {size} points before the first frame"
                ))
            })?;
        let payload = self.store.read(offset, length).await?;
        let node = self.codec.decode(&payload)?;
        Ok((
            CachedFrame {
                payload,
                offset,
                length,
            },
            node,
        ))
    }

    /// Walk frames forward from the closest cached predecessor to `seq`
    async fn scan(&self, state: &OpenState, seq: i64, size: u64) -> Result<CachedFrame> {
        let start = self
            .cache
            .lock()
            .nearest_at_or_below(seq - 1)
            .map(|(found, frame)| (found + 1, frame.end()));
        let (mut current, mut cursor) = start.unwrap_or((0, state.first_frame));

        loop {
            let length = frame::decode_length(
                &self.store.read(cursor, LENGTH_BYTES as u64).await?,
            )?;
            let offset = cursor + LENGTH_BYTES as u64;
            let end = offset
                .checked_add(length)
                .filter(|end| *end <= size)
                .ok_or_else(|| {
                    MicroledgerError::corrupt(format!(
                        "Frame {current} at {cursor} claims {length} bytes past the tail"
                    ))
                })?;

            if current == seq {
                let payload = self.store.read(offset, length).await?;
                return Ok(CachedFrame {
                    payload,
                    offset,
                    length,
                });
            }
            current += 1;
            cursor = end;
        }
    }

    fn decode_or_warn(&self, seq: i64, payload: &[u8]) -> Option<Node> {
        match self.codec.decode(payload) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!(seq, error = %e, "failed to decode node");
                None
            }
        }
    }
}

impl<S: StorageEffects + std::fmt::Debug> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store)
            .field("mode", &self.mode)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
