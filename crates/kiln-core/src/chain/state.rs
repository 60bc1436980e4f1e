//! Current head tracking.
//!
//! `HeadState` is the single source of truth for the block that reads are answered
//! against. Readers (execution, filters, instrumented test providers) load it
//! wait-free; the head-sync provider is its only writer.

use crate::types::Block;
use arc_swap::ArcSwap;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    future::Future,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::sync::Mutex;
use tracing::trace;

/// Returns the current unix timestamp in seconds.
pub(crate) fn current_unix_timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Shared snapshot of the current chain head.
///
/// # Thread Safety
///
/// Reads go through `ArcSwap` and never block. Writes are serialised by an async
/// mutex so that at most one `set_current_block` is in flight; each write replaces
/// the whole block, there is no partial update.
///
/// Readers observe "latest committed at time of read". A request that needs a
/// fresher view must go through the head-sync provider.
///
/// [`HeadState::refresh_with`] holds the write lock across the fetch as well as the
/// store, so concurrent refreshes commit in the order their fetches started and a
/// slow fetch can never overwrite a newer head fetched after it.
///
/// # Example
///
/// ```no_run
/// use kiln_core::{chain::HeadState, types::Block};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let genesis = Block::genesis(0);
/// let head = Arc::new(HeadState::new(genesis));
///
/// head.set_current_block(genesis.child(12)).await;
/// assert_eq!(head.current_number(), 1);
/// # }
/// ```
pub struct HeadState {
    head: ArcSwap<Block>,

    /// Held for the duration of a write.
    write_lock: Mutex<()>,

    /// Unix timestamp (seconds) of the last commit.
    last_update: AtomicU64,

    /// Number of commits since construction.
    commits: AtomicU64,
}

impl HeadState {
    /// Creates a head state positioned at `initial`.
    #[must_use]
    pub fn new(initial: Block) -> Self {
        Self {
            head: ArcSwap::from_pointee(initial),
            write_lock: Mutex::new(()),
            last_update: AtomicU64::new(current_unix_timestamp()),
            commits: AtomicU64::new(0),
        }
    }

    /// Returns the current head block.
    #[inline]
    #[must_use]
    pub fn current_block(&self) -> Arc<Block> {
        self.head.load_full()
    }

    /// Returns the current head block number.
    #[inline]
    #[must_use]
    pub fn current_number(&self) -> u64 {
        self.head.load().number
    }

    /// Returns the number of seconds since the last commit.
    #[inline]
    #[must_use]
    pub fn head_age_seconds(&self) -> u64 {
        let last_update = self.last_update.load(Ordering::Acquire);
        current_unix_timestamp().saturating_sub(last_update)
    }

    /// Returns how many times the head has been committed.
    #[inline]
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Acquire)
    }

    /// Replaces the current head with `block`.
    ///
    /// Unlike a monotonic tip tracker this never rejects a lower block: the head
    /// source is authoritative, and a simulator may legitimately rewind.
    pub async fn set_current_block(&self, block: Block) {
        let _guard = self.write_lock.lock().await;
        self.store(block);
    }

    /// Runs `fetch` under the write lock and commits its block on success.
    ///
    /// Nothing is committed when `fetch` fails.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch`.
    pub async fn refresh_with<F, Fut, E>(&self, fetch: F) -> Result<Block, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Block, E>>,
    {
        let _guard = self.write_lock.lock().await;
        let block = fetch().await?;
        self.store(block);
        Ok(block)
    }

    fn store(&self, block: Block) {
        self.head.store(Arc::new(block));
        self.last_update.store(current_unix_timestamp(), Ordering::Release);
        self.commits.fetch_add(1, Ordering::AcqRel);
        trace!(block = block.number, hash = %block.hash, "current block set");
    }
}
