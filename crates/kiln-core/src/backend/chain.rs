//! In-memory block store.

use crate::{
    sync::{HeadFetchError, HeadSource},
    types::Block,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

fn now_seconds() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Append-only list of blocks, indexed by number.
///
/// Block `n` always sits at index `n`. The store is the execution side's view of
/// the chain; [`crate::chain::HeadState`] only learns about new blocks through the
/// head-sync provider.
pub struct MemoryChain {
    blocks: RwLock<Vec<Block>>,
}

impl MemoryChain {
    /// Creates a chain holding only a genesis block stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_genesis(Block::genesis(now_seconds()))
    }

    #[must_use]
    pub fn with_genesis(genesis: Block) -> Self {
        Self { blocks: RwLock::new(vec![genesis]) }
    }

    /// Appends a block on top of the latest one and returns it.
    pub fn mine(&self) -> Block {
        let mut blocks = self.blocks.write();
        let parent = blocks[blocks.len() - 1];
        let block = parent.child(now_seconds());
        blocks.push(block);
        drop(blocks);

        info!(number = block.number, hash = %block.hash, "block mined");
        block
    }

    #[must_use]
    pub fn latest(&self) -> Block {
        let blocks = self.blocks.read();
        blocks[blocks.len() - 1]
    }

    #[must_use]
    pub fn genesis(&self) -> Block {
        self.blocks.read()[0]
    }

    #[must_use]
    pub fn block_by_number(&self, number: u64) -> Option<Block> {
        let index = usize::try_from(number).ok()?;
        self.blocks.read().get(index).copied()
    }

    /// Blocks with `from <= number <= to`, clamped to what exists.
    #[must_use]
    pub fn blocks_in_range(&self, from: u64, to: u64) -> Vec<Block> {
        if from > to {
            return Vec::new();
        }
        let blocks = self.blocks.read();
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(blocks.len());
        let end = usize::try_from(to).unwrap_or(usize::MAX).saturating_add(1).min(blocks.len());
        blocks[start..end].to_vec()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Always false: a chain has at least its genesis block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HeadSource for MemoryChain {
    async fn fetch_latest_head(&self) -> Result<Block, HeadFetchError> {
        Ok(self.latest())
    }
}
