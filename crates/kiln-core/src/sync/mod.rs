//! Reactive head synchronisation.
//!
//! Some methods must observe a fresh chain head. The [`HeadSyncProvider`] sits at
//! the front of the chain and, for methods listed in its [`SyncPolicyTable`],
//! refreshes [`crate::chain::HeadState`] from a [`HeadSource`]:
//!
//! - [`SyncPolicy::Before`]: fetch and commit, then pass the request on. A failed
//!   fetch aborts the request and commits nothing.
//! - [`SyncPolicy::After`]: pass the request on with an interceptor that fetches and
//!   commits once downstream has settled. A failed fetch replaces the downstream
//!   outcome, even a successful one.
//!
//! Methods absent from the table pass through untouched.
//!
//! Each request syncs on its own. Batch elements that share a method each trigger
//! their own fetch.

pub mod policy;
pub mod provider;

pub use policy::{SyncConfigError, SyncPolicy, SyncPolicyTable};
pub use provider::HeadSyncProvider;

use crate::types::Block;
use async_trait::async_trait;

/// Failure to obtain the latest head from a [`HeadSource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeadFetchError {
    #[error("head source unavailable: {0}")]
    Unavailable(String),

    #[error("head source returned no block")]
    Missing,
}

/// Something that knows the latest block, normally the execution backend.
#[async_trait]
pub trait HeadSource: Send + Sync {
    /// Fetches the latest block.
    ///
    /// # Errors
    ///
    /// Returns [`HeadFetchError`] if the latest block cannot be determined.
    async fn fetch_latest_head(&self) -> Result<Block, HeadFetchError>;
}
