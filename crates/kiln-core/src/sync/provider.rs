use super::{HeadFetchError, HeadSource, SyncPolicy, SyncPolicyTable};
use crate::{
    chain::HeadState,
    engine::{Flow, Provider},
    types::JsonRpcRequest,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Chain member that refreshes the current head around selected methods.
///
/// This is the only writer of [`HeadState`].
pub struct HeadSyncProvider {
    policies: SyncPolicyTable,
    source: Arc<dyn HeadSource>,
    head: Arc<HeadState>,
}

impl HeadSyncProvider {
    #[must_use]
    pub fn new(policies: SyncPolicyTable, source: Arc<dyn HeadSource>, head: Arc<HeadState>) -> Self {
        Self { policies, source, head }
    }

    #[must_use]
    pub fn policies(&self) -> &SyncPolicyTable {
        &self.policies
    }
}

/// Fetches the latest head and commits it. Nothing is committed on failure.
///
/// The fetch runs under the head's write lock, so concurrent syncs commit in the
/// order they started.
async fn fetch_and_commit(
    source: &dyn HeadSource,
    head: &HeadState,
    method: &str,
) -> Result<(), HeadFetchError> {
    match head.refresh_with(|| source.fetch_latest_head()).await {
        Ok(block) => {
            debug!(method, block = block.number, "head synced");
            Ok(())
        }
        Err(e) => {
            warn!(method, error = %e, "head sync failed");
            Err(e)
        }
    }
}

#[async_trait]
impl Provider for HeadSyncProvider {
    fn name(&self) -> &'static str {
        "head-sync"
    }

    async fn handle(&self, request: &JsonRpcRequest) -> Flow {
        match self.policies.policy_for(&request.method) {
            None => Flow::Next,
            Some(SyncPolicy::Before) => {
                match fetch_and_commit(self.source.as_ref(), &self.head, &request.method).await {
                    Ok(()) => Flow::Next,
                    Err(e) => Flow::Abort(e.into()),
                }
            }
            Some(SyncPolicy::After) => {
                let source = Arc::clone(&self.source);
                let head = Arc::clone(&self.head);
                let method = request.method.clone();

                Flow::next_with(move |outcome| async move {
                    // Freshness wins: a failed refresh replaces even a successful result.
                    fetch_and_commit(source.as_ref(), &head, &method).await?;
                    outcome
                })
            }
        }
    }
}
