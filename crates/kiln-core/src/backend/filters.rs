//! Block filters.

use super::chain::MemoryChain;
use crate::{
    chain::HeadState,
    engine::{Flow, Provider, ProviderError},
    types::{parse_quantity, to_quantity, JsonRpcRequest},
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::debug;

/// Installed block filters, keyed by filter id.
///
/// A filter remembers the last head number it reported. Changes are the hashes of
/// blocks after that number up to the current head; reading them advances the
/// filter. Only block filters exist.
pub struct FilterProvider {
    chain: Arc<MemoryChain>,
    head: Arc<HeadState>,
    filters: DashMap<u64, u64>,
    next_id: AtomicU64,
}

impl FilterProvider {
    #[must_use]
    pub fn new(chain: Arc<MemoryChain>, head: Arc<HeadState>) -> Self {
        Self { chain, head, filters: DashMap::new(), next_id: AtomicU64::new(1) }
    }

    /// Number of currently installed filters.
    #[must_use]
    pub fn installed(&self) -> usize {
        self.filters.len()
    }

    fn new_block_filter(&self) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let head = self.head.current_number();
        self.filters.insert(id, head);
        debug!(filter = id, head, "block filter installed");
        json!(to_quantity(u128::from(id)))
    }

    fn filter_changes(&self, request: &JsonRpcRequest) -> Result<Value, ProviderError> {
        let id = Self::filter_id(request)?;
        let mut last_seen = self
            .filters
            .get_mut(&id)
            .ok_or_else(|| ProviderError::FilterNotFound(to_quantity(u128::from(id))))?;

        let head = self.head.current_number();
        let hashes: Vec<String> = self
            .chain
            .blocks_in_range(last_seen.saturating_add(1), head)
            .iter()
            .map(|block| block.hash.to_string())
            .collect();
        *last_seen = (*last_seen).max(head);

        Ok(json!(hashes))
    }

    fn uninstall(&self, request: &JsonRpcRequest) -> Result<Value, ProviderError> {
        let id = Self::filter_id(request)?;
        Ok(json!(self.filters.remove(&id).is_some()))
    }

    fn filter_id(request: &JsonRpcRequest) -> Result<u64, ProviderError> {
        request
            .str_param(0)
            .and_then(parse_quantity)
            .ok_or_else(|| ProviderError::InvalidParams("expected a hex filter id".into()))
    }
}

#[async_trait]
impl Provider for FilterProvider {
    fn name(&self) -> &'static str {
        "filters"
    }

    async fn handle(&self, request: &JsonRpcRequest) -> Flow {
        let result = match request.method.as_str() {
            "eth_newBlockFilter" => Ok(self.new_block_filter()),
            "eth_getFilterChanges" => self.filter_changes(request),
            "eth_uninstallFilter" => self.uninstall(request),
            _ => return Flow::Next,
        };

        match result {
            Ok(value) => Flow::Respond(value),
            Err(e) => Flow::Abort(e),
        }
    }
}
