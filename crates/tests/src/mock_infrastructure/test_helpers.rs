//! Test Helper Functions and Utilities

use kiln_core::{
    engine::{Provider, ProviderEngine},
    types::{Block, JsonRpcRequest},
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Creates a request with no params.
#[must_use]
pub fn request(method: &str, id: u64) -> JsonRpcRequest {
    JsonRpcRequest::new(method, vec![], json!(id))
}

/// Creates a request with the given params.
#[must_use]
pub fn request_with(method: &str, params: Vec<Value>, id: u64) -> JsonRpcRequest {
    JsonRpcRequest::new(method, params, json!(id))
}

/// Builds `len` linked blocks starting at genesis, one second apart.
#[must_use]
pub fn linked_blocks(len: u64) -> Vec<Block> {
    let mut blocks = vec![Block::genesis(1_600_000_000)];
    for i in 1..len {
        let next = blocks[blocks.len() - 1].child(1_600_000_000 + i);
        blocks.push(next);
    }
    blocks
}

/// Builds an engine over the given providers, in order.
#[must_use]
pub fn engine_of(providers: &[Arc<dyn Provider>]) -> ProviderEngine {
    ProviderEngine::new(providers.to_vec())
}
