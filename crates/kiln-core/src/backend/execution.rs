//! Block and call methods.

use super::chain::MemoryChain;
use crate::{
    chain::HeadState,
    engine::{Flow, Provider, ProviderError},
    types::{parse_quantity, to_quantity, Hash32, JsonRpcRequest},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Answers block queries and the execution stand-ins.
///
/// `latest` reads go through [`HeadState`], so they see exactly what head sync last
/// committed. Numbered lookups go straight to the chain.
pub struct ExecutionProvider {
    chain: Arc<MemoryChain>,
    head: Arc<HeadState>,
}

impl ExecutionProvider {
    #[must_use]
    pub fn new(chain: Arc<MemoryChain>, head: Arc<HeadState>) -> Self {
        Self { chain, head }
    }

    fn block_by_number(&self, request: &JsonRpcRequest) -> Result<Value, ProviderError> {
        let tag = request.str_param(0).ok_or_else(|| {
            ProviderError::InvalidParams("eth_getBlockByNumber expects a block tag".into())
        })?;

        let block = match tag {
            "latest" | "pending" => Some(*self.head.current_block()),
            "earliest" => Some(self.chain.genesis()),
            hex => {
                let number = parse_quantity(hex).ok_or_else(|| {
                    ProviderError::InvalidParams(format!("invalid block number: {hex}"))
                })?;
                self.chain.block_by_number(number)
            }
        };

        Ok(block.map_or(Value::Null, |b| b.to_rpc()))
    }

    fn storage_at(request: &JsonRpcRequest) -> Result<Value, ProviderError> {
        if request.str_param(0).is_none() || request.str_param(1).is_none() {
            return Err(ProviderError::InvalidParams(
                "eth_getStorageAt expects an address and a position".into(),
            ));
        }
        Ok(json!(Hash32::ZERO.to_string()))
    }
}

#[async_trait]
impl Provider for ExecutionProvider {
    fn name(&self) -> &'static str {
        "execution"
    }

    async fn handle(&self, request: &JsonRpcRequest) -> Flow {
        let result = match request.method.as_str() {
            "eth_blockNumber" => {
                Ok(json!(to_quantity(u128::from(self.head.current_number()))))
            }
            "eth_getBlockByNumber" => self.block_by_number(request),
            "evm_mine" => {
                self.chain.mine();
                Ok(json!("0x0"))
            }
            // No contract code exists, so every call returns empty data.
            "eth_call" => match request.param(0) {
                Some(Value::Object(_)) => Ok(json!("0x")),
                _ => Err(ProviderError::InvalidParams("eth_call expects a call object".into())),
            },
            "eth_getStorageAt" => Self::storage_at(request),
            _ => return Flow::Next,
        };

        match result {
            Ok(value) => Flow::Respond(value),
            Err(e) => Flow::Abort(e),
        }
    }
}
