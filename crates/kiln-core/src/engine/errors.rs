use crate::{
    gate::InitError,
    sync::HeadFetchError,
    types::{error_codes, JsonRpcResponse},
};
use serde_json::Value;
use std::sync::Arc;

/// Terminal error of a request's trip through the provider chain.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Request for method \"{0}\" not handled by any provider")]
    MethodNotHandled(String),

    /// The head could not be refreshed; the request must not see a stale head.
    #[error("Head sync failed: {0}")]
    HeadSync(#[from] HeadFetchError),

    #[error("Filter not found: {0}")]
    FilterNotFound(String),

    #[error("Account manager unavailable: {0}")]
    Initialization(#[from] InitError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// JSON-RPC error code used when this error is embedded in a response body.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::InvalidParams(_) => error_codes::INVALID_PARAMS,
            Self::MethodNotHandled(_) => error_codes::METHOD_NOT_FOUND,
            Self::HeadSync(_) | Self::FilterNotFound(_) | Self::Initialization(_) => {
                error_codes::SERVER_ERROR
            }
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Converts the error into a JSON-RPC error response for `id`.
    #[must_use]
    pub fn into_response(self, id: Arc<Value>) -> JsonRpcResponse {
        JsonRpcResponse::error(self.code(), self.to_string(), id)
    }
}
