//! Core type definitions for JSON-RPC and chain data.
//!
//! # Type Categories
//!
//! ## JSON-RPC Protocol Types
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: Protocol conformance
//! - [`error_codes`]: Numeric codes used across the provider chain
//!
//! ## Chain Types
//! - [`Hash32`], [`Address`]: Fixed-size identifiers with `0x`-prefixed hex rendering
//! - [`Block`]: The head snapshot shared through [`crate::chain::HeadState`]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{borrow::Cow, sync::Arc};

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for JSON-RPC version - zero allocation for static usage.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// JSON-RPC 2.0 error codes.
///
/// - `-32700`: Parse error (invalid JSON)
/// - `-32600`: Invalid request (malformed JSON-RPC)
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
/// - `-32000`: Server error (implementation-specific)
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const SERVER_ERROR: i32 = -32000;
}

fn default_version() -> Cow<'static, str> {
    JSONRPC_VERSION_COW
}

fn null_id() -> Arc<Value> {
    Arc::new(Value::Null)
}

/// JSON-RPC 2.0 request structure.
///
/// A request is immutable once handed to the engine: providers only ever see
/// `&JsonRpcRequest`.
///
/// # Fields
///
/// - `jsonrpc`: Protocol version, defaults to "2.0" when omitted by the client
/// - `method`: RPC method name (e.g., `eth_call`, `eth_accounts`)
/// - `params`: Positional parameters, empty when omitted
/// - `id`: Opaque correlation token echoed in the response, `null` when omitted
///
/// # Example
///
/// ```
/// use kiln_core::types::JsonRpcRequest;
/// use serde_json::json;
///
/// let request = JsonRpcRequest::new("eth_blockNumber", vec![], json!(1));
///
/// assert_eq!(request.method, "eth_blockNumber");
/// assert!(request.params.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default = "null_id")]
    pub id: Arc<Value>,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with zero allocation for the version string.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id: Arc::new(id) }
    }

    /// Returns the positional parameter at `index`, if present.
    #[inline]
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    /// Returns the positional parameter at `index` as a string slice.
    #[inline]
    #[must_use]
    pub fn str_param(&self, index: usize) -> Option<&str> {
        self.params.get(index).and_then(Value::as_str)
    }
}

/// JSON-RPC 2.0 response structure.
///
/// Carries either a `result` or an `error`, never both. A `result` of JSON `null`
/// is a legitimate success value and is serialized as `"result": null`.
///
/// # Example
///
/// ```
/// use kiln_core::types::JsonRpcResponse;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let response = JsonRpcResponse::success(json!("0x10"), Arc::new(json!(1)));
/// assert!(response.result.is_some());
/// assert!(response.error.is_none());
///
/// let response =
///     JsonRpcResponse::error(-32600, "Invalid Request".to_string(), Arc::new(json!(1)));
/// assert!(response.error.is_some());
/// assert!(response.result.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    pub id: Arc<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Creates a successful JSON-RPC response.
    #[must_use]
    pub fn success(result: Value, id: Arc<Value>) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, id, result: Some(result), error: None }
    }

    /// Creates an error JSON-RPC response.
    #[must_use]
    pub fn error(code: i32, message: String, id: Arc<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            id,
            result: None,
            error: Some(JsonRpcError { code, message, data: None }),
        }
    }

    /// Returns true when the response carries an error object.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// JSON-RPC 2.0 error object.
///
/// See [`error_codes`] for the codes produced by this crate.
///
/// # Example
///
/// ```
/// use kiln_core::types::JsonRpcError;
///
/// let error = JsonRpcError { code: -32601, message: "Method not found".to_string(), data: None };
///
/// assert_eq!(error.code, -32601);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Error type for fixed-size hex parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexParseError {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(value: &str) -> Result<[u8; N], HexParseError> {
    let hex_str = value.strip_prefix("0x").ok_or(HexParseError::MissingPrefix)?;
    let bytes = hex::decode(hex_str).map_err(|e| HexParseError::InvalidHex(e.to_string()))?;

    if bytes.len() != N {
        return Err(HexParseError::InvalidLength { expected: N, actual: bytes.len() });
    }

    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// 32-byte hash (block hashes, storage words).
///
/// # Example
/// ```
/// use kiln_core::types::Hash32;
///
/// let hash: Hash32 = "0xabcd1234abcd1234abcd1234abcd1234abcd1234abcd1234abcd1234abcd1234"
///     .parse()
///     .unwrap();
/// assert_eq!(hash.as_bytes()[0], 0xab);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Returns the inner byte array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Generates a random hash. The simulator has no real block contents to hash.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Hash32 {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

/// 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Address {
    type Err = HexParseError;

    /// Parses a `0x`-prefixed address. Mixed case input is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(&s.to_ascii_lowercase()).map(Self)
    }
}

/// Formats a number as a JSON-RPC hex quantity (`0x0`, `0x1a`, ...).
#[inline]
#[must_use]
pub fn to_quantity(value: u128) -> String {
    format!("0x{value:x}")
}

/// Parses a JSON-RPC hex quantity into a `u64`.
#[must_use]
pub fn parse_quantity(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// A block header snapshot.
///
/// The simulator keeps no transactions or state roots; a block is identified by
/// its number and hash and linked to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub hash: Hash32,
    pub parent_hash: Hash32,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
}

impl Block {
    /// Builds the genesis block (number 0, zero parent).
    #[must_use]
    pub fn genesis(timestamp: u64) -> Self {
        Self { number: 0, hash: Hash32::random(), parent_hash: Hash32::ZERO, timestamp }
    }

    /// Builds the block that follows `self`.
    #[must_use]
    pub fn child(&self, timestamp: u64) -> Self {
        Self {
            number: self.number + 1,
            hash: Hash32::random(),
            parent_hash: self.hash,
            timestamp: timestamp.max(self.timestamp),
        }
    }

    /// Renders the block the way `eth_getBlockByNumber` returns it.
    #[must_use]
    pub fn to_rpc(&self) -> Value {
        json!({
            "number": to_quantity(u128::from(self.number)),
            "hash": self.hash.to_string(),
            "parentHash": self.parent_hash.to_string(),
            "timestamp": to_quantity(u128::from(self.timestamp)),
            "transactions": [],
        })
    }
}
