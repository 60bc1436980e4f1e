//! HTTP transport adapter.
//!
//! Every path is served by a single fallback handler:
//!
//! | Method | Body | Response |
//! |--------|------|----------|
//! | `OPTIONS` | - | 200, empty |
//! | `POST` | not JSON | 400 `400 Bad Request` |
//! | `POST` | array | 200, JSON array in input order |
//! | `POST` | object | 200 JSON-RPC response, or 500 with the chain error as text |
//! | other | - | 400 `400 Bad Request` |
//!
//! All responses carry permissive CORS headers.

use crate::middleware::create_request_id_layers;
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Router,
};
use kiln_core::{
    engine::ProviderEngine,
    types::{error_codes, JsonRpcRequest, JsonRpcResponse},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tracing::{debug, error, info};

const BAD_REQUEST_BODY: &str = "400 Bad Request";

/// Shared state for the RPC handler.
#[derive(Clone)]
pub struct RpcState {
    pub engine: Arc<ProviderEngine>,
    pub max_body_bytes: usize,
}

impl RpcState {
    #[must_use]
    pub fn new(engine: Arc<ProviderEngine>, max_body_bytes: usize) -> Self {
        Self { engine, max_body_bytes }
    }
}

/// Builds the application router.
///
/// Layers are applied in reverse order, so the request id is set before the
/// concurrency limit is taken and propagated on the way out.
pub fn create_router(state: RpcState, max_concurrent_requests: usize) -> Router {
    let (set_request_id, propagate_request_id) = create_request_id_layers();

    Router::new()
        .fallback(handle_http)
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        .layer(propagate_request_id)
        .layer(set_request_id)
}

/// Entry point for every HTTP request.
pub async fn handle_http(State(state): State<RpcState>, method: Method, body: Body) -> Response {
    let response = match method {
        Method::OPTIONS => plain(StatusCode::OK, ""),
        Method::POST => handle_post(&state, body).await,
        other => {
            debug!(method = %other, "unsupported HTTP method");
            bad_request()
        }
    };
    with_cors(response)
}

async fn handle_post(state: &RpcState, body: Body) -> Response {
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            return bad_request();
        }
    };

    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "request body is not JSON");
            return bad_request();
        }
    };

    match payload {
        Value::Array(items) => handle_batch(&state.engine, items).await,
        Value::Object(_) => handle_single(&state.engine, payload).await,
        _ => {
            let error = invalid_request(Arc::new(Value::Null), "expected object or array");
            json(StatusCode::OK, &error)
        }
    }
}

async fn handle_single(engine: &ProviderEngine, payload: Value) -> Response {
    let id = request_id(&payload);
    let request: JsonRpcRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(e) => return json(StatusCode::OK, &invalid_request(id, &e.to_string())),
    };

    info!(method = %request.method, "rpc request");

    match engine.dispatch(&request).await {
        Ok(response) => json(StatusCode::OK, &response),
        Err(e) => {
            debug!(method = %request.method, error = %e, "request failed");
            plain(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Dispatches the well-formed elements as one batch and slots the malformed ones'
/// errors back in at their original positions.
async fn handle_batch(engine: &ProviderEngine, items: Vec<Value>) -> Response {
    let mut slots: Vec<Option<JsonRpcResponse>> = Vec::with_capacity(items.len());
    let mut requests = Vec::new();

    for item in items {
        let id = request_id(&item);
        match serde_json::from_value::<JsonRpcRequest>(item) {
            Ok(request) => {
                info!(method = %request.method, "rpc request");
                requests.push(request);
                slots.push(None);
            }
            Err(e) => slots.push(Some(invalid_request(id, &e.to_string()))),
        }
    }

    debug!(batch_size = slots.len(), dispatched = requests.len(), "batch request");

    let mut dispatched = engine.dispatch_batch(requests).await.into_iter();
    let responses: Vec<JsonRpcResponse> =
        slots.into_iter().filter_map(|slot| slot.or_else(|| dispatched.next())).collect();

    json(StatusCode::OK, &responses)
}

fn request_id(payload: &Value) -> Arc<Value> {
    Arc::new(payload.get("id").cloned().unwrap_or(Value::Null))
}

fn invalid_request(id: Arc<Value>, reason: &str) -> JsonRpcResponse {
    JsonRpcResponse::error(error_codes::INVALID_REQUEST, format!("Invalid request: {reason}"), id)
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            plain(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn plain(status: StatusCode, body: &str) -> Response {
    (status, [(CONTENT_TYPE, "text/plain")], body.to_owned()).into_response()
}

fn bad_request() -> Response {
    plain(StatusCode::BAD_REQUEST, BAD_REQUEST_BODY)
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Origin, X-Requested-With, Content-Type, Accept"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*"));
    response
}
