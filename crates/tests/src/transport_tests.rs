//! HTTP Transport Tests
//!
//! Run the router on a real listener and talk to it over HTTP:
//! - Status codes and bodies for each shape of request
//! - Batch responses keep input order regardless of completion order
//! - A full runtime only starts serving once accounts are ready

use crate::mock_infrastructure::{CountingProvider, Reply};
use kiln_core::{
    config::AppConfig,
    engine::{Provider, ProviderEngine},
    runtime::KilnRuntime,
};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use server::{
    router::{create_router, RpcState},
    startup::bind_when_ready,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;

async fn serve(engine: Arc<ProviderEngine>, listener: TcpListener) -> String {
    let addr = listener.local_addr().unwrap();
    let app = create_router(RpcState::new(engine, 1024 * 1024), 64);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn serve_providers(providers: Vec<Arc<dyn Provider>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve(Arc::new(ProviderEngine::new(providers)), listener).await
}

#[tokio::test]
async fn test_single_request_round_trip() {
    let provider: Arc<dyn Provider> = CountingProvider::new("echo", Reply::Echo);
    let url = serve_providers(vec![provider]).await;

    let response = Client::new()
        .post(&url)
        .body(r#"{"jsonrpc":"2.0","id":7,"method":"eth_chainId","params":[]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"jsonrpc": "2.0", "id": 7, "result": "eth_chainId"}));
}

#[tokio::test]
async fn test_http_error_statuses() {
    let provider: Arc<dyn Provider> = CountingProvider::new("failing", Reply::Fail("boom"));
    let url = serve_providers(vec![provider]).await;
    let client = Client::new();

    let not_json = client.post(&url).body("{not json").send().await.unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    assert_eq!(not_json.text().await.unwrap(), "400 Bad Request");

    let delete = client.request(Method::DELETE, &url).send().await.unwrap();
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);

    let options = client.request(Method::OPTIONS, &url).send().await.unwrap();
    assert_eq!(options.status(), StatusCode::OK);
    assert!(options.headers().contains_key("access-control-allow-methods"));

    let failed = client
        .post(&url)
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"eth_call","params":[]}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(failed.text().await.unwrap().contains("boom"));
}

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let provider = CountingProvider::new("echo", Reply::Echo);
    provider.delay("a", Duration::from_millis(100));
    let url = serve_providers(vec![provider.clone() as Arc<dyn Provider>]).await;

    let body: Value = Client::new()
        .post(&url)
        .body(
            r#"[{"jsonrpc":"2.0","id":1,"method":"a","params":[]},
                {"jsonrpc":"2.0","id":2,"method":"b","params":[]}]"#,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body[0]["result"], json!("a"));
    assert_eq!(body[1]["result"], json!("b"));
    assert_eq!(provider.seen(), vec!["b", "a"], "b completed first");
}

#[tokio::test]
async fn test_batch_embeds_errors() {
    let provider: Arc<dyn Provider> = CountingProvider::new("pass", Reply::Pass);
    let url = serve_providers(vec![provider]).await;

    let response = Client::new()
        .post(&url)
        .body(r#"[{"jsonrpc":"2.0","id":1,"method":"eth_unknown","params":[]}, 42]"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body[0]["error"]["code"], json!(-32601));
    assert_eq!(body[1]["error"]["code"], json!(-32600));
}

#[tokio::test]
async fn test_runtime_serves_after_accounts_ready() {
    let runtime = KilnRuntime::builder().with_config(AppConfig::default()).build().unwrap();
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

    let (listener, accounts) = bind_when_ready(runtime.accounts().gate(), addr).await.unwrap();
    assert_eq!(accounts.len(), 10);
    let url = serve(runtime.engine().clone(), listener).await;

    let body: Value = Client::new()
        .post(&url)
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"eth_accounts","params":[]}"#)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["result"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["result"][0], json!(accounts.addresses()[0].to_string()));
}
