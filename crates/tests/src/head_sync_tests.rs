//! Head Sync Integration Tests
//!
//! Drives `HeadSyncProvider` at the front of a chain against scripted head sources:
//! 1. `before` commits the fetched head and downstream observes it
//! 2. `after` commits once downstream settles, and a failed fetch wins over success
//! 3. A failed `before` fetch aborts with nothing committed and nothing downstream run
//! 4. Batch elements each perform their own fetch

use crate::mock_infrastructure::{
    engine_of, linked_blocks, request, CountingProvider, HeadReader, Reply, ScriptedHeadSource,
};
use kiln_core::{
    chain::HeadState,
    engine::{Provider, ProviderError},
    sync::{HeadFetchError, HeadSyncProvider, SyncPolicy, SyncPolicyTable},
};
use serde_json::json;
use std::sync::Arc;

fn table() -> SyncPolicyTable {
    SyncPolicyTable::new([
        ("eth_call".to_string(), SyncPolicy::Before),
        ("evm_mine".to_string(), SyncPolicy::After),
    ])
    .unwrap()
}

fn head_sync(source: &Arc<ScriptedHeadSource>, head: &Arc<HeadState>) -> Arc<dyn Provider> {
    Arc::new(HeadSyncProvider::new(table(), source.clone(), head.clone()))
}

#[tokio::test]
async fn test_before_freshness() {
    let blocks = linked_blocks(6);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source = ScriptedHeadSource::new(vec![Ok(blocks[5])]);
    let engine = engine_of(&[head_sync(&source, &head), HeadReader::new(head.clone())]);

    let response = engine.dispatch(&request("eth_call", 1)).await.unwrap();

    assert_eq!(*head.current_block(), blocks[5]);
    assert_eq!(response.result, Some(json!(5)), "downstream saw the fresh head");
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_before_failure_commits_nothing_and_stops_chain() {
    let blocks = linked_blocks(2);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source =
        ScriptedHeadSource::new(vec![Err(HeadFetchError::Unavailable("backend down".into()))]);
    let downstream = CountingProvider::new("downstream", Reply::Echo);
    let engine = engine_of(&[head_sync(&source, &head), downstream.clone()]);

    let error = engine.dispatch(&request("eth_call", 1)).await.unwrap_err();

    assert!(matches!(error, ProviderError::HeadSync(HeadFetchError::Unavailable(_))));
    assert_eq!(error.code(), -32000);
    assert_eq!(*head.current_block(), blocks[0]);
    assert_eq!(head.commit_count(), 0);
    assert_eq!(downstream.calls(), 0);
}

#[tokio::test]
async fn test_after_commits_after_downstream() {
    let blocks = linked_blocks(3);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source = ScriptedHeadSource::new(vec![Ok(blocks[2])]);
    let engine = engine_of(&[head_sync(&source, &head), HeadReader::new(head.clone())]);

    let response = engine.dispatch(&request("evm_mine", 1)).await.unwrap();

    assert_eq!(response.result, Some(json!(0)));
    assert_eq!(*head.current_block(), blocks[2]);
}

#[tokio::test]
async fn test_after_fetch_failure_overrides_success() {
    let blocks = linked_blocks(1);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source = ScriptedHeadSource::new(vec![Err(HeadFetchError::Missing)]);
    let downstream = CountingProvider::new("downstream", Reply::Echo);
    let engine = engine_of(&[head_sync(&source, &head), downstream.clone()]);

    let error = engine.dispatch(&request("evm_mine", 1)).await.unwrap_err();

    assert!(matches!(error, ProviderError::HeadSync(HeadFetchError::Missing)));
    assert_eq!(downstream.calls(), 1);
    assert_eq!(head.commit_count(), 0);
}

#[tokio::test]
async fn test_after_runs_even_when_downstream_aborts() {
    let blocks = linked_blocks(2);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source = ScriptedHeadSource::new(vec![Ok(blocks[1])]);
    let engine = engine_of(&[
        head_sync(&source, &head),
        CountingProvider::new("failing", Reply::Fail("reverted")),
    ]);

    let error = engine.dispatch(&request("evm_mine", 1)).await.unwrap_err();

    assert!(matches!(error, ProviderError::Internal(ref m) if m == "reverted"));
    assert_eq!(*head.current_block(), blocks[1]);
}

#[tokio::test]
async fn test_unlisted_method_is_untouched() {
    let blocks = linked_blocks(2);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source = ScriptedHeadSource::repeating(blocks[1], 1);
    let engine = engine_of(&[head_sync(&source, &head), HeadReader::new(head.clone())]);

    engine.dispatch(&request("eth_getFilterChanges", 1)).await.unwrap();

    assert_eq!(source.fetches(), 0);
    assert_eq!(head.commit_count(), 0);
}

#[tokio::test]
async fn test_batch_elements_fetch_independently() {
    let blocks = linked_blocks(2);
    let head = Arc::new(HeadState::new(blocks[0]));
    let source = ScriptedHeadSource::repeating(blocks[1], 3);
    let engine = engine_of(&[head_sync(&source, &head), HeadReader::new(head.clone())]);

    let responses = engine
        .dispatch_batch(vec![request("eth_call", 1), request("eth_call", 2), request("eth_call", 3)])
        .await;

    assert!(responses.iter().all(|r| r.result == Some(json!(1))));
    assert_eq!(source.fetches(), 3);
    assert_eq!(head.commit_count(), 3);
}

#[tokio::test]
async fn test_polling_methods_are_not_synced_by_default() {
    let table = SyncPolicyTable::default();

    assert_eq!(table.policy_for("eth_getFilterChanges"), None);
    assert_eq!(table.policy_for("eth_getFilterLogs"), None);
    assert_eq!(table.policy_for("eth_call"), Some(SyncPolicy::Before));
}
