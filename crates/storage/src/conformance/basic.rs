use std::future::Future;

use super::{expect_document, sample_filter, sample_sort, TestResult};
use crate::RuleStorage;

pub(super) async fn run_basic_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RuleStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "basic",
            "get_missing_returns_none",
            get_missing_returns_none(factory().await).await,
        ),
        TestResult::from_result(
            "basic",
            "set_then_get_returns_document",
            set_then_get_returns_document(factory().await).await,
        ),
        TestResult::from_result(
            "basic",
            "set_overwrites_previous_document",
            set_overwrites_previous_document(factory().await).await,
        ),
        TestResult::from_result(
            "basic",
            "remove_reports_existence",
            remove_reports_existence(factory().await).await,
        ),
        TestResult::from_result(
            "basic",
            "keys_are_sorted",
            keys_are_sorted(factory().await).await,
        ),
    ]
}

async fn get_missing_returns_none<S: RuleStorage>(storage: S) -> Result<(), String> {
    match storage.get("nothing-here").await {
        Ok(None) => Ok(()),
        Ok(Some(doc)) => Err(format!("expected None, got {doc:?}")),
        Err(e) => Err(format!("get failed: {e}")),
    }
}

async fn set_then_get_returns_document<S: RuleStorage>(storage: S) -> Result<(), String> {
    let doc = sample_filter();
    storage
        .set("people", &doc)
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    expect_document(&storage, "people", &doc).await
}

async fn set_overwrites_previous_document<S: RuleStorage>(storage: S) -> Result<(), String> {
    storage
        .set("view", &sample_filter())
        .await
        .map_err(|e| format!("first set failed: {e}"))?;
    let sort = sample_sort();
    storage
        .set("view", &sort)
        .await
        .map_err(|e| format!("second set failed: {e}"))?;
    expect_document(&storage, "view", &sort).await
}

async fn remove_reports_existence<S: RuleStorage>(storage: S) -> Result<(), String> {
    storage
        .set("gone", &sample_filter())
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    let first = storage
        .remove("gone")
        .await
        .map_err(|e| format!("remove failed: {e}"))?;
    let second = storage
        .remove("gone")
        .await
        .map_err(|e| format!("second remove failed: {e}"))?;
    if !first || second {
        return Err(format!(
            "expected remove to return true then false, got {first} then {second}"
        ));
    }
    match storage.get("gone").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected no document after remove, got {other:?}")),
    }
}

async fn keys_are_sorted<S: RuleStorage>(storage: S) -> Result<(), String> {
    for key in ["orders", "accounts", "people"] {
        storage
            .set(key, &sample_sort())
            .await
            .map_err(|e| format!("set '{key}' failed: {e}"))?;
    }
    let keys = storage
        .keys()
        .await
        .map_err(|e| format!("keys failed: {e}"))?;
    if keys != ["accounts", "orders", "people"] {
        return Err(format!("unexpected keys: {keys:?}"));
    }
    Ok(())
}
