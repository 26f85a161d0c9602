use std::future::Future;

use super::{sample_filter, TestResult};
use crate::{RuleStorage, StorageError};

pub(super) async fn run_key_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RuleStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "keys",
            "empty_key_is_rejected",
            empty_key_is_rejected(factory().await).await,
        ),
        TestResult::from_result(
            "keys",
            "keys_are_case_sensitive",
            keys_are_case_sensitive(factory().await).await,
        ),
    ]
}

async fn empty_key_is_rejected<S: RuleStorage>(storage: S) -> Result<(), String> {
    if !matches!(storage.get("").await, Err(StorageError::EmptyKey)) {
        return Err("get(\"\") did not return EmptyKey".to_string());
    }
    if !matches!(
        storage.set("", &sample_filter()).await,
        Err(StorageError::EmptyKey)
    ) {
        return Err("set(\"\") did not return EmptyKey".to_string());
    }
    if !matches!(storage.remove("").await, Err(StorageError::EmptyKey)) {
        return Err("remove(\"\") did not return EmptyKey".to_string());
    }
    Ok(())
}

async fn keys_are_case_sensitive<S: RuleStorage>(storage: S) -> Result<(), String> {
    storage
        .set("People", &sample_filter())
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    match storage.get("people").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected no document under 'people', got {other:?}")),
    }
}
