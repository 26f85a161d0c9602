use std::future::Future;
use std::sync::Arc;

use sift_core::{FieldPath, SortItem, SortRule};
use sift_interchange::RuleDocument;

use super::TestResult;
use crate::RuleStorage;

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RuleStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_writers_to_distinct_keys",
            concurrent_writers_to_distinct_keys(factory().await).await,
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_writers_to_one_key_leave_one_document",
            concurrent_writers_to_one_key_leave_one_document(factory().await).await,
        ),
    ]
}

fn sort_on(field: &str) -> RuleDocument {
    RuleDocument::sort(SortRule::new(vec![SortItem::asc(
        FieldPath::fields([field]),
        "compare",
    )]))
}

async fn concurrent_writers_to_distinct_keys<S: RuleStorage>(storage: S) -> Result<(), String> {
    let storage = Arc::new(storage);
    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            let key = format!("view-{i}");
            storage.set(&key, &sort_on(&format!("f{i}"))).await
        }));
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| format!("set failed: {e}"))?;
    }

    let keys = storage
        .keys()
        .await
        .map_err(|e| format!("keys failed: {e}"))?;
    if keys.len() != N {
        return Err(format!("expected {N} keys, got {}", keys.len()));
    }
    for i in 0..N {
        let key = format!("view-{i}");
        match storage.get(&key).await {
            Ok(Some(doc)) if doc == sort_on(&format!("f{i}")) => {}
            other => return Err(format!("'{key}' holds {other:?}")),
        }
    }
    Ok(())
}

/// Last writer wins, but the stored document is always one of the writes.
async fn concurrent_writers_to_one_key_leave_one_document<S: RuleStorage>(
    storage: S,
) -> Result<(), String> {
    let storage = Arc::new(storage);
    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage.set("shared", &sort_on(&format!("f{i}"))).await
        }));
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| format!("set failed: {e}"))?;
    }

    let stored = storage
        .get("shared")
        .await
        .map_err(|e| format!("get failed: {e}"))?
        .ok_or_else(|| "no document under 'shared'".to_string())?;
    if !(0..N).any(|i| stored == sort_on(&format!("f{i}"))) {
        return Err(format!("stored document matches no write: {stored:?}"));
    }
    Ok(())
}
