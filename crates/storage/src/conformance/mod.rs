//! Conformance test suite for RuleStorage implementations.
//!
//! Backend crates call [`run_conformance_suite`] with a factory function
//! that creates a fresh, empty storage instance for each test. The suite
//! covers basic key/value behavior, document fidelity through the codec,
//! key validation, and concurrent writers.

use std::fmt;
use std::future::Future;

use sift_core::{FieldPath, GroupOp, LooseFilter, LooseRule, RuleNode, SortItem, SortRule, Value};
use sift_interchange::RuleDocument;

use crate::RuleStorage;

mod basic;
mod concurrent;
mod fidelity;
mod keys;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub category: String,
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: RuleStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(basic::run_basic_tests(&factory).await);
    results.extend(fidelity::run_fidelity_tests(&factory).await);
    results.extend(keys::run_key_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: sample documents ────────────────────────────────────────────────

fn leaf(id: &str, field: &str, operation: &str, arguments: Vec<Value>) -> LooseRule {
    let mut filter = LooseFilter::new(id);
    filter.set_path(FieldPath::fields([field]));
    filter.set_operation(operation);
    filter.set_arguments(arguments);
    RuleNode::Leaf(filter)
}

fn sample_filter() -> RuleDocument {
    RuleDocument::filter(RuleNode::group(
        "root",
        GroupOp::And,
        vec![
            leaf("name", "name", "equals", vec![Value::text("Alice")]),
            leaf("age", "age", "equals", vec![Value::Int(19)]),
        ],
    ))
}

fn sample_sort() -> RuleDocument {
    RuleDocument::sort(SortRule::new(vec![
        SortItem::asc(FieldPath::fields(["c"]), "compare"),
        SortItem::desc(FieldPath::fields(["s"]), "compare"),
    ]))
}

async fn expect_document<S: RuleStorage>(
    storage: &S,
    key: &str,
    expected: &RuleDocument,
) -> Result<(), String> {
    match storage.get(key).await {
        Ok(Some(doc)) if doc == *expected => Ok(()),
        Ok(Some(doc)) => Err(format!("'{key}': expected {expected:?}, got {doc:?}")),
        Ok(None) => Err(format!("'{key}': expected a document, got none")),
        Err(e) => Err(format!("'{key}': get failed: {e}")),
    }
}
