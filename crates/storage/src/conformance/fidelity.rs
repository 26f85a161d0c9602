use std::future::Future;

use rust_decimal::Decimal;
use sift_core::{FieldPath, GroupOp, LooseFilter, RuleGroup, RuleNode, Value};
use sift_interchange::RuleDocument;

use super::{expect_document, leaf, sample_sort, TestResult};
use crate::RuleStorage;

pub(super) async fn run_fidelity_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RuleStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "fidelity",
            "incomplete_filter_survives",
            incomplete_filter_survives(factory().await).await,
        ),
        TestResult::from_result(
            "fidelity",
            "tagged_values_survive",
            tagged_values_survive(factory().await).await,
        ),
        TestResult::from_result(
            "fidelity",
            "nested_inverted_groups_survive",
            nested_inverted_groups_survive(factory().await).await,
        ),
        TestResult::from_result(
            "fidelity",
            "sort_directions_survive",
            sort_directions_survive(factory().await).await,
        ),
    ]
}

/// Filters still being edited have no operation yet and must persist as-is.
async fn incomplete_filter_survives<S: RuleStorage>(storage: S) -> Result<(), String> {
    let mut draft = LooseFilter::new("draft");
    draft.set_path(FieldPath::fields(["age"]));
    let doc = RuleDocument::filter(RuleNode::group(
        "root",
        GroupOp::Or,
        vec![RuleNode::Leaf(draft), RuleNode::Leaf(LooseFilter::new("blank"))],
    ));
    storage
        .set("draft", &doc)
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    expect_document(&storage, "draft", &doc).await
}

async fn tagged_values_survive<S: RuleStorage>(storage: S) -> Result<(), String> {
    let doc = RuleDocument::filter(RuleNode::group(
        "root",
        GroupOp::And,
        vec![
            leaf(
                "price",
                "price",
                "greater than",
                vec![Value::Decimal(Decimal::new(1999, 2))],
            ),
            leaf(
                "born",
                "born",
                "less than",
                vec![Value::Date(time::macros::date!(2001 - 09 - 11))],
            ),
            leaf("tags", "tags", "equals", vec![Value::List(vec![Value::Null])]),
        ],
    ));
    storage
        .set("typed", &doc)
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    expect_document(&storage, "typed", &doc).await
}

async fn nested_inverted_groups_survive<S: RuleStorage>(storage: S) -> Result<(), String> {
    let mut inverted_leaf = LooseFilter::new("not-bob");
    inverted_leaf.set_path(FieldPath::fields(["name"]));
    inverted_leaf.set_operation("equals");
    inverted_leaf.set_arguments(vec![Value::text("Bob")]);
    inverted_leaf.set_invert(true);

    let inner = RuleNode::Group(
        RuleGroup::new("inner", GroupOp::Or, vec![RuleNode::Leaf(inverted_leaf)]).inverted(),
    );
    let doc = RuleDocument::filter(RuleNode::group("outer", GroupOp::And, vec![inner]));
    storage
        .set("nested", &doc)
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    expect_document(&storage, "nested", &doc).await
}

async fn sort_directions_survive<S: RuleStorage>(storage: S) -> Result<(), String> {
    let doc = sample_sort();
    storage
        .set("order", &doc)
        .await
        .map_err(|e| format!("set failed: {e}"))?;
    expect_document(&storage, "order", &doc).await
}
