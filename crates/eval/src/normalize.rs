//! Loose-to-strict rule normalization.
//!
//! This is the only gate between what a caller proposes and what gets
//! evaluated. A leaf either resolves completely or fails with a
//! `RuleIssue`. A group keeps the conditions that resolve and drops
//! the rest; a group left with no conditions fails in turn, so its own
//! parent drops it.
//!
//! Rules must be normalized again whenever the schema or the registry
//! changes.

use tracing::debug;

use sift_core::{LooseFilter, LooseRule, RuleGroup, RuleNode, StrictFilter, StrictRule};

use crate::error::RuleIssue;
use crate::resolve::Resolver;

/// Normalize a loose rule. Returns the issue that made the top-level
/// node fail; issues of dropped descendants are logged at debug level.
pub fn normalize(rule: &LooseRule, resolver: &Resolver<'_>) -> Result<StrictRule, RuleIssue> {
    match rule {
        RuleNode::Leaf(filter) => normalize_filter(filter, resolver).map(RuleNode::Leaf),
        RuleNode::Group(group) => {
            let mut conditions = Vec::with_capacity(group.conditions.len());
            for child in &group.conditions {
                match normalize(child, resolver) {
                    Ok(strict) => conditions.push(strict),
                    Err(issue) => {
                        debug!(
                            rule_id = %child.id(),
                            group_id = %group.id,
                            %issue,
                            "dropping condition that does not resolve"
                        );
                    }
                }
            }
            if conditions.is_empty() {
                return Err(RuleIssue::EmptyGroup {
                    rule_id: group.id.clone(),
                });
            }
            Ok(RuleNode::Group(RuleGroup {
                id: group.id.clone(),
                op: group.op,
                conditions,
                invert: group.invert,
            }))
        }
    }
}

fn normalize_filter(
    filter: &LooseFilter,
    resolver: &Resolver<'_>,
) -> Result<StrictFilter, RuleIssue> {
    let name = filter
        .operation_name
        .as_deref()
        .ok_or_else(|| RuleIssue::MissingOperation {
            rule_id: filter.id.clone(),
        })?;
    let path = filter.path.as_ref().ok_or_else(|| RuleIssue::MissingPath {
        rule_id: filter.id.clone(),
    })?;
    let operation = resolver.resolve(name, path)?;
    resolver.check_arguments(&operation, &filter.arguments)?;
    Ok(StrictFilter {
        id: filter.id.clone(),
        path: path.clone(),
        operation_name: name.to_string(),
        arguments: filter.arguments.clone(),
        invert: filter.invert.unwrap_or(false),
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
