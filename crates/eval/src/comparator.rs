//! Sort compilation.
//!
//! Every sort item is resolved once at compile time. Comparison walks
//! the items in order and the first non-zero result decides; `desc`
//! reverses it. When every item ties the records compare equal, which
//! keeps a stable sort from reordering them.
//!
//! Unlike filters, a sort item that does not resolve is an error, not
//! dropped: losing a key silently would change the order unpredictably.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use sift_core::{FieldPath, SortDirection, SortRule, StandardOperation, Value};

use crate::error::{EvalError, RuleIssue};
use crate::resolve::Resolver;

#[derive(Debug, Clone)]
struct SortKey {
    path: FieldPath,
    operation: StandardOperation,
    direction: SortDirection,
}

/// A sort rule ready to compare records.
#[derive(Debug, Clone, Default)]
pub struct CompiledComparator {
    keys: Vec<SortKey>,
}

/// Compile a sort rule, failing on the first item that does not resolve.
pub fn compile_sort(
    rule: &SortRule,
    resolver: &Resolver<'_>,
) -> Result<CompiledComparator, EvalError> {
    let keys = rule
        .items()
        .iter()
        .map(|item| {
            Ok(SortKey {
                path: item.path.clone(),
                operation: resolver.resolve(&item.operation_name, &item.path)?,
                direction: item.direction,
            })
        })
        .collect::<Result<Vec<_>, EvalError>>()?;
    Ok(CompiledComparator { keys })
}

/// Every item that does not resolve, by position. Empty when the rule
/// would compile.
pub fn validate_sort(rule: &SortRule, resolver: &Resolver<'_>) -> Vec<(usize, RuleIssue)> {
    rule.items()
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            resolver
                .resolve(&item.operation_name, &item.path)
                .err()
                .map(|issue| (i, issue))
        })
        .collect()
}

impl CompiledComparator {
    /// The comparator for an empty rule: everything ties.
    pub fn identity() -> Self {
        CompiledComparator::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
        for key in &self.keys {
            let result = key
                .operation
                .invoke(&[a.at_path(&key.path), b.at_path(&key.path)])
                .map_err(|source| EvalError::Comparator {
                    operation: key.operation.name.clone(),
                    path: key.path.clone(),
                    source,
                })?;
            let ordering = sign(&key.operation.name, &result)?;
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }
}

/// Read a comparator's numeric result as an ordering by its sign.
fn sign(operation: &str, result: &Value) -> Result<Ordering, EvalError> {
    match result {
        Value::Int(i) => Ok(i.cmp(&0)),
        Value::Decimal(d) => Ok(d.cmp(&Decimal::ZERO)),
        other => Err(EvalError::NotANumber {
            operation: operation.to_string(),
            got: other.type_name().to_string(),
        }),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
