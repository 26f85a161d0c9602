//! Whole-dataset filtering and sorting.
//!
//! Both operations return a new `Vec` and leave the input untouched.

use std::cmp::Ordering;

use sift_core::{FilterConfig, SortRule, StrictRule, Value};

use crate::comparator::{compile_sort, CompiledComparator};
use crate::error::EvalError;
use crate::predicate::{compile_filter, CompiledPredicate};
use crate::resolve::Resolver;

/// Keep the records `rule` accepts, in their original order. No rule
/// keeps everything.
pub fn filter_data(
    records: &[Value],
    rule: Option<&StrictRule>,
    resolver: &Resolver<'_>,
    config: &FilterConfig,
) -> Result<Vec<Value>, EvalError> {
    let predicate = match rule {
        Some(rule) => compile_filter(rule, resolver)?.with_config(config.clone()),
        None => CompiledPredicate::always(),
    };
    filter_with(records, &predicate)
}

/// Keep the records an already compiled predicate accepts.
pub fn filter_with(
    records: &[Value],
    predicate: &CompiledPredicate,
) -> Result<Vec<Value>, EvalError> {
    let mut kept = Vec::new();
    for record in records {
        if predicate.test(record)? {
            kept.push(record.clone());
        }
    }
    Ok(kept)
}

/// Stable sort by `rule`. Any item that does not resolve, or any
/// comparator failure, aborts the sort.
pub fn sort_data(
    records: &[Value],
    rule: &SortRule,
    resolver: &Resolver<'_>,
) -> Result<Vec<Value>, EvalError> {
    let comparator = compile_sort(rule, resolver)?;
    sort_with(records, &comparator)
}

/// Stable sort with an already compiled comparator.
pub fn sort_with(
    records: &[Value],
    comparator: &CompiledComparator,
) -> Result<Vec<Value>, EvalError> {
    if comparator.is_empty() {
        return Ok(records.to_vec());
    }
    let order = stable_order(records.len(), |i, j| {
        comparator.compare(&records[i], &records[j])
    })?;
    Ok(order.into_iter().map(|i| records[i].clone()).collect())
}

/// Bottom-up merge sort over indices with a fallible comparison.
///
/// `slice::sort_by` cannot stop on an error, and it may panic on a
/// comparator that is not a total order; user operations are neither
/// guaranteed to succeed nor to be consistent. On ties the left run
/// wins, so equal elements keep their input order.
fn stable_order<F>(len: usize, mut compare: F) -> Result<Vec<usize>, EvalError>
where
    F: FnMut(usize, usize) -> Result<Ordering, EvalError>,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut scratch = order.clone();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j, mut k) = (start, mid, start);
            while i < mid && j < end {
                if compare(order[j], order[i])? == Ordering::Less {
                    scratch[k] = order[j];
                    j += 1;
                } else {
                    scratch[k] = order[i];
                    i += 1;
                }
                k += 1;
            }
            let rest_left = mid - i;
            scratch[k..k + rest_left].copy_from_slice(&order[i..mid]);
            k += rest_left;
            scratch[k..k + (end - j)].copy_from_slice(&order[j..end]);
            start = end;
        }
        std::mem::swap(&mut order, &mut scratch);
        width *= 2;
    }
    Ok(order)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
