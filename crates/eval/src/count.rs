//! Leaf counts, for "N of M rules valid" style summaries.

use sift_core::{LooseRule, RuleNode};

use crate::normalize::normalize;
use crate::resolve::Resolver;

/// Number of single filters in the tree. Empty groups count 0.
pub fn count_leaves<L>(rule: &RuleNode<L>) -> usize {
    match rule {
        RuleNode::Leaf(_) => 1,
        RuleNode::Group(group) => group.conditions.iter().map(count_leaves).sum(),
    }
}

/// Number of single filters that survive normalization; 0 when the
/// whole tree fails to normalize.
pub fn count_valid_leaves(rule: &LooseRule, resolver: &Resolver<'_>) -> usize {
    normalize(rule, resolver)
        .map(|strict| count_leaves(&strict))
        .unwrap_or(0)
}
