//! Filter rule trees.
//!
//! A rule tree is a boolean combination of single filters. The same
//! tree shape is used in two forms:
//!
//! - **Loose** (`LooseRule`): what a caller or editor proposes. Paths,
//!   operation names, and arguments may be missing or stale.
//! - **Strict** (`StrictRule`): what normalization produced. Every leaf
//!   names an operation that applies to its field with valid arguments.
//!
//! JSON shape: `{"type": "Filter", ...}` for leaves and
//! `{"type": "FilterGroup", "op": "and", "conditions": [...]}` for groups.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::IdGenerator;
use crate::operation::Operation;
use crate::path::FieldPath;
use crate::registry::OperationRegistry;
use crate::value::Value;

/// Identifier of a node, unique within one tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        RuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        RuleId(s.to_owned())
    }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self {
        RuleId(s)
    }
}

/// Boolean connective of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOp {
    #[default]
    And,
    Or,
}

impl GroupOp {
    pub fn toggled(self) -> Self {
        match self {
            GroupOp::And => GroupOp::Or,
            GroupOp::Or => GroupOp::And,
        }
    }
}

/// Anything that can sit at a leaf of a rule tree.
pub trait RuleLeaf {
    fn id(&self) -> &RuleId;

    /// Negate (or stop negating) this leaf's result.
    fn set_invert(&mut self, invert: bool);
}

/// A node of a rule tree: a single filter or a group of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuleNode<L> {
    #[serde(rename = "Filter")]
    Leaf(L),
    #[serde(rename = "FilterGroup")]
    Group(RuleGroup<L>),
}

/// A group of conditions joined by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup<L> {
    pub id: RuleId,
    pub op: GroupOp,
    pub conditions: Vec<RuleNode<L>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invert: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl<L> RuleGroup<L> {
    pub fn new(id: impl Into<RuleId>, op: GroupOp, conditions: Vec<RuleNode<L>>) -> Self {
        RuleGroup {
            id: id.into(),
            op,
            conditions,
            invert: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }
}

impl<L: RuleLeaf> RuleNode<L> {
    pub fn id(&self) -> &RuleId {
        match self {
            RuleNode::Leaf(leaf) => leaf.id(),
            RuleNode::Group(group) => &group.id,
        }
    }
}

impl<L> RuleNode<L> {
    pub fn group(id: impl Into<RuleId>, op: GroupOp, conditions: Vec<RuleNode<L>>) -> Self {
        RuleNode::Group(RuleGroup::new(id, op, conditions))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, RuleNode::Group(_))
    }

    /// Rebuild the tree with every leaf transformed by `f`.
    pub fn map_leaves<M>(self, f: &mut impl FnMut(L) -> M) -> RuleNode<M> {
        match self {
            RuleNode::Leaf(leaf) => RuleNode::Leaf(f(leaf)),
            RuleNode::Group(group) => {
                let mut conditions = Vec::with_capacity(group.conditions.len());
                for c in group.conditions {
                    conditions.push(c.map_leaves(&mut *f));
                }
                RuleNode::Group(RuleGroup {
                    id: group.id,
                    op: group.op,
                    conditions,
                    invert: group.invert,
                })
            }
        }
    }
}

// ──────────────────────────────────────────────
// Loose filters
// ──────────────────────────────────────────────

/// What a loose filter still lacks before it can be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Path,
    Operation,
    Arguments { expected: usize, got: usize },
}

/// Editing state of a loose filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterState {
    Incomplete { missing: Vec<Missing> },
    Ready,
}

impl FilterState {
    pub fn is_ready(&self) -> bool {
        matches!(self, FilterState::Ready)
    }
}

/// A single filter as proposed by a caller. Any part may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LooseFilter {
    pub id: RuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<FieldPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
}

impl RuleLeaf for LooseFilter {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn set_invert(&mut self, invert: bool) {
        self.invert = Some(invert);
    }
}

impl LooseFilter {
    /// An empty filter: no path, no operation, no arguments.
    pub fn new(id: impl Into<RuleId>) -> Self {
        LooseFilter {
            id: id.into(),
            path: None,
            operation_name: None,
            arguments: Vec::new(),
            invert: None,
        }
    }

    /// Point the filter at another field. Arguments typed for the old
    /// field no longer apply and are cleared.
    pub fn set_path(&mut self, path: FieldPath) {
        self.path = Some(path);
        self.arguments.clear();
    }

    /// Choose an operation. Arguments are cleared for the new arity.
    pub fn set_operation(&mut self, name: impl Into<String>) {
        self.operation_name = Some(name.into());
        self.arguments.clear();
    }

    pub fn set_arguments(&mut self, arguments: Vec<Value>) {
        self.arguments = arguments;
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = Some(invert);
    }

    /// State from the filter alone: path and operation present.
    pub fn state(&self) -> FilterState {
        let mut missing = Vec::new();
        if self.path.is_none() {
            missing.push(Missing::Path);
        }
        if self.operation_name.is_none() {
            missing.push(Missing::Operation);
        }
        if missing.is_empty() {
            FilterState::Ready
        } else {
            FilterState::Incomplete { missing }
        }
    }

    /// State including argument count against the registered operation.
    ///
    /// Generic operations only know their arity once instantiated against
    /// a field type, so their argument count is not checked here.
    pub fn readiness(&self, registry: &OperationRegistry) -> FilterState {
        let mut missing = match self.state() {
            FilterState::Ready => Vec::new(),
            FilterState::Incomplete { missing } => missing,
        };
        let standard = self
            .operation_name
            .as_deref()
            .and_then(|name| registry.get(name));
        if let Some(Operation::Standard(op)) = standard {
            let expected = op.signature.rest_params().len();
            if !op.skip_validate && self.arguments.len() < expected {
                missing.push(Missing::Arguments {
                    expected,
                    got: self.arguments.len(),
                });
            }
        }
        if missing.is_empty() {
            FilterState::Ready
        } else {
            FilterState::Incomplete { missing }
        }
    }
}

impl From<StrictFilter> for LooseFilter {
    fn from(f: StrictFilter) -> Self {
        LooseFilter {
            id: f.id,
            path: Some(f.path),
            operation_name: Some(f.operation_name),
            arguments: f.arguments,
            invert: Some(f.invert),
        }
    }
}

// ──────────────────────────────────────────────
// Strict filters
// ──────────────────────────────────────────────

/// A single filter that passed normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrictFilter {
    pub id: RuleId,
    pub path: FieldPath,
    pub operation_name: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
    #[serde(default)]
    pub invert: bool,
}

impl RuleLeaf for StrictFilter {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }
}

impl StrictFilter {
    pub fn new(
        id: impl Into<RuleId>,
        path: FieldPath,
        operation_name: impl Into<String>,
        arguments: Vec<Value>,
    ) -> Self {
        StrictFilter {
            id: id.into(),
            path,
            operation_name: operation_name.into(),
            arguments,
            invert: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }
}

pub type LooseRule = RuleNode<LooseFilter>;
pub type StrictRule = RuleNode<StrictFilter>;

impl LooseRule {
    /// An empty single filter with a fresh id.
    pub fn empty_filter(ids: &mut dyn IdGenerator) -> Self {
        RuleNode::Leaf(LooseFilter::new(ids.next_id()))
    }

    /// An empty group with a fresh id.
    pub fn empty_group(ids: &mut dyn IdGenerator, op: GroupOp) -> Self {
        RuleNode::Group(RuleGroup::new(ids.next_id(), op, Vec::new()))
    }
}

impl From<StrictRule> for LooseRule {
    fn from(rule: StrictRule) -> Self {
        rule.map_leaves(&mut |f: StrictFilter| LooseFilter::from(f))
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
