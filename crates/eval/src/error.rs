//! Error types for rule resolution and evaluation.

use sift_core::{FieldPath, OperationError, RuleId, TypeDesc};

/// Why a rule, or one part of it, does not resolve against the current
/// schema and registry.
///
/// These are expected states for user-built rules. Normalization
/// drops the offending part; only the top-level failure is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleIssue {
    #[error("filter '{rule_id}' has no path")]
    MissingPath { rule_id: RuleId },

    #[error("filter '{rule_id}' has no operation")]
    MissingOperation { rule_id: RuleId },

    #[error("operation '{name}' is not registered")]
    OperationNotFound { name: String },

    #[error("path '{path}' does not exist in the schema")]
    PathNotInSchema { path: FieldPath },

    /// A generic operation whose guard rejects the field type, or whose
    /// instantiated signature does not fit the registry's role.
    #[error("operation '{operation}' does not apply to {field_type}")]
    NotApplicable {
        operation: String,
        field_type: TypeDesc,
    },

    /// The field's type changed since the rule was built.
    #[error("operation '{operation}' expects {expected} but the field is {actual}")]
    FirstParamMismatch {
        operation: String,
        expected: TypeDesc,
        actual: TypeDesc,
    },

    #[error("operation '{operation}' takes {expected} argument(s), got {got}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("argument {index} of '{operation}' must be {expected}, got {got}")]
    ArgumentType {
        operation: String,
        index: usize,
        expected: TypeDesc,
        got: String,
    },

    /// A group none of whose conditions survived.
    #[error("group '{rule_id}' has no valid conditions")]
    EmptyGroup { rule_id: RuleId },
}

/// Evaluation and structural errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// A rule that must resolve did not (compiling, sorting).
    #[error(transparent)]
    Resolution(#[from] RuleIssue),

    /// An operation implementation failed on a record.
    #[error("operation '{operation}' failed in rule '{rule_id}': {source}")]
    Operation {
        operation: String,
        rule_id: RuleId,
        source: OperationError,
    },

    #[error("operation '{operation}' in rule '{rule_id}' returned {got}, expected Bool")]
    NotABoolean {
        operation: String,
        rule_id: RuleId,
        got: String,
    },

    /// A comparator implementation failed on a pair of records.
    #[error("comparator '{operation}' failed on '{path}': {source}")]
    Comparator {
        operation: String,
        path: FieldPath,
        source: OperationError,
    },

    #[error("comparator '{operation}' returned {got}, expected a number")]
    NotANumber { operation: String, got: String },

    // ── FilterMap structure ──
    /// A node references an id that is not in the table.
    #[error("node '{id}' is referenced but not present")]
    DanglingId { id: RuleId },

    #[error("no root node (a node that is its own parent)")]
    NoRoot,

    #[error("more than one root node: {}", join_ids(.ids))]
    MultipleRoots { ids: Vec<RuleId> },

    #[error("root node '{id}' is not a group")]
    RootNotGroup { id: RuleId },

    #[error("node '{id}' is not a group")]
    NotAGroup { id: RuleId },

    #[error("node '{id}' is its own ancestor")]
    Cycle { id: RuleId },

    #[error("unknown node '{id}'")]
    UnknownId { id: RuleId },

    #[error("duplicate node id '{id}'")]
    DuplicateId { id: RuleId },

    #[error("cannot remove root node '{id}'")]
    RemoveRoot { id: RuleId },
}

fn join_ids(ids: &[RuleId]) -> String {
    ids.iter()
        .map(RuleId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
