//! Field discovery: which fields of a schema admit which operations.
//!
//! Breadth-first from the record root. Every visited node is offered
//! every operation; nodes with at least one applicable operation are
//! reported. Only record types are expanded, one level per property,
//! down to `max_depth`. Lists and tuples are not descended into.

use std::collections::VecDeque;

use tracing::trace;

use sift_core::{FieldPath, Operation, OperationRole, StandardOperation, TypeDesc, TypeOracle};

use crate::instantiate::operation_for_field;

/// A field and the operations that apply to it.
#[derive(Debug, Clone)]
pub struct DiscoveredField {
    pub path: FieldPath,
    pub field_type: TypeDesc,
    /// Never empty. Generic operations appear instantiated for
    /// `field_type`, in registry order.
    pub operations: Vec<StandardOperation>,
}

impl DiscoveredField {
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name.as_str()).collect()
    }
}

/// Discover fields in BFS order: the root first if it qualifies, then
/// depth-1 fields in declaration order, and so on.
pub fn discover_fields(
    schema: &TypeDesc,
    operations: &[Operation],
    role: OperationRole,
    max_depth: usize,
    oracle: &dyn TypeOracle,
) -> Vec<DiscoveredField> {
    let mut found = Vec::new();
    let mut queue: VecDeque<(FieldPath, &TypeDesc, usize)> = VecDeque::new();
    queue.push_back((FieldPath::root(), schema, 0));

    while let Some((path, field_type, depth)) = queue.pop_front() {
        let applicable: Vec<StandardOperation> = operations
            .iter()
            .filter_map(|op| operation_for_field(op, field_type, role, oracle))
            .collect();
        trace!(
            path = %path,
            depth,
            operations = applicable.len(),
            "discovery visited field"
        );

        if depth < max_depth {
            if let Some(fields) = field_type.fields() {
                for decl in fields {
                    queue.push_back((path.child(decl.name.as_str()), &decl.ty, depth + 1));
                }
            }
        }

        if !applicable.is_empty() {
            found.push(DiscoveredField {
                path,
                field_type: field_type.clone(),
                operations: applicable,
            });
        }
    }
    found
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
