//! Generic operation instantiation.
//!
//! A generic operation becomes a standard one for a single field type:
//! the guard must accept the type, and the signature produced for it
//! must still fit the role the operation is used in. Either check
//! failing means "not applicable", which is an ordinary answer.

use sift_core::{
    GenericOperation, GenericOrigin, Operation, OperationRole, StandardOperation, TypeDesc,
    TypeOracle,
};

/// Instantiate `generic` for `datatype`, or `None` if it does not apply.
pub fn instantiate(
    generic: &GenericOperation,
    datatype: &TypeDesc,
    role: OperationRole,
) -> Option<StandardOperation> {
    if !generic.applies_to(datatype) {
        return None;
    }
    let candidate = StandardOperation {
        name: generic.name.clone(),
        signature: generic.signature_for(datatype),
        implementation: generic.implementation.clone(),
        skip_validate: generic.skip_validate,
        meta: generic.meta.clone(),
        origin: Some(GenericOrigin {
            generic_name: generic.name.clone(),
            datatype: datatype.clone(),
        }),
    };
    // signature_for may produce something unusable for this role
    // (no parameters, wrong return type) for some types.
    if role.accepts(&candidate.signature) {
        Some(candidate)
    } else {
        None
    }
}

/// The standard operation `operation` becomes when applied to a field
/// of type `field_type`, if it applies at all.
///
/// Standard operations apply when they fit the role and their first
/// parameter accepts the field type. Generics are instantiated first
/// and then checked the same way.
pub fn operation_for_field(
    operation: &Operation,
    field_type: &TypeDesc,
    role: OperationRole,
    oracle: &dyn TypeOracle,
) -> Option<StandardOperation> {
    let resolved = match operation {
        Operation::Standard(op) if role.accepts(&op.signature) => op.clone(),
        Operation::Standard(_) => return None,
        Operation::Generic(generic) => instantiate(generic, field_type, role)?,
    };
    let first = resolved.signature.first_param()?;
    if oracle.is_compatible(first, field_type) {
        Some(resolved)
    } else {
        None
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
