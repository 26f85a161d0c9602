//! Operation descriptors: the named functions rules refer to.
//!
//! A standard operation has a fixed signature. A generic operation is a
//! family of signatures: a guard decides which field types it applies
//! to, and a generator produces the concrete signature for one of them.
//! Instantiating a generic against a field type yields a standard
//! operation (see `sift_eval::instantiate`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::OperationError;
use crate::types::TypeDesc;
use crate::value::Value;

/// The callable behind an operation. Receives the field value followed
/// by the rule's arguments (filters) or the two compared values (sorts).
pub type Implementation =
    Arc<dyn Fn(&[&Value]) -> Result<Value, OperationError> + Send + Sync>;

/// Decides whether a generic operation applies to a field type.
pub type GenericGuard = Arc<dyn Fn(&TypeDesc) -> bool + Send + Sync>;

/// Produces a generic operation's concrete signature for a field type.
pub type SignatureFor = Arc<dyn Fn(&TypeDesc) -> Signature + Send + Sync>;

/// Free-form metadata attached to an operation.
pub type Meta = BTreeMap<String, serde_json::Value>;

/// Parameter and return types of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<TypeDesc>,
    pub returns: TypeDesc,
}

impl Signature {
    pub fn new(params: Vec<TypeDesc>, returns: TypeDesc) -> Self {
        Signature { params, returns }
    }

    /// The parameter the field value is bound to.
    pub fn first_param(&self) -> Option<&TypeDesc> {
        self.params.first()
    }

    /// Parameters bound to rule arguments.
    pub fn rest_params(&self) -> &[TypeDesc] {
        self.params.get(1..).unwrap_or(&[])
    }
}

/// What an operation is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationRole {
    /// Predicate: returns `Bool`, takes at least one parameter.
    Filter,
    /// Comparator: returns a number, takes exactly two parameters.
    Sort,
}

impl OperationRole {
    /// Whether a signature can serve this role.
    pub fn accepts(&self, signature: &Signature) -> bool {
        match self {
            OperationRole::Filter => {
                signature.returns == TypeDesc::Bool && !signature.params.is_empty()
            }
            OperationRole::Sort => {
                signature.returns.is_number_like() && signature.params.len() == 2
            }
        }
    }
}

impl fmt::Display for OperationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationRole::Filter => write!(f, "filter"),
            OperationRole::Sort => write!(f, "sort"),
        }
    }
}

/// Where an instantiated operation came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericOrigin {
    pub generic_name: String,
    pub datatype: TypeDesc,
}

/// An operation with a fixed signature.
#[derive(Clone)]
pub struct StandardOperation {
    pub name: String,
    pub signature: Signature,
    pub implementation: Implementation,
    /// Skip argument validation during normalization.
    pub skip_validate: bool,
    pub meta: Meta,
    /// Set when this operation was produced by instantiating a generic.
    pub origin: Option<GenericOrigin>,
}

impl StandardOperation {
    pub fn new<F>(name: impl Into<String>, signature: Signature, implementation: F) -> Self
    where
        F: Fn(&[&Value]) -> Result<Value, OperationError> + Send + Sync + 'static,
    {
        StandardOperation {
            name: name.into(),
            signature,
            implementation: Arc::new(implementation),
            skip_validate: false,
            meta: Meta::new(),
            origin: None,
        }
    }

    pub fn skip_validate(mut self) -> Self {
        self.skip_validate = true;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Call the implementation.
    pub fn invoke(&self, args: &[&Value]) -> Result<Value, OperationError> {
        (self.implementation)(args)
    }
}

impl fmt::Debug for StandardOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardOperation")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("skip_validate", &self.skip_validate)
            .field("meta", &self.meta)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// A type-parameterized operation.
#[derive(Clone)]
pub struct GenericOperation {
    pub name: String,
    pub guard: GenericGuard,
    pub signature_for: SignatureFor,
    pub implementation: Implementation,
    pub skip_validate: bool,
    pub meta: Meta,
}

impl GenericOperation {
    pub fn new<G, S, F>(name: impl Into<String>, guard: G, signature_for: S, implementation: F) -> Self
    where
        G: Fn(&TypeDesc) -> bool + Send + Sync + 'static,
        S: Fn(&TypeDesc) -> Signature + Send + Sync + 'static,
        F: Fn(&[&Value]) -> Result<Value, OperationError> + Send + Sync + 'static,
    {
        GenericOperation {
            name: name.into(),
            guard: Arc::new(guard),
            signature_for: Arc::new(signature_for),
            implementation: Arc::new(implementation),
            skip_validate: false,
            meta: Meta::new(),
        }
    }

    pub fn skip_validate(mut self) -> Self {
        self.skip_validate = true;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn applies_to(&self, datatype: &TypeDesc) -> bool {
        (self.guard)(datatype)
    }

    pub fn signature_for(&self, datatype: &TypeDesc) -> Signature {
        (self.signature_for)(datatype)
    }
}

impl fmt::Debug for GenericOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericOperation")
            .field("name", &self.name)
            .field("skip_validate", &self.skip_validate)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// A registered operation.
#[derive(Debug, Clone)]
pub enum Operation {
    Standard(StandardOperation),
    Generic(GenericOperation),
}

impl Operation {
    pub fn name(&self) -> &str {
        match self {
            Operation::Standard(op) => &op.name,
            Operation::Generic(op) => &op.name,
        }
    }

    pub fn skip_validate(&self) -> bool {
        match self {
            Operation::Standard(op) => op.skip_validate,
            Operation::Generic(op) => op.skip_validate,
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Operation::Generic(_))
    }
}

impl From<StandardOperation> for Operation {
    fn from(op: StandardOperation) -> Self {
        Operation::Standard(op)
    }
}

impl From<GenericOperation> for Operation {
    fn from(op: GenericOperation) -> Self {
        Operation::Generic(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_role_needs_bool_and_a_parameter() {
        let ok = Signature::new(vec![TypeDesc::Int, TypeDesc::Int], TypeDesc::Bool);
        let no_params = Signature::new(vec![], TypeDesc::Bool);
        let not_bool = Signature::new(vec![TypeDesc::Int], TypeDesc::Int);
        assert!(OperationRole::Filter.accepts(&ok));
        assert!(!OperationRole::Filter.accepts(&no_params));
        assert!(!OperationRole::Filter.accepts(&not_bool));
    }

    #[test]
    fn sort_role_needs_two_parameters_and_a_number() {
        let ok = Signature::new(vec![TypeDesc::Int, TypeDesc::Int], TypeDesc::ordering());
        let three = Signature::new(
            vec![TypeDesc::Int, TypeDesc::Int, TypeDesc::Int],
            TypeDesc::Int,
        );
        let boolean = Signature::new(vec![TypeDesc::Int, TypeDesc::Int], TypeDesc::Bool);
        assert!(OperationRole::Sort.accepts(&ok));
        assert!(!OperationRole::Sort.accepts(&three));
        assert!(!OperationRole::Sort.accepts(&boolean));
    }

    #[test]
    fn invoke_passes_arguments_through() {
        let op = StandardOperation::new(
            "is even",
            Signature::new(vec![TypeDesc::Int], TypeDesc::Bool),
            |args| match args {
                [Value::Int(i)] => Ok(Value::Bool(i % 2 == 0)),
                [other, ..] => Err(OperationError::bad_argument("Int", other)),
                [] => Err(OperationError::failed("no arguments")),
            },
        );
        assert_eq!(op.invoke(&[&Value::Int(4)]), Ok(Value::Bool(true)));
        assert!(op.invoke(&[&Value::text("4")]).is_err());
    }
}
