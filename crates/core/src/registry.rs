//! Operation registry: the library of operations rules may name.

use std::collections::HashMap;

use crate::error::RegistryError;
use crate::operation::{Operation, OperationRole};

/// Operations available to one kind of rule, keyed by unique name.
///
/// A registry is bound to a role. Standard operations are checked
/// against that role when registered; generic operations are checked
/// per field type when instantiated. Registration order is preserved
/// and drives the order of discovered operations.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    role: OperationRole,
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
}

impl OperationRegistry {
    pub fn new(role: OperationRole) -> Self {
        OperationRegistry {
            role,
            operations: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn for_filters() -> Self {
        Self::new(OperationRole::Filter)
    }

    pub fn for_sorts() -> Self {
        Self::new(OperationRole::Sort)
    }

    /// Build a registry from a list, failing on the first bad entry.
    pub fn with_operations<I, O>(role: OperationRole, operations: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Operation>,
    {
        let mut registry = Self::new(role);
        for op in operations {
            registry.register(op)?;
        }
        Ok(registry)
    }

    pub fn role(&self) -> OperationRole {
        self.role
    }

    /// Add an operation. Names must be unique within the registry.
    pub fn register(&mut self, operation: impl Into<Operation>) -> Result<(), RegistryError> {
        let operation = operation.into();
        let name = operation.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateOperation { name });
        }
        if let Operation::Standard(op) = &operation {
            if op.signature.params.is_empty() {
                return Err(RegistryError::NoParameters { name });
            }
            if !self.role.accepts(&op.signature) {
                return Err(RegistryError::UnsuitableSignature {
                    name,
                    role: self.role,
                });
            }
        }
        self.index.insert(name, self.operations.len());
        self.operations.push(operation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All operations in registration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{GenericOperation, Signature, StandardOperation};
    use crate::types::TypeDesc;
    use crate::value::Value;

    fn equal_op(name: &str) -> StandardOperation {
        StandardOperation::new(
            name,
            Signature::new(vec![TypeDesc::Int, TypeDesc::Int], TypeDesc::Bool),
            |args| Ok(Value::Bool(args[0] == args[1])),
        )
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = OperationRegistry::for_filters();
        reg.register(equal_op("number equal")).unwrap();
        assert!(reg.contains("number equal"));
        assert_eq!(reg.get("number equal").unwrap().name(), "number equal");
        assert!(reg.get("missing").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut reg = OperationRegistry::for_filters();
        reg.register(equal_op("eq")).unwrap();
        let err = reg.register(equal_op("eq")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateOperation {
                name: "eq".to_string()
            }
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn zero_parameter_operation_is_rejected() {
        let mut reg = OperationRegistry::for_filters();
        let op = StandardOperation::new("nothing", Signature::new(vec![], TypeDesc::Bool), |_| {
            Ok(Value::Bool(true))
        });
        assert_eq!(
            reg.register(op),
            Err(RegistryError::NoParameters {
                name: "nothing".to_string()
            })
        );
    }

    #[test]
    fn sort_registry_rejects_predicates() {
        let mut reg = OperationRegistry::for_sorts();
        assert!(matches!(
            reg.register(equal_op("eq")),
            Err(RegistryError::UnsuitableSignature { .. })
        ));
    }

    #[test]
    fn generics_are_accepted_without_instantiation() {
        let generic = GenericOperation::new(
            "equals",
            |_| true,
            |t| Signature::new(vec![t.clone(), t.clone()], TypeDesc::Bool),
            |args| Ok(Value::Bool(args[0] == args[1])),
        );
        let reg = OperationRegistry::with_operations(
            OperationRole::Filter,
            vec![Operation::from(generic), Operation::from(equal_op("eq"))],
        )
        .unwrap();
        let names: Vec<_> = reg.operations().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["equals", "eq"]);
    }
}
