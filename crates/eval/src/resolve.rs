//! Operation resolution against a schema and a registry.

use sift_core::{
    DiscoveryConfig, FieldPath, Operation, OperationRegistry, StandardOperation, StructuralOracle, TypeDesc,
    TypeOracle, Value,
};

use crate::discovery::{discover_fields, DiscoveredField};
use crate::error::RuleIssue;
use crate::instantiate::instantiate;

static STRUCTURAL: StructuralOracle = StructuralOracle;

/// Everything needed to resolve a rule: the operation registry, the
/// record schema, and the type compatibility oracle.
///
/// A resolver is cheap to build and borrows its inputs. Rebuild it when
/// the schema or the registry changes; rules resolved against the old
/// pair must be normalized again.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a OperationRegistry,
    schema: &'a TypeDesc,
    oracle: &'a dyn TypeOracle,
}

impl<'a> Resolver<'a> {
    /// Resolver using `StructuralOracle`.
    pub fn new(registry: &'a OperationRegistry, schema: &'a TypeDesc) -> Self {
        Resolver {
            registry,
            schema,
            oracle: &STRUCTURAL,
        }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn TypeOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn registry(&self) -> &'a OperationRegistry {
        self.registry
    }

    pub fn schema(&self) -> &'a TypeDesc {
        self.schema
    }

    pub fn oracle(&self) -> &'a dyn TypeOracle {
        self.oracle
    }

    /// The schema type at `path`.
    pub fn field_type(&self, path: &FieldPath) -> Result<&'a TypeDesc, RuleIssue> {
        self.schema
            .resolve_path(path)
            .ok_or_else(|| RuleIssue::PathNotInSchema { path: path.clone() })
    }

    /// Resolve operation `name` for the field at `path`.
    ///
    /// Generic operations are instantiated for the field's type. The
    /// result's first parameter is always checked against the field
    /// type, which catches rules whose field changed type.
    pub fn resolve(&self, name: &str, path: &FieldPath) -> Result<StandardOperation, RuleIssue> {
        let operation = self
            .registry
            .get(name)
            .ok_or_else(|| RuleIssue::OperationNotFound {
                name: name.to_string(),
            })?;
        let field_type = self.field_type(path)?;
        let resolved = match operation {
            Operation::Standard(op) => op.clone(),
            Operation::Generic(generic) => instantiate(generic, field_type, self.registry.role())
                .ok_or_else(|| RuleIssue::NotApplicable {
                    operation: name.to_string(),
                    field_type: field_type.clone(),
                })?,
        };
        match resolved.signature.first_param() {
            Some(first) if self.oracle.is_compatible(first, field_type) => Ok(resolved),
            Some(first) => Err(RuleIssue::FirstParamMismatch {
                operation: name.to_string(),
                expected: first.clone(),
                actual: field_type.clone(),
            }),
            None => Err(RuleIssue::NotApplicable {
                operation: name.to_string(),
                field_type: field_type.clone(),
            }),
        }
    }

    /// Check rule arguments against the parameters after the first.
    /// Operations marked `skip_validate` accept anything.
    pub fn check_arguments(
        &self,
        operation: &StandardOperation,
        arguments: &[Value],
    ) -> Result<(), RuleIssue> {
        if operation.skip_validate {
            return Ok(());
        }
        let params = operation.signature.rest_params();
        if params.len() != arguments.len() {
            return Err(RuleIssue::ArityMismatch {
                operation: operation.name.clone(),
                expected: params.len(),
                got: arguments.len(),
            });
        }
        for (index, (param, arg)) in params.iter().zip(arguments).enumerate() {
            if !param.admits(arg) {
                return Err(RuleIssue::ArgumentType {
                    operation: operation.name.clone(),
                    index,
                    expected: param.clone(),
                    got: arg.type_name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Field discovery over this resolver's schema and registry.
    pub fn discover(&self, max_depth: usize) -> Vec<DiscoveredField> {
        discover_fields(
            self.schema,
            self.registry.operations(),
            self.registry.role(),
            max_depth,
            self.oracle,
        )
    }

    /// Field discovery bounded by the engine's discovery settings.
    pub fn discover_with(&self, config: &DiscoveryConfig) -> Vec<DiscoveredField> {
        self.discover(config.max_depth)
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", self.registry)
            .field("schema", self.schema)
            .finish_non_exhaustive()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
