//! Filter compilation and evaluation.
//!
//! `compile_filter` resolves every leaf's operation once against the
//! resolver, producing a `CompiledPredicate` that owns everything it
//! needs. Evaluation follows boolean semantics:
//!
//! - A leaf invokes its operation with the field value followed by the
//!   rule arguments. A missing field is passed as `Null`.
//! - `and` stops at the first false condition, `or` at the first true.
//! - An empty group is true.
//! - `invert` negates a leaf or group result.

use tracing::warn;

use sift_core::{
    ErrorPolicy, FieldPath, FilterConfig, GroupOp, RuleId, RuleNode, StandardOperation,
    StrictRule, Value,
};

use crate::error::EvalError;
use crate::resolve::Resolver;

#[derive(Debug, Clone)]
struct LeafPredicate {
    id: RuleId,
    path: FieldPath,
    operation: StandardOperation,
    arguments: Vec<Value>,
    invert: bool,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(LeafPredicate),
    Group {
        op: GroupOp,
        invert: bool,
        children: Vec<Node>,
    },
}

/// A strict filter rule ready to run against records.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    /// `None` when there is no rule: every record passes.
    root: Option<Node>,
    config: FilterConfig,
}

/// Compile a strict rule. Fails if any leaf no longer resolves.
///
/// Arguments are not re-validated here; rules are expected to come
/// from `normalize`.
pub fn compile_filter(
    rule: &StrictRule,
    resolver: &Resolver<'_>,
) -> Result<CompiledPredicate, EvalError> {
    Ok(CompiledPredicate {
        root: Some(compile_node(rule, resolver)?),
        config: FilterConfig::default(),
    })
}

fn compile_node(rule: &StrictRule, resolver: &Resolver<'_>) -> Result<Node, EvalError> {
    match rule {
        RuleNode::Leaf(filter) => {
            let operation = resolver.resolve(&filter.operation_name, &filter.path)?;
            Ok(Node::Leaf(LeafPredicate {
                id: filter.id.clone(),
                path: filter.path.clone(),
                operation,
                arguments: filter.arguments.clone(),
                invert: filter.invert,
            }))
        }
        RuleNode::Group(group) => Ok(Node::Group {
            op: group.op,
            invert: group.invert,
            children: group
                .conditions
                .iter()
                .map(|c| compile_node(c, resolver))
                .collect::<Result<_, _>>()?,
        }),
    }
}

impl CompiledPredicate {
    /// The predicate for "no rule": passes every record.
    pub fn always() -> Self {
        CompiledPredicate {
            root: None,
            config: FilterConfig::default(),
        }
    }

    /// Choose what happens when an operation fails on a record.
    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Evaluate against one record.
    ///
    /// Under `ErrorPolicy::Fallback`, a failure is logged and the
    /// configured fallback is returned for this record only.
    pub fn test(&self, record: &Value) -> Result<bool, EvalError> {
        let Some(root) = &self.root else {
            return Ok(true);
        };
        match eval_node(root, record) {
            Ok(pass) => Ok(pass),
            Err(err) => match self.config.on_error {
                ErrorPolicy::Propagate => Err(err),
                ErrorPolicy::Fallback => {
                    warn!(
                        error = %err,
                        fallback = self.config.fallback,
                        "filter failed on record, using fallback"
                    );
                    Ok(self.config.fallback)
                }
            },
        }
    }
}

fn eval_node(node: &Node, record: &Value) -> Result<bool, EvalError> {
    match node {
        Node::Leaf(leaf) => Ok(eval_leaf(leaf, record)? != leaf.invert),
        Node::Group {
            op,
            invert,
            children,
        } => {
            let result = match op {
                GroupOp::And => {
                    let mut all = true;
                    for child in children {
                        if !eval_node(child, record)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                GroupOp::Or => {
                    // An empty group is vacuously true under either op.
                    let mut any = children.is_empty();
                    for child in children {
                        if eval_node(child, record)? {
                            any = true;
                            break;
                        }
                    }
                    any
                }
            };
            Ok(result != *invert)
        }
    }
}

fn eval_leaf(leaf: &LeafPredicate, record: &Value) -> Result<bool, EvalError> {
    let mut args: Vec<&Value> = Vec::with_capacity(leaf.arguments.len() + 1);
    args.push(record.at_path(&leaf.path));
    args.extend(leaf.arguments.iter());
    let result = leaf
        .operation
        .invoke(&args)
        .map_err(|source| EvalError::Operation {
            operation: leaf.operation.name.clone(),
            rule_id: leaf.id.clone(),
            source,
        })?;
    match result {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::NotABoolean {
            operation: leaf.operation.name.clone(),
            rule_id: leaf.id.clone(),
            got: other.type_name().to_string(),
        }),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{
        OperationError, OperationRegistry, Signature, StrictFilter, TypeDesc,
    };

    fn registry() -> OperationRegistry {
        let mut reg = OperationRegistry::for_filters();
        reg.register(StandardOperation::new(
            "always",
            Signature::new(vec![TypeDesc::Any], TypeDesc::Bool),
            |_| Ok(Value::Bool(true)),
        ))
        .unwrap();
        reg.register(StandardOperation::new(
            "never",
            Signature::new(vec![TypeDesc::Any], TypeDesc::Bool),
            |_| Ok(Value::Bool(false)),
        ))
        .unwrap();
        reg.register(StandardOperation::new(
            "explodes",
            Signature::new(vec![TypeDesc::Any], TypeDesc::Bool),
            |_| Err(OperationError::failed("boom")),
        ))
        .unwrap();
        reg.register(StandardOperation::new(
            "lies",
            Signature::new(vec![TypeDesc::Any], TypeDesc::Bool),
            |_| Ok(Value::Int(1)),
        ))
        .unwrap();
        reg.register(StandardOperation::new(
            "is null",
            Signature::new(vec![TypeDesc::Any], TypeDesc::Bool),
            |args| Ok(Value::Bool(args[0].is_null())),
        ))
        .unwrap();
        reg
    }

    fn leaf(id: &str, op: &str) -> StrictRule {
        RuleNode::Leaf(StrictFilter::new(id, FieldPath::root(), op, vec![]))
    }

    fn run(rule: &StrictRule) -> Result<bool, EvalError> {
        let reg = registry();
        let schema = TypeDesc::Any;
        let resolver = Resolver::new(&reg, &schema);
        compile_filter(rule, &resolver)?.test(&Value::record([("a", Value::Int(1))]))
    }

    #[test]
    fn empty_group_is_true() {
        assert_eq!(run(&RuleNode::group("g", GroupOp::And, vec![])), Ok(true));
        assert_eq!(run(&RuleNode::group("g", GroupOp::Or, vec![])), Ok(true));
    }

    #[test]
    fn and_or_with_mixed_conditions() {
        let mixed = || vec![leaf("t", "always"), leaf("f", "never")];
        assert_eq!(run(&RuleNode::group("g", GroupOp::And, mixed())), Ok(false));
        assert_eq!(run(&RuleNode::group("g", GroupOp::Or, mixed())), Ok(true));
    }

    #[test]
    fn invert_applies_to_leaves_and_groups() {
        let inverted_leaf = RuleNode::Leaf(
            StrictFilter::new("f", FieldPath::root(), "never", vec![]).inverted(),
        );
        assert_eq!(run(&inverted_leaf), Ok(true));

        let group = sift_core::RuleGroup::new("g", GroupOp::And, vec![leaf("t", "always")]);
        assert_eq!(run(&RuleNode::Group(group.inverted())), Ok(false));
    }

    #[test]
    fn short_circuit_skips_failing_conditions() {
        let or = RuleNode::group("g", GroupOp::Or, vec![leaf("t", "always"), leaf("x", "explodes")]);
        assert_eq!(run(&or), Ok(true));
        let and = RuleNode::group("g", GroupOp::And, vec![leaf("f", "never"), leaf("x", "explodes")]);
        assert_eq!(run(&and), Ok(false));
    }

    #[test]
    fn missing_path_evaluates_as_null() {
        let rule = RuleNode::Leaf(StrictFilter::new(
            "f",
            FieldPath::fields(["nope", "deeper"]),
            "is null",
            vec![],
        ));
        assert_eq!(run(&rule), Ok(true));
    }

    #[test]
    fn operation_failure_propagates_by_default() {
        let err = run(&leaf("x", "explodes")).unwrap_err();
        assert!(matches!(err, EvalError::Operation { ref operation, .. } if operation == "explodes"));
        assert!(matches!(
            run(&leaf("l", "lies")),
            Err(EvalError::NotABoolean { .. })
        ));
    }

    #[test]
    fn fallback_policy_replaces_failures() {
        let reg = registry();
        let schema = TypeDesc::Any;
        let resolver = Resolver::new(&reg, &schema);
        let compiled = compile_filter(&leaf("x", "explodes"), &resolver).unwrap();

        let lenient = compiled.clone().with_config(FilterConfig {
            on_error: ErrorPolicy::Fallback,
            fallback: true,
        });
        assert_eq!(lenient.test(&Value::Null), Ok(true));

        let strict_false = compiled.with_config(FilterConfig {
            on_error: ErrorPolicy::Fallback,
            fallback: false,
        });
        assert_eq!(strict_false.test(&Value::Null), Ok(false));
    }

    #[test]
    fn unresolvable_leaf_fails_compilation() {
        let reg = registry();
        let schema = TypeDesc::Any;
        let resolver = Resolver::new(&reg, &schema);
        assert!(matches!(
            compile_filter(&leaf("f", "gone"), &resolver),
            Err(EvalError::Resolution(_))
        ));
    }

    #[test]
    fn no_rule_passes_everything() {
        assert_eq!(CompiledPredicate::always().test(&Value::Null), Ok(true));
    }
}
