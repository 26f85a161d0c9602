//! Ready-made operations for common field types.
//!
//! Numbers compare by value regardless of `Int`/`Decimal`
//! representation. `Null` sorts before every other value. Values of
//! different kinds cannot be compared and yield `OperationError`.

use std::cmp::Ordering;

use sift_core::{
    GenericOperation, OperationError, OperationRegistry, OperationRole, RegistryError, Signature,
    StandardOperation, TypeDesc, Value,
};

/// Order two values of the same kind.
pub fn compare_values(left: &Value, right: &Value) -> Result<Ordering, OperationError> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        (Value::Bool(l), Value::Bool(r)) => Ok(l.cmp(r)),
        (Value::Int(l), Value::Int(r)) => Ok(l.cmp(r)),
        (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
            match (left.as_decimal(), right.as_decimal()) {
                (Some(l), Some(r)) => Ok(l.cmp(&r)),
                _ => Err(OperationError::bad_argument("a number", right)),
            }
        }
        (Value::Text(l), Value::Text(r)) => Ok(l.cmp(r)),
        (Value::Date(l), Value::Date(r)) => Ok(l.cmp(r)),
        (Value::DateTime(l), Value::DateTime(r)) => Ok(l.cmp(r)),
        _ => Err(OperationError::Failed {
            message: format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ),
        }),
    }
}

fn ordering_value(ordering: Ordering) -> Value {
    Value::Int(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

/// Scalar types, literals, and unions of them (including optionals).
fn is_scalar(t: &TypeDesc) -> bool {
    match t {
        TypeDesc::Null
        | TypeDesc::Bool
        | TypeDesc::Int
        | TypeDesc::Decimal
        | TypeDesc::Text
        | TypeDesc::Date
        | TypeDesc::DateTime
        | TypeDesc::Literal { .. } => true,
        TypeDesc::Union { members } => !members.is_empty() && members.iter().all(is_scalar),
        _ => false,
    }
}

/// Types with a natural order: numbers, text, dates, and their optionals.
fn is_orderable(t: &TypeDesc) -> bool {
    match t {
        TypeDesc::Int
        | TypeDesc::Decimal
        | TypeDesc::Text
        | TypeDesc::Date
        | TypeDesc::DateTime => true,
        TypeDesc::Literal { value } => !matches!(value, Value::List(_) | Value::Record(_)),
        TypeDesc::Union { members } => {
            members.iter().any(|m| *m != TypeDesc::Null)
                && members
                    .iter()
                    .all(|m| *m == TypeDesc::Null || is_orderable(m))
        }
        _ => false,
    }
}

/// `equals`: field equals the argument. Numbers compare by value.
pub fn equals() -> GenericOperation {
    GenericOperation::new(
        "equals",
        is_scalar,
        |t| Signature::new(vec![t.clone(), t.clone()], TypeDesc::Bool),
        |args| match args {
            [left, right] => Ok(Value::Bool(
                compare_values(left, right).is_ok_and(|o| o == Ordering::Equal),
            )),
            _ => Err(OperationError::failed("equals takes two values")),
        },
    )
}

/// `greater than`: field is strictly after the argument.
pub fn greater_than() -> GenericOperation {
    GenericOperation::new(
        "greater than",
        is_orderable,
        |t| Signature::new(vec![t.clone(), t.clone()], TypeDesc::Bool),
        |args| match args {
            [left, right] => Ok(Value::Bool(compare_values(left, right)? == Ordering::Greater)),
            _ => Err(OperationError::failed("greater than takes two values")),
        },
    )
}

/// `less than`: field is strictly before the argument.
pub fn less_than() -> GenericOperation {
    GenericOperation::new(
        "less than",
        is_orderable,
        |t| Signature::new(vec![t.clone(), t.clone()], TypeDesc::Bool),
        |args| match args {
            [left, right] => Ok(Value::Bool(compare_values(left, right)? == Ordering::Less)),
            _ => Err(OperationError::failed("less than takes two values")),
        },
    )
}

/// `contains`: case-sensitive substring test on text fields.
pub fn contains() -> StandardOperation {
    StandardOperation::new(
        "contains",
        Signature::new(vec![TypeDesc::Text, TypeDesc::Text], TypeDesc::Bool),
        |args| match args {
            [Value::Text(haystack), Value::Text(needle)] => {
                Ok(Value::Bool(haystack.contains(needle.as_str())))
            }
            [Value::Text(_), other] | [other, _] => Err(OperationError::bad_argument("Text", other)),
            _ => Err(OperationError::failed("contains takes two values")),
        },
    )
}

/// `is empty`: `Null`, empty text, or an empty list.
pub fn is_empty() -> StandardOperation {
    StandardOperation::new(
        "is empty",
        Signature::new(vec![TypeDesc::Any], TypeDesc::Bool),
        |args| {
            let empty = match args.first() {
                None | Some(Value::Null) => true,
                Some(Value::Text(s)) => s.is_empty(),
                Some(Value::List(items)) => items.is_empty(),
                Some(_) => false,
            };
            Ok(Value::Bool(empty))
        },
    )
}

/// `compare`: the natural order of orderable fields, as `-1 | 0 | 1`.
pub fn compare() -> GenericOperation {
    GenericOperation::new(
        "compare",
        is_orderable,
        |t| Signature::new(vec![t.clone(), t.clone()], TypeDesc::ordering()),
        |args| match args {
            [left, right] => Ok(ordering_value(compare_values(left, right)?)),
            _ => Err(OperationError::failed("compare takes two values")),
        },
    )
}

/// A filter registry holding every built-in predicate.
pub fn filter_registry() -> Result<OperationRegistry, RegistryError> {
    let mut registry = OperationRegistry::new(OperationRole::Filter);
    registry.register(equals())?;
    registry.register(greater_than())?;
    registry.register(less_than())?;
    registry.register(contains())?;
    registry.register(is_empty())?;
    Ok(registry)
}

/// A sort registry holding the built-in comparator.
pub fn sort_registry() -> Result<OperationRegistry, RegistryError> {
    OperationRegistry::with_operations(OperationRole::Sort, [compare()])
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn numbers_compare_across_representations() {
        let half = Value::Decimal(Decimal::from_str("2.5").unwrap());
        assert_eq!(compare_values(&Value::Int(2), &half), Ok(Ordering::Less));
        assert_eq!(
            compare_values(&Value::Decimal(Decimal::from(3)), &Value::Int(3)),
            Ok(Ordering::Equal)
        );
    }

    #[test]
    fn null_sorts_first_and_mixed_kinds_fail() {
        assert_eq!(
            compare_values(&Value::Null, &Value::text("a")),
            Ok(Ordering::Less)
        );
        assert!(compare_values(&Value::text("a"), &Value::Int(1)).is_err());
    }

    #[test]
    fn guards_select_field_types() {
        let status = TypeDesc::union(vec![TypeDesc::literal("open"), TypeDesc::literal("closed")]);
        assert!(equals().applies_to(&status));
        assert!(equals().applies_to(&TypeDesc::optional(TypeDesc::Int)));
        assert!(!equals().applies_to(&TypeDesc::record([("a", TypeDesc::Int)])));
        assert!(compare().applies_to(&TypeDesc::optional(TypeDesc::Date)));
        assert!(!compare().applies_to(&TypeDesc::Bool));
        assert!(!compare().applies_to(&TypeDesc::Null));
    }

    #[test]
    fn registries_register_cleanly() {
        let filters = filter_registry().unwrap();
        assert_eq!(filters.len(), 5);
        let sorts = sort_registry().unwrap();
        assert!(sorts.contains("compare"));
    }

    #[test]
    fn contains_rejects_non_text() {
        let op = contains();
        assert_eq!(
            op.invoke(&[&Value::text("hello"), &Value::text("ell")]),
            Ok(Value::Bool(true))
        );
        assert!(op.invoke(&[&Value::Int(1), &Value::text("1")]).is_err());
    }
}
