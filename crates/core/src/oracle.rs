//! Type compatibility oracle.
//!
//! The engine never compares type descriptors itself. It asks an oracle
//! whether a value of `actual` type may be passed where `expected` is
//! declared. Callers with their own schema library supply their own
//! oracle; `StructuralOracle` covers `TypeDesc` as defined here.

use crate::types::TypeDesc;

/// Decides whether `actual` may be bound to a parameter of type `expected`.
pub trait TypeOracle {
    fn is_compatible(&self, expected: &TypeDesc, actual: &TypeDesc) -> bool;
}

impl<F> TypeOracle for F
where
    F: Fn(&TypeDesc, &TypeDesc) -> bool,
{
    fn is_compatible(&self, expected: &TypeDesc, actual: &TypeDesc) -> bool {
        self(expected, actual)
    }
}

/// Structural compatibility over `TypeDesc`.
///
/// - `Any` as the expected type accepts everything.
/// - A union on the actual side must be compatible member by member.
/// - A union on the expected side accepts anything one member accepts.
/// - Literals are compatible with the base type that admits them.
/// - `Int` is accepted where `Decimal` is expected.
/// - Records are compatible when every expected property exists on the
///   actual record with a compatible type. Extra properties are allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralOracle;

impl TypeOracle for StructuralOracle {
    fn is_compatible(&self, expected: &TypeDesc, actual: &TypeDesc) -> bool {
        compatible(expected, actual)
    }
}

fn compatible(expected: &TypeDesc, actual: &TypeDesc) -> bool {
    if matches!(expected, TypeDesc::Any) || expected == actual {
        return true;
    }
    if let TypeDesc::Union { members } = actual {
        return !members.is_empty() && members.iter().all(|m| compatible(expected, m));
    }
    match (expected, actual) {
        (TypeDesc::Union { members }, a) => members.iter().any(|m| compatible(m, a)),
        (TypeDesc::Decimal, TypeDesc::Int) => true,
        (e, TypeDesc::Literal { value }) => e.admits(value),
        (TypeDesc::List { element: e }, TypeDesc::List { element: a }) => compatible(e, a),
        (TypeDesc::Tuple { items: es }, TypeDesc::Tuple { items: as_ }) => {
            es.len() == as_.len() && es.iter().zip(as_).all(|(e, a)| compatible(e, a))
        }
        (TypeDesc::Record { fields: expected_fields }, TypeDesc::Record { .. }) => {
            expected_fields.iter().all(|decl| {
                actual
                    .field(&decl.name)
                    .is_some_and(|a| compatible(&decl.ty, a))
            })
        }
        _ => false,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(expected: &TypeDesc, actual: &TypeDesc) -> bool {
        StructuralOracle.is_compatible(expected, actual)
    }

    #[test]
    fn any_accepts_everything() {
        assert!(ok(&TypeDesc::Any, &TypeDesc::Text));
        assert!(ok(&TypeDesc::Any, &TypeDesc::record([("a", TypeDesc::Int)])));
        assert!(!ok(&TypeDesc::Text, &TypeDesc::Any));
    }

    #[test]
    fn scalars_match_exactly_with_int_widening() {
        assert!(ok(&TypeDesc::Int, &TypeDesc::Int));
        assert!(ok(&TypeDesc::Decimal, &TypeDesc::Int));
        assert!(!ok(&TypeDesc::Int, &TypeDesc::Decimal));
        assert!(!ok(&TypeDesc::Text, &TypeDesc::Int));
    }

    #[test]
    fn optional_field_is_not_a_plain_value() {
        let opt = TypeDesc::optional(TypeDesc::Int);
        assert!(!ok(&TypeDesc::Int, &opt));
        assert!(ok(&opt, &TypeDesc::Int));
        assert!(ok(&opt, &opt));
    }

    #[test]
    fn literal_union_fits_base_type() {
        let status = TypeDesc::union(vec![
            TypeDesc::literal("open"),
            TypeDesc::literal("closed"),
        ]);
        assert!(ok(&TypeDesc::Text, &status));
        assert!(!ok(&TypeDesc::Int, &status));
    }

    #[test]
    fn records_allow_extra_properties() {
        let wide = TypeDesc::record([("id", TypeDesc::Text), ("age", TypeDesc::Int)]);
        let narrow = TypeDesc::record([("id", TypeDesc::Text)]);
        assert!(ok(&narrow, &wide));
        assert!(!ok(&wide, &narrow));
    }

    #[test]
    fn closures_are_oracles() {
        let exact = |e: &TypeDesc, a: &TypeDesc| e == a;
        assert!(exact.is_compatible(&TypeDesc::Int, &TypeDesc::Int));
        assert!(!exact.is_compatible(&TypeDesc::Decimal, &TypeDesc::Int));
    }
}
