//! Type descriptors for record schemas and operation signatures.
//!
//! A `TypeDesc` describes the shape of a value. Record schemas are
//! `TypeDesc::Record` trees; operation signatures are lists of them.
//! Compatibility between two descriptors is decided by a
//! [`TypeOracle`](crate::oracle::TypeOracle), not here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::{FieldPath, PathKey};
use crate::value::Value;

static ANY: TypeDesc = TypeDesc::Any;

/// A single declared property of a record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

/// Structural description of a value's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    /// Matches every value.
    Any,
    Null,
    Bool,
    Int,
    Decimal,
    Text,
    Date,
    DateTime,
    /// Exactly one value.
    Literal { value: Value },
    /// Any one of the members.
    Union { members: Vec<TypeDesc> },
    /// Homogeneous list.
    List { element: Box<TypeDesc> },
    /// Fixed-length, positionally typed list.
    Tuple { items: Vec<TypeDesc> },
    /// Record with properties in declaration order.
    Record { fields: Vec<FieldDecl> },
}

impl TypeDesc {
    /// Record type from `(name, type)` pairs, keeping their order.
    pub fn record<K, I>(fields: I) -> TypeDesc
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypeDesc)>,
    {
        TypeDesc::Record {
            fields: fields
                .into_iter()
                .map(|(name, ty)| FieldDecl {
                    name: name.into(),
                    ty,
                })
                .collect(),
        }
    }

    pub fn list(element: TypeDesc) -> TypeDesc {
        TypeDesc::List {
            element: Box::new(element),
        }
    }

    pub fn tuple(items: Vec<TypeDesc>) -> TypeDesc {
        TypeDesc::Tuple { items }
    }

    pub fn union(members: Vec<TypeDesc>) -> TypeDesc {
        TypeDesc::Union { members }
    }

    pub fn literal(value: impl Into<Value>) -> TypeDesc {
        TypeDesc::Literal {
            value: value.into(),
        }
    }

    /// `ty` or `Null`.
    pub fn optional(ty: TypeDesc) -> TypeDesc {
        TypeDesc::Union {
            members: vec![ty, TypeDesc::Null],
        }
    }

    /// The tri-state comparator result `-1 | 0 | 1`.
    pub fn ordering() -> TypeDesc {
        TypeDesc::union(vec![
            TypeDesc::literal(-1i64),
            TypeDesc::literal(0i64),
            TypeDesc::literal(1i64),
        ])
    }

    pub fn is_record(&self) -> bool {
        matches!(self, TypeDesc::Record { .. })
    }

    /// Declared properties, for record types only.
    pub fn fields(&self) -> Option<&[FieldDecl]> {
        match self {
            TypeDesc::Record { fields } => Some(fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&TypeDesc> {
        self.fields()?
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.ty)
    }

    /// Whether values of this type are numbers a comparator may return.
    pub fn is_number_like(&self) -> bool {
        match self {
            TypeDesc::Int | TypeDesc::Decimal => true,
            TypeDesc::Literal { value } => matches!(value, Value::Int(_) | Value::Decimal(_)),
            TypeDesc::Union { members } => {
                !members.is_empty() && members.iter().all(TypeDesc::is_number_like)
            }
            _ => false,
        }
    }

    /// The single non-null member of an optional type.
    fn unwrap_optional(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Union { members } => {
                let mut non_null = members.iter().filter(|m| **m != TypeDesc::Null);
                match (non_null.next(), non_null.next()) {
                    (Some(only), None) => Some(only),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// One step of schema traversal.
    pub fn child(&self, key: &PathKey) -> Option<&TypeDesc> {
        match (self, key) {
            (TypeDesc::Any, _) => Some(&ANY),
            (TypeDesc::Record { .. }, PathKey::Field(name)) => self.field(name),
            (TypeDesc::List { element }, PathKey::Index(_)) => Some(element),
            (TypeDesc::Tuple { items }, PathKey::Index(i)) => items.get(*i),
            (TypeDesc::Union { .. }, _) => self.unwrap_optional()?.child(key),
            _ => None,
        }
    }

    /// The type found at `path`, or `None` if the path leaves the schema.
    pub fn resolve_path(&self, path: &FieldPath) -> Option<&TypeDesc> {
        let mut current = self;
        for key in path.keys() {
            current = current.child(key)?;
        }
        Some(current)
    }

    /// Whether `value` inhabits this type. Used to check rule arguments.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDesc::Any, _) => true,
            (TypeDesc::Null, Value::Null) => true,
            (TypeDesc::Bool, Value::Bool(_)) => true,
            (TypeDesc::Int, Value::Int(_)) => true,
            (TypeDesc::Decimal, Value::Decimal(_) | Value::Int(_)) => true,
            (TypeDesc::Text, Value::Text(_)) => true,
            (TypeDesc::Date, Value::Date(_)) => true,
            (TypeDesc::DateTime, Value::DateTime(_)) => true,
            (TypeDesc::Literal { value: lit }, v) => lit == v,
            (TypeDesc::Union { members }, v) => members.iter().any(|m| m.admits(v)),
            (TypeDesc::List { element }, Value::List(items)) => {
                items.iter().all(|item| element.admits(item))
            }
            (TypeDesc::Tuple { items: types }, Value::List(items)) => {
                types.len() == items.len() && types.iter().zip(items).all(|(t, v)| t.admits(v))
            }
            (TypeDesc::Record { fields: decls }, Value::Record(fields)) => {
                decls.iter().all(|decl| match fields.get(&decl.name) {
                    Some(v) => decl.ty.admits(v),
                    None => decl.ty.admits(&Value::Null),
                })
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Any => write!(f, "Any"),
            TypeDesc::Null => write!(f, "Null"),
            TypeDesc::Bool => write!(f, "Bool"),
            TypeDesc::Int => write!(f, "Int"),
            TypeDesc::Decimal => write!(f, "Decimal"),
            TypeDesc::Text => write!(f, "Text"),
            TypeDesc::Date => write!(f, "Date"),
            TypeDesc::DateTime => write!(f, "DateTime"),
            TypeDesc::Literal { value } => write!(f, "{}", value),
            TypeDesc::Union { members } => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
            TypeDesc::List { element } => write!(f, "List<{}>", element),
            TypeDesc::Tuple { items } => {
                write!(f, "(")?;
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
            TypeDesc::Record { fields } => {
                write!(f, "{{")?;
                for (i, decl) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", decl.name, decl.ty)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
