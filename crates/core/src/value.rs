//! Runtime values: the records rules are evaluated against, and the
//! argument values rules carry.
//!
//! JSON-native values map onto plain JSON. `Decimal`, `Date`, and
//! `DateTime` have no native JSON form and use a tagged object:
//! `{"__type": "Date", "value": "2024-03-01"}`.

use rust_decimal::Decimal;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::ValueError;
use crate::path::{FieldPath, PathKey};

/// Key naming the tag of a non-native value in JSON.
pub const TYPE_TAG: &str = "__type";

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// The value at any path that does not exist in a record.
pub static NULL: Value = Value::Null;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Date(Date),
    DateTime(OffsetDateTime),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Decimal(_) => "Decimal",
            Value::Text(_) => "Text",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
        }
    }

    /// Build a record from `(name, value)` pairs.
    pub fn record<K, I>(fields: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; `Int` widens to `Decimal`.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// One step of path traversal. Records are indexed by field name,
    /// lists by position; anything else has no children.
    pub fn child(&self, key: &PathKey) -> Option<&Value> {
        match (self, key) {
            (Value::Record(fields), PathKey::Field(name)) => fields.get(name),
            (Value::List(items), PathKey::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// The value at `path`, or `Null` when any segment is missing.
    /// Never fails: a missing intermediate simply yields `Null`.
    pub fn at_path(&self, path: &FieldPath) -> &Value {
        let mut current = self;
        for key in path.keys() {
            match current.child(key) {
                Some(next) => current = next,
                None => return &NULL,
            }
        }
        current
    }

    /// Encode to JSON using the tagged convention for non-native values.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Decimal(d) => tagged("Decimal", d.to_string()),
            Value::Date(d) => {
                let s = d.format(DATE_FORMAT).map_err(|e| ValueError::Format {
                    tag: "Date".to_string(),
                    message: e.to_string(),
                })?;
                tagged("Date", s)
            }
            Value::DateTime(dt) => {
                let s = dt.format(&Rfc3339).map_err(|e| ValueError::Format {
                    tag: "DateTime".to_string(),
                    message: e.to_string(),
                })?;
                tagged("DateTime", s)
            }
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Record(fields) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in fields {
                    obj.insert(k.clone(), v.to_json()?);
                }
                serde_json::Value::Object(obj)
            }
        })
    }

    /// Decode from JSON, recognising tagged objects.
    pub fn from_json(v: &serde_json::Value) -> Result<Value, ValueError> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Value::Int(i));
                }
                let s = n.to_string();
                Decimal::from_str_exact(&s)
                    .or_else(|_| Decimal::from_scientific(&s))
                    .map(Value::Decimal)
                    .map_err(|_| ValueError::Number(s))
            }
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(items) => Ok(Value::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            serde_json::Value::Object(obj) => {
                if let Some(tag) = obj.get(TYPE_TAG).and_then(|t| t.as_str()) {
                    let payload = obj.get("value").and_then(|p| p.as_str()).ok_or_else(|| {
                        ValueError::Malformed {
                            tag: tag.to_string(),
                            message: "missing string 'value'".to_string(),
                        }
                    })?;
                    return decode_tagged(tag, payload);
                }
                let mut fields = BTreeMap::new();
                for (k, v) in obj {
                    fields.insert(k.clone(), Value::from_json(v)?);
                }
                Ok(Value::Record(fields))
            }
        }
    }
}

fn tagged(tag: &str, value: String) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert(TYPE_TAG.to_string(), serde_json::Value::from(tag));
    obj.insert("value".to_string(), serde_json::Value::String(value));
    serde_json::Value::Object(obj)
}

fn decode_tagged(tag: &str, payload: &str) -> Result<Value, ValueError> {
    let malformed = |message: String| ValueError::Malformed {
        tag: tag.to_string(),
        message,
    };
    match tag {
        "Decimal" => payload
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|e| malformed(e.to_string())),
        "Date" => Date::parse(payload, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|e| malformed(e.to_string())),
        "DateTime" => OffsetDateTime::parse(payload, &Rfc3339)
            .map(Value::DateTime)
            .map_err(|e| malformed(e.to_string())),
        other => Err(ValueError::UnknownTag {
            tag: other.to_string(),
        }),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&raw).map_err(de::Error::custom)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Value::Date(d)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(dt: OffsetDateTime) -> Self {
        Value::DateTime(dt)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::{date, datetime};

    fn person() -> Value {
        Value::record([
            ("name", Value::text("Alice")),
            (
                "address",
                Value::record([("city", Value::text("Oslo"))]),
            ),
            ("tags", Value::List(vec![Value::text("a"), Value::text("b")])),
        ])
    }

    #[test]
    fn at_path_walks_records_and_lists() {
        let p = person();
        let city: FieldPath = vec![PathKey::from("address"), PathKey::from("city")].into();
        assert_eq!(p.at_path(&city), &Value::text("Oslo"));
        let second_tag: FieldPath = vec![PathKey::from("tags"), PathKey::from(1usize)].into();
        assert_eq!(p.at_path(&second_tag), &Value::text("b"));
    }

    #[test]
    fn at_path_missing_segment_is_null() {
        let p = person();
        let missing: FieldPath = vec![PathKey::from("address"), PathKey::from("zip")].into();
        assert!(p.at_path(&missing).is_null());
        let through_text: FieldPath = vec![PathKey::from("name"), PathKey::from("x")].into();
        assert!(p.at_path(&through_text).is_null());
    }

    #[test]
    fn root_path_is_the_record_itself() {
        let p = person();
        assert_eq!(p.at_path(&FieldPath::root()), &p);
    }

    #[test]
    fn native_values_encode_as_plain_json() {
        let v = Value::record([
            ("n", Value::Int(3)),
            ("s", Value::text("x")),
            ("b", Value::Bool(false)),
            ("z", Value::Null),
        ]);
        assert_eq!(
            v.to_json().unwrap(),
            serde_json::json!({"n": 3, "s": "x", "b": false, "z": null})
        );
    }

    #[test]
    fn dates_use_tagged_encoding() {
        let v = Value::Date(date!(2024 - 03 - 01));
        let json = v.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({"__type": "Date", "value": "2024-03-01"})
        );
        assert_eq!(Value::from_json(&json).unwrap(), v);
    }

    #[test]
    fn datetime_and_decimal_survive_serde() {
        let v = Value::List(vec![
            Value::DateTime(datetime!(2024-03-01 12:30:00 UTC)),
            Value::Decimal(Decimal::from_str("12.50").unwrap()),
        ]);
        let s = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn fractional_numbers_decode_as_decimal() {
        let v = Value::from_json(&serde_json::json!(1.25)).unwrap();
        assert_eq!(v, Value::Decimal(Decimal::from_str("1.25").unwrap()));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = Value::from_json(&serde_json::json!({"__type": "Blob", "value": "x"}));
        assert_eq!(
            err,
            Err(ValueError::UnknownTag {
                tag: "Blob".to_string()
            })
        );
    }
}
