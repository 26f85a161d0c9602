//! Field paths: ordered keys locating a value inside a record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a field path. Serialized as a bare JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathKey {
    Index(usize),
    Field(String),
}

impl From<&str> for PathKey {
    fn from(s: &str) -> Self {
        PathKey::Field(s.to_owned())
    }
}

impl From<String> for PathKey {
    fn from(s: String) -> Self {
        PathKey::Field(s)
    }
}

impl From<usize> for PathKey {
    fn from(i: usize) -> Self {
        PathKey::Index(i)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(i) => write!(f, "[{}]", i),
            PathKey::Field(name) => write!(f, "{}", name),
        }
    }
}

/// An ordered sequence of keys. The empty path is the record root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathKey>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// Path of plain field names, e.g. `FieldPath::fields(["address", "city"])`.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath(
            names
                .into_iter()
                .map(|n| PathKey::Field(n.into()))
                .collect(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[PathKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path one step below this one.
    pub fn child(&self, key: impl Into<PathKey>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.into());
        FieldPath(keys)
    }
}

impl From<Vec<PathKey>> for FieldPath {
    fn from(keys: Vec<PathKey>) -> Self {
        FieldPath(keys)
    }
}

impl FromIterator<PathKey> for FieldPath {
    fn from_iter<I: IntoIterator<Item = PathKey>>(iter: I) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            match key {
                PathKey::Field(_) if i > 0 => write!(f, ".{}", key)?,
                _ => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}
