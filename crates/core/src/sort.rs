//! Sort rules: an ordered list of keys, the first one primary.

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One sort key: compare the values at `path` with a named comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortItem {
    pub path: FieldPath,
    pub operation_name: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortItem {
    pub fn asc(path: FieldPath, operation_name: impl Into<String>) -> Self {
        SortItem {
            path,
            operation_name: operation_name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(path: FieldPath, operation_name: impl Into<String>) -> Self {
        SortItem {
            path,
            operation_name: operation_name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort keys in priority order. Later items only break ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortRule(pub Vec<SortItem>);

impl SortRule {
    pub fn new(items: Vec<SortItem>) -> Self {
        SortRule(items)
    }

    pub fn items(&self) -> &[SortItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SortItem> for SortRule {
    fn from_iter<I: IntoIterator<Item = SortItem>>(iter: I) -> Self {
        SortRule(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_ascending() {
        let item: SortItem = serde_json::from_value(serde_json::json!({
            "path": ["age"],
            "operationName": "number compare"
        }))
        .unwrap();
        assert_eq!(item.direction, SortDirection::Asc);
    }

    #[test]
    fn rule_serializes_as_plain_array() {
        let rule = SortRule::new(vec![SortItem::desc(
            FieldPath::fields(["score"]),
            "number compare",
        )]);
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            serde_json::json!([
                { "path": ["score"], "operationName": "number compare", "direction": "desc" }
            ])
        );
    }
}
