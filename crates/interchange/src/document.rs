//! Rule documents.

use std::collections::HashSet;

use sift_core::{LooseRule, RuleLeaf, RuleNode, SortRule, StrictRule};

use crate::error::InterchangeError;

/// Format version written by this build.
pub const DOCUMENT_VERSION: u32 = 1;

/// What a document holds.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleBody {
    /// A filter tree, stored in loose form so unfinished rules persist.
    Filter(LooseRule),
    Sort(SortRule),
}

/// A versioned, persisted rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDocument {
    pub version: u32,
    pub body: RuleBody,
}

impl RuleDocument {
    pub fn filter(rule: LooseRule) -> Self {
        RuleDocument {
            version: DOCUMENT_VERSION,
            body: RuleBody::Filter(rule),
        }
    }

    /// A document for a normalized rule. It is stored in loose form and
    /// normalizes back to the same rule.
    pub fn strict_filter(rule: StrictRule) -> Self {
        Self::filter(LooseRule::from(rule))
    }

    pub fn sort(rule: SortRule) -> Self {
        RuleDocument {
            version: DOCUMENT_VERSION,
            body: RuleBody::Sort(rule),
        }
    }

    /// `"filter"` or `"sort"`.
    pub fn kind(&self) -> &'static str {
        match self.body {
            RuleBody::Filter(_) => "filter",
            RuleBody::Sort(_) => "sort",
        }
    }

    pub fn as_filter(&self) -> Option<&LooseRule> {
        match &self.body {
            RuleBody::Filter(rule) => Some(rule),
            RuleBody::Sort(_) => None,
        }
    }

    pub fn as_sort(&self) -> Option<&SortRule> {
        match &self.body {
            RuleBody::Sort(rule) => Some(rule),
            RuleBody::Filter(_) => None,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, InterchangeError> {
        let rule = match &self.body {
            RuleBody::Filter(rule) => serde_json::to_value(rule)?,
            RuleBody::Sort(rule) => serde_json::to_value(rule)?,
        };
        let mut obj = serde_json::Map::new();
        obj.insert("version".to_string(), serde_json::Value::from(self.version));
        obj.insert("kind".to_string(), serde_json::Value::from(self.kind()));
        obj.insert("rule".to_string(), rule);
        Ok(serde_json::Value::Object(obj))
    }

    /// Compact JSON text.
    pub fn to_json_string(&self) -> Result<String, InterchangeError> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

/// Decode a document from JSON text.
pub fn from_str(src: &str) -> Result<RuleDocument, InterchangeError> {
    let value: serde_json::Value = serde_json::from_str(src)?;
    from_json(&value)
}

/// Decode a document from a JSON value.
///
/// Dispatches on `kind`. Documents from a newer format version are
/// rejected rather than partially read.
pub fn from_json(doc: &serde_json::Value) -> Result<RuleDocument, InterchangeError> {
    let version = doc
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "version".to_string(),
        })?;
    if version == 0 || version > u64::from(DOCUMENT_VERSION) {
        return Err(InterchangeError::UnsupportedVersion {
            found: version,
            supported: DOCUMENT_VERSION,
        });
    }

    let kind = doc
        .get("kind")
        .and_then(|k| k.as_str())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "kind".to_string(),
        })?;
    let rule = doc
        .get("rule")
        .ok_or_else(|| InterchangeError::MissingField {
            field: "rule".to_string(),
        })?;

    let invalid = |e: serde_json::Error| InterchangeError::InvalidRule {
        kind: kind.to_string(),
        message: e.to_string(),
    };
    let body = match kind {
        "filter" => {
            let tree: LooseRule = serde_json::from_value(rule.clone()).map_err(invalid)?;
            check_unique_ids(&tree)?;
            RuleBody::Filter(tree)
        }
        "sort" => RuleBody::Sort(serde_json::from_value(rule.clone()).map_err(invalid)?),
        other => {
            return Err(InterchangeError::UnknownKind {
                kind: other.to_string(),
            })
        }
    };

    Ok(RuleDocument {
        version: DOCUMENT_VERSION,
        body,
    })
}

fn check_unique_ids<L: RuleLeaf>(tree: &RuleNode<L>) -> Result<(), InterchangeError> {
    let mut seen = HashSet::new();
    let mut pending = vec![tree];
    while let Some(node) = pending.pop() {
        if !seen.insert(node.id()) {
            return Err(InterchangeError::DuplicateId {
                id: node.id().to_string(),
            });
        }
        if let RuleNode::Group(group) = node {
            pending.extend(group.conditions.iter());
        }
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
