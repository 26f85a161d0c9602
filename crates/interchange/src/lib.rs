//! sift-interchange: the persisted form of Sift rules.
//!
//! A `RuleDocument` wraps either a filter tree or a sort rule in a
//! small versioned envelope:
//!
//! ```json
//! { "version": 1, "kind": "filter", "rule": { "type": "FilterGroup", ... } }
//! { "version": 1, "kind": "sort",   "rule": [ { "path": ["age"], ... } ] }
//! ```
//!
//! Argument values with no native JSON form (decimals, dates,
//! timestamps) use the tagged convention of `sift_core::Value`. The
//! JSON Schema for documents lives at `schema/rule-document.schema.json`
//! in the workspace root.

pub mod document;
pub mod error;

pub use document::{from_json, from_str, RuleBody, RuleDocument, DOCUMENT_VERSION};
pub use error::InterchangeError;
