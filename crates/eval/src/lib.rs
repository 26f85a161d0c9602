//! Sift rule engine -- resolves loose rules against a record schema
//! and an operation registry, and compiles them into executable
//! filters and sorts.
//!
//! Pipeline:
//! 1. `discover_fields` lists which fields admit which operations.
//! 2. `normalize` turns a loose rule into a strict one, dropping the
//!    parts that no longer resolve.
//! 3. `compile_filter` / `compile_sort` resolve every operation once.
//! 4. `filter_data` / `sort_data` apply the result to a record list.
//!
//! `filter_map` flattens rule trees into an id-keyed table for
//! editing, and `count` reports how many leaves survive normalization.

pub mod builtins;
pub mod comparator;
pub mod count;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod filter_map;
pub mod instantiate;
pub mod normalize;
pub mod predicate;
pub mod resolve;

pub use comparator::{compile_sort, validate_sort, CompiledComparator};
pub use count::{count_leaves, count_valid_leaves};
pub use dataset::{filter_data, filter_with, sort_data, sort_with};
pub use discovery::{discover_fields, DiscoveredField};
pub use error::{EvalError, RuleIssue};
pub use filter_map::{depth_of, from_filter_map, to_filter_map, FilterMap, MapNode};
pub use instantiate::{instantiate, operation_for_field};
pub use normalize::normalize;
pub use predicate::{compile_filter, CompiledPredicate};
pub use resolve::Resolver;
