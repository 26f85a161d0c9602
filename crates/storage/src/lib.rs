//! Persistence for filter and sort rules.
//!
//! Rules are stored as versioned [`RuleDocument`]s under caller-chosen
//! keys. Backends implement [`RuleStorage`]; [`InMemoryStorage`] is the
//! reference backend and the one the conformance suite is checked against.

pub mod conformance;
mod error;
mod memory;
mod traits;

pub use error::StorageError;
pub use memory::InMemoryStorage;
pub use traits::RuleStorage;

pub use sift_interchange::{RuleBody, RuleDocument};
