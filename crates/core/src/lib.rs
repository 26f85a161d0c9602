//! sift-core: the data model shared by the Sift rule engine.
//!
//! Holds everything a caller needs to describe records and rules:
//! type descriptors for record schemas, runtime values, field paths,
//! operation descriptors and their registry, the type compatibility
//! oracle, loose and strict rule trees, sort rules, id generation,
//! and engine configuration.
//!
//! Resolution, compilation, and evaluation live in `sift-eval`.

pub mod config;
pub mod error;
pub mod id;
pub mod operation;
pub mod oracle;
pub mod path;
pub mod registry;
pub mod rule;
pub mod sort;
pub mod types;
pub mod value;

pub use config::{DiscoveryConfig, EngineConfig, ErrorPolicy, FilterConfig};
pub use error::{ConfigError, OperationError, RegistryError, ValueError};
pub use id::{IdGenerator, RandomIds, SequentialIds};
pub use operation::{
    GenericOperation, GenericOrigin, Implementation, Meta, Operation, OperationRole, Signature,
    StandardOperation,
};
pub use oracle::{StructuralOracle, TypeOracle};
pub use path::{FieldPath, PathKey};
pub use registry::OperationRegistry;
pub use rule::{
    FilterState, GroupOp, LooseFilter, LooseRule, Missing, RuleGroup, RuleId, RuleLeaf, RuleNode,
    StrictFilter, StrictRule,
};
pub use sort::{SortDirection, SortItem, SortRule};
pub use types::{FieldDecl, TypeDesc};
pub use value::Value;
