use async_trait::async_trait;

use sift_interchange::RuleDocument;

use crate::error::StorageError;

/// The storage trait for persisted rules.
///
/// A `RuleStorage` maps string keys to [`RuleDocument`]s. The engine never
/// calls it; callers load a document, hand the rule to the evaluator, and
/// write edited rules back.
///
/// ## Semantics
///
/// - `set` overwrites whatever was stored under the key.
/// - `get` on a key that was never set (or was removed) returns `Ok(None)`.
/// - A document read back equals the document written, including loose
///   filters that do not normalize yet.
/// - The empty string is not a valid key; every method rejects it with
///   [`StorageError::EmptyKey`].
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so one instance can be
/// shared across async tasks.
#[async_trait]
pub trait RuleStorage: Send + Sync + 'static {
    /// Read the document stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<RuleDocument>, StorageError>;

    /// Store `doc` under `key`, replacing any previous document.
    async fn set(&self, key: &str, doc: &RuleDocument) -> Result<(), StorageError>;

    /// Delete the document under `key`. Returns whether one existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys currently holding a document, in ascending order.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}
