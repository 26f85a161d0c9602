use sift_interchange::InterchangeError;

/// All errors that can be returned by a RuleStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Keys must be non-empty.
    #[error("storage key must not be empty")]
    EmptyKey,

    /// A stored document could not be encoded or decoded.
    #[error("rule document under '{key}' is unreadable: {source}")]
    Codec {
        key: String,
        #[source]
        source: InterchangeError,
    },

    /// A backend-specific storage error (connection, I/O, etc.). The
    /// in-memory backend never fails this way; durable backends outside
    /// this crate report their driver errors through it.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StorageError::Backend(err.to_string())
    }

    pub(crate) fn codec(key: &str, source: InterchangeError) -> Self {
        StorageError::Codec {
            key: key.to_string(),
            source,
        }
    }
}
