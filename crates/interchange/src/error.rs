//! Errors decoding and encoding rule documents.

/// Errors during rule document (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    /// The document is missing a required top-level field.
    #[error("document missing required field: '{field}'")]
    MissingField { field: String },

    /// The document was written by a newer (or invalid) format version.
    #[error("unsupported document version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    /// The `kind` field names neither a filter nor a sort.
    #[error("unknown document kind '{kind}'")]
    UnknownKind { kind: String },

    /// The rule payload does not match the shape for its kind.
    #[error("invalid {kind} rule: {message}")]
    InvalidRule { kind: String, message: String },

    /// Two nodes of a filter tree share an id.
    #[error("duplicate node id '{id}' in filter tree")]
    DuplicateId { id: String },

    /// The document is not valid JSON, or could not be rendered.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}
