//! Error types for the Sift data model.

use crate::operation::OperationRole;

/// Raised while building an operation registry.
///
/// These are configuration errors: the registration call fails and the
/// registry is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// An operation with this name is already registered.
    #[error("operation '{name}' is already registered")]
    DuplicateOperation { name: String },

    /// A standard operation declares no parameters at all.
    #[error("operation '{name}' declares no parameters")]
    NoParameters { name: String },

    /// A standard operation whose signature cannot serve the registry's role.
    #[error("operation '{name}' has a signature unsuitable for {role} use")]
    UnsuitableSignature { name: String, role: OperationRole },
}

/// Returned by an operation implementation that cannot produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// The implementation failed for a reason of its own.
    #[error("{message}")]
    Failed { message: String },

    /// The implementation received a value it cannot handle.
    #[error("expected {expected}, got {got}")]
    BadArgument { expected: String, got: String },
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed {
            message: message.into(),
        }
    }

    pub fn bad_argument(expected: &str, got: &crate::value::Value) -> Self {
        OperationError::BadArgument {
            expected: expected.to_owned(),
            got: got.type_name().to_owned(),
        }
    }
}

/// Errors converting values to and from their JSON form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// A tagged object carries a `__type` this crate does not know.
    #[error("unknown value tag '{tag}'")]
    UnknownTag { tag: String },

    /// A tagged object whose payload cannot be decoded.
    #[error("malformed {tag} value: {message}")]
    Malformed { tag: String, message: String },

    /// A number that fits neither `i64` nor `Decimal`.
    #[error("unrepresentable number {0}")]
    Number(String),

    /// A date or timestamp that cannot be rendered.
    #[error("cannot format {tag} value: {message}")]
    Format { tag: String, message: String },
}

/// Engine configuration that failed to parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Invalid(#[from] serde_json::Error),
}
