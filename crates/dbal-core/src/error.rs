//! Error types for query compilation and schema management.

/// Errors raised while building, compiling, or diffing.
///
/// Every error is raised at the point of detection; nothing is retried
/// and no partial SQL is returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed builder usage: unbalanced groups, an unknown dialect,
    /// an index over a missing column, and similar.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation the target entity or dialect does not support.
    #[error("Unsupported operation: {entity} does not support '{operation}'")]
    UnsupportedOperation {
        /// The entity the operation was invoked on.
        entity: String,
        /// The operation that was requested.
        operation: String,
    },

    /// Compilation was attempted without a dialect bound to the query.
    #[error("Compilation error: {0}")]
    Compilation(String),

    /// A failure reported by the connection layer, passed through as is.
    #[error("Execution error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Shorthand for [`Error::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for [`Error::UnsupportedOperation`].
    pub fn unsupported(entity: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            entity: entity.into(),
            operation: operation.into(),
        }
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
