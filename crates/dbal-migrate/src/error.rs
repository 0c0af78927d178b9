//! Error types for the SQLite driver and CLI.

/// Errors raised while connecting, introspecting, or applying definitions.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Query building, compilation, or diffing failed.
    #[error(transparent)]
    Core(#[from] dbal_core::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading definition files, starting the runtime).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database URL names a driver this crate cannot open.
    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// The live schema could not be mapped to a table definition.
    #[error("Failed to introspect table '{table}': {message}")]
    Introspection {
        /// The table being read.
        table: String,
        /// What went wrong.
        message: String,
    },
}

impl From<MigrateError> for dbal_core::Error {
    fn from(error: MigrateError) -> Self {
        match error {
            MigrateError::Core(inner) => inner,
            other => Self::Execution(Box::new(other)),
        }
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
