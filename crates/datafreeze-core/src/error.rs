use thiserror::Error;

/// Core error type shared across datafreeze crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A name sanitized to an empty identifier.
    #[error("invalid identifier: {0:?} has no letters to build a name from")]
    InvalidIdentifier(String),
    /// A catalog or annotation query failed.
    #[error("metadata read failed: {0}")]
    MetadataRead(String),
    /// Rows for a table could not be fetched or decoded.
    #[error("materialize failed for {table}: {message}")]
    Materialize { table: String, message: String },
    /// The backing store could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn materialize(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Materialize {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by datafreeze crates.
pub type Result<T> = std::result::Result<T, Error>;
