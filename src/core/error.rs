/// Storekeeper Error Module
///
/// This module defines the error taxonomy for every database operation.
/// Failures are logged where they happen and then handed back to the caller
/// as one of these variants, so callers can branch on the kind of failure.
use thiserror::Error;

/// Error type for the storekeeper data-access layer.
///
/// The variants follow the life of a call:
/// - configuration is checked before any I/O
/// - opening the connection can fail (auth, timeout, unreachable host)
/// - the statement itself can be rejected by the database
/// - a fetched row can fail to decode into a typed model
#[derive(Error, Debug)]
pub enum StorekeeperError {
    /// No connection string was configured. Detected before any I/O.
    #[error("Configuration missing: DATABASE_URL is not set")]
    ConfigurationMissing,

    /// The connection string or config file could not be understood
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Transport, authentication or timeout failure talking to the server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The database rejected or failed to run the statement
    #[error("Statement failed: {0}")]
    StatementFailed(String),

    /// A fetched row did not match the shape of the requested model
    #[error("Decode error: {0}")]
    Decode(String),

    /// File system errors while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorekeeperError {
    /// Short, stable label for the variant. Used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            StorekeeperError::ConfigurationMissing => "configuration_missing",
            StorekeeperError::InvalidConfiguration(_) => "invalid_configuration",
            StorekeeperError::ConnectionFailed(_) => "connection_failed",
            StorekeeperError::StatementFailed(_) => "statement_failed",
            StorekeeperError::Decode(_) => "decode",
            StorekeeperError::Io(_) => "io",
        }
    }
}

/// Type alias for Result to use StorekeeperError as the error type.
pub type Result<T> = std::result::Result<T, StorekeeperError>;
