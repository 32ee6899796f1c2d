/// Core Module for storekeeper
///
/// Shared infrastructure for the data-access layer: configuration, the
/// database backends, and error handling.

pub mod config;
pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{load_config, Config, DatabaseConfig};
pub use error::{Result, StorekeeperError};
