/// Connection Management Module
///
/// Every operation opens its own connection, uses it for exactly one
/// statement, and drops it before returning. That policy lives behind the
/// [`Backend`] trait so a pooled implementation can replace it without
/// touching call sites.

use super::query::{QueryMode, QueryResult};
use super::value::Value;
use crate::core::{DatabaseConfig, Result, StorekeeperError};

/// SQL flavour spoken by a backend. Selects the provisioning DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

/// A database reachable through one connection per call.
pub trait Backend: Send + Sync {
    /// SQL flavour of the target.
    fn dialect(&self) -> Dialect;

    /// Human-readable target with credentials masked.
    fn describe(&self) -> String;

    /// Opens a connection within the bounded wait and closes it again.
    fn ping(&self) -> Result<()>;

    /// Opens a connection, runs `sql` with `params` bound positionally, and
    /// releases the connection on every path.
    ///
    /// In [`QueryMode::Fetch`] all rows are returned and nothing is committed.
    /// In [`QueryMode::Write`] the statement is committed and the affected row
    /// count is reported.
    fn execute(&self, sql: &str, params: &[Value], mode: QueryMode) -> Result<QueryResult>;
}

/// Picks the backend for the configured connection string.
///
/// Fails with `ConfigurationMissing` before any I/O when no string is set.
pub fn backend_for(config: &DatabaseConfig) -> Result<Box<dyn Backend>> {
    let url = config.connection_url()?;

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let backend = super::postgres::PostgresBackend::from_config(config)?;
        return Ok(Box::new(backend));
    }

    if let Some(path) = sqlite_path(url) {
        if path.is_empty() {
            return Err(StorekeeperError::InvalidConfiguration(
                "sqlite connection string has no path".to_string(),
            ));
        }
        let backend = super::sqlite::SqliteBackend::new(path, config.connect_timeout());
        return Ok(Box::new(backend));
    }

    Err(StorekeeperError::InvalidConfiguration(format!(
        "unsupported connection string scheme: {}",
        config.redacted_url()
    )))
}

/// `sqlite:///abs/path.db`, `sqlite://rel.db` and `sqlite:rel.db` all name a file.
fn sqlite_path(url: &str) -> Option<&str> {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
}
