//! The `Database` handle: what the rest of the bot talks to.
use crate::core::db::{self, Backend, QueryMode, QueryResult, Row, Value};
use crate::core::{DatabaseConfig, Result};
use std::fmt;
use tracing::{error, info};

/// Entry point for every database operation.
///
/// Holds the immutable configuration; each method opens its own connection
/// and releases it before returning. There is no pooling.
///
/// ```no_run
/// use storekeeper::{Database, DatabaseConfig, Value};
///
/// let db = Database::new(DatabaseConfig::from_env());
/// db.check_connectivity()?;
/// db.insert_update_data(
///     "INSERT INTO subscriber_store (telegram_id, store_name) VALUES ($1, $2)",
///     &[Value::from(42_i64), Value::from("Corner Shop")],
/// )?;
/// let rows = db.fetch_data("SELECT store_name FROM subscriber_store WHERE telegram_id = $1", &[42_i64.into()])?;
/// # Ok::<(), storekeeper::StorekeeperError>(())
/// ```
pub struct Database {
    config: DatabaseConfig,
    backend: Option<Box<dyn Backend>>,
}

impl Database {
    /// Handle whose backend is chosen from the connection string on each call.
    pub fn new(config: DatabaseConfig) -> Self {
        Database {
            config,
            backend: None,
        }
    }

    /// Reads `DATABASE_URL` once, now.
    pub fn from_env() -> Self {
        Self::new(DatabaseConfig::from_env())
    }

    /// Handle over an explicit backend, e.g. a fake in tests.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Database {
            config: DatabaseConfig::unset(),
            backend: Some(backend),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Opens a connection within the bounded wait and closes it straight away.
    ///
    /// No retries. Without a configured connection string this fails with
    /// `ConfigurationMissing` and performs no I/O.
    pub fn check_connectivity(&self) -> Result<()> {
        self.on_backend("connectivity check", |backend| match backend.ping() {
            Ok(()) => {
                info!(target_db = %backend.describe(), "database reachable");
                Ok(())
            }
            Err(e) => {
                error!(target_db = %backend.describe(), error_kind = e.kind(), "Failed to connect to database: {}", e);
                Err(e)
            }
        })
    }

    /// Boolean form of [`Database::check_connectivity`]. The failure detail
    /// is in the log.
    pub fn is_reachable(&self) -> bool {
        self.check_connectivity().is_ok()
    }

    /// Runs one statement in the given mode. See [`db::execute_query`].
    pub fn execute_query(&self, query: &str, params: &[Value], mode: QueryMode) -> Result<QueryResult> {
        self.on_backend("query", |backend| db::execute_query(backend, query, params, mode))
    }

    /// Every row of a read query. Zero rows is `Ok(vec![])`.
    pub fn fetch_data(&self, query: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.on_backend("query", |backend| db::fetch_data(backend, query, params))
    }

    /// Commits an INSERT/UPDATE/DELETE and returns the rows affected.
    pub fn insert_update_data(&self, query: &str, params: &[Value]) -> Result<u64> {
        self.on_backend("query", |backend| db::insert_update_data(backend, query, params))
    }

    /// Ensures `subscriber_store` and `inventory_record` exist. Never run
    /// implicitly.
    pub fn create_initial_tables(&self) -> Result<()> {
        self.on_backend("schema provisioning", |backend| db::create_initial_tables(backend))
    }

    /// Contract tables not yet present in the database.
    pub fn missing_tables(&self) -> Result<Vec<&'static str>> {
        self.on_backend("schema check", |backend| db::missing_tables(backend))
    }

    /// Resolves the backend and runs `op` on it, logging a failure to
    /// resolve it. Errors from `op` are logged where they occur.
    fn on_backend<T>(&self, operation: &str, op: impl FnOnce(&dyn Backend) -> Result<T>) -> Result<T> {
        if let Some(backend) = &self.backend {
            return op(backend.as_ref());
        }

        let backend = match db::backend_for(&self.config) {
            Ok(backend) => backend,
            Err(e) => {
                error!(operation, error_kind = e.kind(), "Database unavailable: {}", e);
                return Err(e);
            }
        };

        op(backend.as_ref())
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.backend {
            Some(backend) => backend.describe(),
            None => self.config.redacted_url(),
        };
        f.debug_struct("Database").field("target", &target).finish()
    }
}
