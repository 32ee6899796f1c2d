// Core infrastructure modules
pub mod core;

// Application-facing modules
pub mod database;
pub mod logging;
pub mod models;

pub use crate::core::config::{default_config_path, DATABASE_URL_ENV, DEFAULT_CONNECT_TIMEOUT};
pub use crate::core::db::{Backend, Dialect, QueryMode, QueryResult, Row, StatementType, Value};
pub use crate::core::{load_config, Config, DatabaseConfig, Result, StorekeeperError};
pub use database::Database;
pub use logging::init_logging;
pub use models::{InventoryRecord, Subscriber};
