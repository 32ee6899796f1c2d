/// Schema Provisioning Module
///
/// The two tables the bot depends on. Table and column names are a contract
/// with the rest of the application and must not change.

use super::connection::{Backend, Dialect};
use super::query::{execute_query, fetch_data, QueryMode};
use super::value::Value;
use crate::core::Result;
use tracing::info;

pub const SUBSCRIBER_STORE_TABLE: &str = "subscriber_store";
pub const INVENTORY_RECORD_TABLE: &str = "inventory_record";

const POSTGRES_SUBSCRIBER_STORE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS subscriber_store (
    telegram_id BIGINT PRIMARY KEY,
    store_name VARCHAR(255) NOT NULL,
    expiration_date DATE,
    is_admin BOOLEAN DEFAULT FALSE
)"#;

const POSTGRES_INVENTORY_RECORD_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS inventory_record (
    id SERIAL PRIMARY KEY,
    telegram_id BIGINT REFERENCES subscriber_store(telegram_id),
    product_name VARCHAR(255) NOT NULL,
    quantity INT NOT NULL,
    recorded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

const SQLITE_SUBSCRIBER_STORE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS subscriber_store (
    telegram_id INTEGER PRIMARY KEY,
    store_name TEXT NOT NULL,
    expiration_date DATE,
    is_admin BOOLEAN DEFAULT FALSE
)"#;

const SQLITE_INVENTORY_RECORD_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS inventory_record (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id INTEGER REFERENCES subscriber_store(telegram_id),
    product_name TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    recorded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

/// Both contract tables, in creation order.
pub fn table_names() -> [&'static str; 2] {
    [SUBSCRIBER_STORE_TABLE, INVENTORY_RECORD_TABLE]
}

/// `CREATE TABLE IF NOT EXISTS` statements for `dialect`, subscriber store
/// first because inventory records reference it.
pub fn initial_table_statements(dialect: Dialect) -> [&'static str; 2] {
    match dialect {
        Dialect::Postgres => [POSTGRES_SUBSCRIBER_STORE_SQL, POSTGRES_INVENTORY_RECORD_SQL],
        Dialect::Sqlite => [SQLITE_SUBSCRIBER_STORE_SQL, SQLITE_INVENTORY_RECORD_SQL],
    }
}

/// Creates the contract tables if they do not exist yet.
///
/// Safe to run repeatedly. Existing tables are left as they are, even if
/// their shape differs. Stops at the first statement that fails.
pub fn create_initial_tables(backend: &dyn Backend) -> Result<()> {
    for (table, sql) in table_names()
        .into_iter()
        .zip(initial_table_statements(backend.dialect()))
    {
        execute_query(backend, sql, &[], QueryMode::Write)?;
        info!(table, target_db = %backend.describe(), "table ensured");
    }
    Ok(())
}

/// Contract tables that are not present in the database.
pub fn missing_tables(backend: &dyn Backend) -> Result<Vec<&'static str>> {
    let sql = match backend.dialect() {
        Dialect::Postgres => {
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1"
        }
        Dialect::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table' AND name = $1",
    };

    let mut missing = Vec::new();
    for table in table_names() {
        if fetch_data(backend, sql, &[Value::from(table)])?.is_empty() {
            missing.push(table);
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::sqlite::SqliteBackend;
    use std::time::Duration;
    use tempfile::TempDir;

    fn table_sql(backend: &SqliteBackend) -> Vec<Vec<Value>> {
        fetch_data(
            backend,
            "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_statement_order_respects_foreign_key() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let [first, second] = initial_table_statements(dialect);
            assert!(first.contains("CREATE TABLE IF NOT EXISTS subscriber_store"));
            assert!(second.contains("CREATE TABLE IF NOT EXISTS inventory_record"));
            assert!(second.contains("REFERENCES subscriber_store(telegram_id)"));
        }
    }

    #[test]
    fn test_postgres_ddl_types() {
        let [subscribers, inventory] = initial_table_statements(Dialect::Postgres);
        assert!(subscribers.contains("telegram_id BIGINT PRIMARY KEY"));
        assert!(subscribers.contains("is_admin BOOLEAN DEFAULT FALSE"));
        assert!(inventory.contains("id SERIAL PRIMARY KEY"));
        assert!(inventory.contains("recorded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn test_create_initial_tables_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("schema.db"), Duration::from_secs(1));

        assert_eq!(missing_tables(&backend).unwrap(), table_names().to_vec());

        create_initial_tables(&backend).unwrap();
        let first = table_sql(&backend);
        assert_eq!(first.len(), 2);

        create_initial_tables(&backend).unwrap();
        assert_eq!(table_sql(&backend), first);
        assert!(missing_tables(&backend).unwrap().is_empty());
    }

    #[test]
    fn test_existing_table_is_not_altered() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteBackend::new(dir.path().join("legacy.db"), Duration::from_secs(1));
        execute_query(
            &backend,
            "CREATE TABLE subscriber_store (telegram_id INTEGER PRIMARY KEY)",
            &[],
            QueryMode::Write,
        )
        .unwrap();

        create_initial_tables(&backend).unwrap();

        let rows = fetch_data(
            &backend,
            "SELECT sql FROM sqlite_master WHERE name = $1",
            &[Value::from(SUBSCRIBER_STORE_TABLE)],
        )
        .unwrap();
        let sql = rows[0][0].as_str().unwrap();
        assert!(!sql.contains("store_name"));
    }
}
