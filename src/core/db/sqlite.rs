/// SQLite Backend
///
/// File-backed SQLite through rusqlite. Used for local development and the
/// test-suite; behaves like the PostgreSQL backend with respect to
/// connection lifetime, commit rules and foreign keys.

use super::connection::{Backend, Dialect};
use super::query::{QueryMode, QueryResult};
use super::value::{date_to_text, timestamp_to_text, Value};
use crate::core::{Result, StorekeeperError};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, ErrorCode, Statement};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteBackend {
    /// `busy_timeout` bounds how long opening waits on a locked database.
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        SqliteBackend {
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(|e| {
            StorekeeperError::ConnectionFailed(format!("{}: {}", self.path.display(), e))
        })?;
        conn.busy_timeout(self.busy_timeout).map_err(connection_failed)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(connection_failed)?;
        Ok(conn)
    }
}

impl Backend for SqliteBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn describe(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    fn ping(&self) -> Result<()> {
        let conn = self.open()?;
        // Opening is lazy; reading the catalog proves the file is a database.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(connection_failed)?;
        conn.close().map_err(|(_, e)| connection_failed(e))
    }

    fn execute(&self, sql: &str, params: &[Value], mode: QueryMode) -> Result<QueryResult> {
        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(classify)?;

        let mut result = {
            let mut stmt = tx.prepare(sql).map_err(classify)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let column_count = stmt.column_count();

            bind_numbered(&mut stmt, params)?;
            let mut rows = stmt.raw_query();
            let mut collected = Vec::new();
            while let Some(row) = rows.next().map_err(classify)? {
                if mode == QueryMode::Fetch {
                    let mut values = Vec::with_capacity(column_count);
                    for i in 0..column_count {
                        values.push(from_value_ref(row.get_ref(i).map_err(classify)?));
                    }
                    collected.push(values);
                }
            }
            QueryResult::new(columns, collected)
        };

        match mode {
            // Dropping the transaction rolls it back.
            QueryMode::Fetch => Ok(result),
            QueryMode::Write => {
                result.rows_affected = tx.changes() as u64;
                tx.commit().map_err(classify)?;
                debug!(path = %self.path.display(), rows_affected = result.rows_affected, "committed");
                Ok(result)
            }
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Date(d) => ToSqlOutput::Owned(SqlValue::Text(date_to_text(d))),
            Value::Timestamp(ts) => ToSqlOutput::Owned(SqlValue::Text(timestamp_to_text(ts))),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// Binds `params[i]` to the placeholder named `$<i + 1>`.
///
/// SQLite numbers `$NNN` parameters by first appearance rather than by the
/// digits, so they are looked up by name.
fn bind_numbered(stmt: &mut Statement<'_>, params: &[Value]) -> Result<()> {
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(StorekeeperError::StatementFailed(format!(
            "statement has {} placeholders but {} parameters were given",
            expected,
            params.len()
        )));
    }

    for (i, value) in params.iter().enumerate() {
        let name = format!("${}", i + 1);
        let index = stmt
            .parameter_index(&name)
            .map_err(classify)?
            .ok_or_else(|| StorekeeperError::StatementFailed(format!("no placeholder {} in statement", name)))?;
        stmt.raw_bind_parameter(index, value).map_err(classify)?;
    }
    Ok(())
}

/// TEXT that is not valid UTF-8 comes back as bytes rather than being altered.
fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Bytes(t.to_vec()),
        },
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

fn connection_failed(e: rusqlite::Error) -> StorekeeperError {
    StorekeeperError::ConnectionFailed(e.to_string())
}

/// Locking and file-level failures are operational; everything else is the
/// statement's fault.
fn classify(e: rusqlite::Error) -> StorekeeperError {
    match e.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure,
        ) => connection_failed(e),
        _ => StorekeeperError::StatementFailed(e.to_string()),
    }
}
