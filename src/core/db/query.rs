/// Query Execution Module
///
/// Runs one statement against a backend and logs the outcome. Failures are
/// reported here, at the operation boundary, then returned to the caller.

use super::connection::Backend;
use super::value::{Row, Value};
use crate::core::Result;
use tracing::{debug, error};

/// Whether a statement is read for its rows or committed for its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Return every row; nothing is committed.
    Fetch,
    /// Commit the statement; report the affected row count.
    Write,
}

/// Represents the result of a SQL statement execution
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names, in select order. Filled in fetch mode even when no
    /// row comes back.
    pub columns: Vec<String>,
    /// Fetched rows (empty in write mode)
    pub rows: Vec<Row>,
    /// Number of rows returned
    pub row_count: usize,
    /// Rows changed by a committed write
    pub rows_affected: u64,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
            rows_affected: 0,
        }
    }
}

/// Executes one statement, binding `params` positionally to `$1`, `$2`, ...
///
/// A fresh connection is opened for this call and released before it
/// returns, whatever the outcome.
///
/// # Errors
///
/// `ConnectionFailed` when the database cannot be reached, `StatementFailed`
/// when it rejects the statement. Both are logged before being returned.
pub fn execute_query(
    backend: &dyn Backend,
    sql: &str,
    params: &[Value],
    mode: QueryMode,
) -> Result<QueryResult> {
    let statement = StatementType::from_sql(sql);
    debug!(
        target_db = %backend.describe(),
        ?statement,
        ?mode,
        params = params.len(),
        "executing statement"
    );

    match backend.execute(sql, params, mode) {
        Ok(result) => {
            debug!(
                ?statement,
                rows = result.row_count,
                rows_affected = result.rows_affected,
                "statement finished"
            );
            Ok(result)
        }
        Err(e) => {
            error!(
                target_db = %backend.describe(),
                ?statement,
                error_kind = e.kind(),
                "Error executing query: {}",
                e
            );
            Err(e)
        }
    }
}

/// Read helper: [`execute_query`] in fetch mode, returning only the rows.
///
/// Zero rows is `Ok(vec![])`; a failure is always an `Err`.
pub fn fetch_data(backend: &dyn Backend, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    execute_query(backend, sql, params, QueryMode::Fetch).map(|result| result.rows)
}

/// Write helper: [`execute_query`] in write mode, returning rows affected.
pub fn insert_update_data(backend: &dyn Backend, sql: &str, params: &[Value]) -> Result<u64> {
    execute_query(backend, sql, params, QueryMode::Write).map(|result| result.rows_affected)
}

/// Represents different SQL statement types, used to label log output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    /// BEGIN/COMMIT/ROLLBACK transaction commands
    Transaction,
    Other,
}

impl StatementType {
    /// Determines the statement type from the leading keyword of a SQL string
    pub fn from_sql(sql: &str) -> Self {
        let sql_upper = sql.trim_start().to_uppercase();
        let keyword = sql_upper
            .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
            .next()
            .unwrap_or("");

        match keyword {
            "SELECT" | "WITH" => StatementType::Select,
            "INSERT" => StatementType::Insert,
            "UPDATE" => StatementType::Update,
            "DELETE" => StatementType::Delete,
            "CREATE" => StatementType::Create,
            "DROP" => StatementType::Drop,
            "ALTER" => StatementType::Alter,
            "BEGIN" | "COMMIT" | "ROLLBACK" => StatementType::Transaction,
            _ => StatementType::Other,
        }
    }
}
