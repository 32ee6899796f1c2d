/// Database Module
///
/// The data-access layer, split into focused submodules:
/// - **Connection Management** (`connection.rs`): the `Backend` seam and
///   backend selection from the connection string
/// - **Backends** (`postgres.rs`, `sqlite.rs`): one connection per call
/// - **Query Execution** (`query.rs`): run one statement, log the outcome
/// - **Schema Provisioning** (`schema.rs`): the two contract tables
/// - **Values** (`value.rs`): parameters and fetched cells
///
/// ## Error Handling
///
/// All database operations return the `StorekeeperError` taxonomy.
pub mod connection;
pub mod postgres;
pub mod query;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use connection::*;
pub use query::*;
pub use schema::*;
pub use value::*;
