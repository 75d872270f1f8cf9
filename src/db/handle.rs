//! Handle module - the execution capability the mapper is written against

use std::sync::Arc;

use rusqlite::types::Value;

use crate::db::Row;
use crate::models::QueryResult;

/// Issue parameterized statements.
pub trait Queryable: Send + Sync {
    /// Run a statement that returns rows.
    fn query(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Row>>;

    /// Run a statement that does not return rows.
    fn execute(&self, sql: &str, params: &[Value]) -> rusqlite::Result<QueryResult>;
}

/// A root connection that can open transactions.
pub trait Connection: Queryable {
    fn begin(&self) -> rusqlite::Result<Arc<dyn Transaction>>;

    /// Release the underlying connection. Later statements fail.
    fn close(&self) -> rusqlite::Result<()>;
}

/// A transaction-scoped handle.
///
/// Not safe for concurrent statement issuance from independent tasks.
pub trait Transaction: Queryable {
    fn commit(&self) -> rusqlite::Result<()>;
    fn rollback(&self) -> rusqlite::Result<()>;
}

/// The handle a mapper currently issues statements through.
#[derive(Clone)]
pub enum Handle {
    Connection(Arc<dyn Connection>),
    Transaction(Arc<dyn Transaction>),
}

impl Handle {
    pub fn is_transaction(&self) -> bool {
        matches!(self, Handle::Transaction(_))
    }

    pub fn query(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Row>> {
        tracing::debug!(sql, binds = params.len(), tx = self.is_transaction(), "query");
        match self {
            Handle::Connection(conn) => conn.query(sql, params),
            Handle::Transaction(tx) => tx.query(sql, params),
        }
    }

    pub fn execute(&self, sql: &str, params: &[Value]) -> rusqlite::Result<QueryResult> {
        tracing::debug!(sql, binds = params.len(), tx = self.is_transaction(), "execute");
        match self {
            Handle::Connection(conn) => conn.execute(sql, params),
            Handle::Transaction(tx) => tx.execute(sql, params),
        }
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handle::Connection(_) => write!(f, "Handle::Connection"),
            Handle::Transaction(_) => write!(f, "Handle::Transaction"),
        }
    }
}
