//! Transaction module - a transaction-scoped handle holding its connection exclusively

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;

use lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use rusqlite::types::Value;
use rusqlite::Connection;

use crate::db::database::{closed_error, misuse, Slot};
use crate::db::handle::{Queryable, Transaction};
use crate::db::{statement, Row};
use crate::models::QueryResult;

type Held = ArcMutexGuard<RawMutex, Slot>;

/// An open `BEGIN ... COMMIT/ROLLBACK` block on a [`SqliteConnection`](crate::SqliteConnection).
///
/// Owns the connection lock from `BEGIN` until it finishes, so no other
/// statement can land inside it.
pub struct SqliteTransaction {
    held: Mutex<Option<Held>>,
    owner: Arc<Mutex<Option<ThreadId>>>,
    in_transaction: Arc<AtomicBool>,
}

impl SqliteTransaction {
    pub(crate) fn new(
        held: Held,
        owner: Arc<Mutex<Option<ThreadId>>>,
        in_transaction: Arc<AtomicBool>,
    ) -> Self {
        SqliteTransaction {
            held: Mutex::new(Some(held)),
            owner,
            in_transaction,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.held.lock().is_none()
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        let held = self.held.lock();
        let guard = (*held).as_ref().ok_or_else(finished_error)?;
        let conn = (**guard).as_ref().ok_or_else(closed_error)?;
        f(conn)
    }

    /// Run `sql` and release the connection, whatever the outcome.
    fn finish(&self, sql: &str, rollback_on_error: bool) -> rusqlite::Result<()> {
        let guard = self.held.lock().take().ok_or_else(finished_error)?;
        let result = match (*guard).as_ref() {
            Some(conn) => conn.execute_batch(sql).inspect_err(|_| {
                if rollback_on_error {
                    // a failed COMMIT can leave the transaction open
                    let _ = conn.execute_batch("ROLLBACK");
                }
            }),
            None => Err(closed_error()),
        };
        *self.owner.lock() = None;
        self.in_transaction.store(false, Ordering::SeqCst);
        drop(guard);
        result
    }
}

fn finished_error() -> rusqlite::Error {
    misuse("transaction has already been committed or rolled back")
}

impl Queryable for SqliteTransaction {
    fn query(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Row>> {
        self.with_conn(|conn| statement::all(conn, sql, params))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> rusqlite::Result<QueryResult> {
        self.with_conn(|conn| statement::run(conn, sql, params))
    }
}

impl Transaction for SqliteTransaction {
    fn commit(&self) -> rusqlite::Result<()> {
        self.finish("COMMIT", true)
    }

    fn rollback(&self) -> rusqlite::Result<()> {
        self.finish("ROLLBACK", false)
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if !self.is_finished() {
            let _ = self.rollback();
        }
    }
}
