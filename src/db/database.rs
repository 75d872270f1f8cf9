//! Database module - a rusqlite connection exposed as a mapper execution handle

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, MutexGuard};
use rusqlite::types::Value;

use crate::config::SqliteOptions;
use crate::db::handle::{Connection, Queryable, Transaction};
use crate::db::{statement, Row, SqliteTransaction};
use crate::models::QueryResult;

/// Slot holding the driver connection; `None` once closed.
pub(crate) type Slot = Option<rusqlite::Connection>;

/// SQLite connection shared behind a mutex.
///
/// Clones share the same underlying connection. An open transaction holds
/// the connection exclusively until it commits or rolls back: statements and
/// `begin` calls from other threads wait for it, and a statement issued on
/// the root handle by the thread that owns the transaction fails instead of
/// deadlocking.
#[derive(Clone)]
pub struct SqliteConnection {
    conn: Arc<Mutex<Slot>>,
    owner: Arc<Mutex<Option<ThreadId>>>,
    in_transaction: Arc<AtomicBool>,
    options: SqliteOptions,
}

impl SqliteConnection {
    /// Open a database file, or `":memory:"` for a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        Self::open_with(path, SqliteOptions::default())
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::open_with(":memory:", SqliteOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: SqliteOptions) -> rusqlite::Result<Self> {
        let path = path.as_ref();
        let in_memory = path == Path::new(":memory:");
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(path)?
        };

        conn.execute_batch(&options.pragmas(in_memory))?;

        Ok(SqliteConnection {
            conn: Arc::new(Mutex::new(Some(conn))),
            owner: Arc::new(Mutex::new(None)),
            in_transaction: Arc::new(AtomicBool::new(false)),
            options,
        })
    }

    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.lock().map(|slot| slot.is_none()).unwrap_or(false)
    }

    /// Run one or more statements without parameters, e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> rusqlite::Result<()> {
        self.with_conn(|conn| conn.execute_batch(sql))
    }

    /// Close the connection for every clone sharing it.
    ///
    /// Waits for a transaction open on another thread. Closing twice is a
    /// no-op; statements issued afterwards fail with `SQLITE_MISUSE`.
    pub fn close(&self) -> rusqlite::Result<()> {
        let mut slot = self.lock()?;
        match slot.take() {
            Some(conn) => conn.close().map_err(|(conn, err)| {
                *slot = Some(conn);
                err
            }),
            None => Ok(()),
        }
    }

    fn lock(&self) -> rusqlite::Result<MutexGuard<'_, Slot>> {
        if *self.owner.lock() == Some(thread::current().id()) {
            return Err(misuse(
                "statement issued on the root connection while this thread holds its open transaction",
            ));
        }
        Ok(self.conn.lock())
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        let slot = self.lock()?;
        let conn = (*slot).as_ref().ok_or_else(closed_error)?;
        f(conn)
    }
}

pub(crate) fn misuse(message: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
        Some(message.to_string()),
    )
}

pub(crate) fn closed_error() -> rusqlite::Error {
    misuse("connection is closed")
}

impl Queryable for SqliteConnection {
    fn query(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Row>> {
        self.with_conn(|conn| statement::all(conn, sql, params))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> rusqlite::Result<QueryResult> {
        self.with_conn(|conn| statement::run(conn, sql, params))
    }
}

impl Connection for SqliteConnection {
    /// Waits for any transaction opened from another thread to finish.
    fn begin(&self) -> rusqlite::Result<Arc<dyn Transaction>> {
        if *self.owner.lock() == Some(thread::current().id()) {
            return Err(misuse("this thread already holds an open transaction"));
        }

        let held = self.conn.lock_arc();
        match (*held).as_ref() {
            Some(conn) => {
                conn.execute_batch(&format!("BEGIN {}", self.options.transaction_mode.as_str()))?
            }
            None => return Err(closed_error()),
        }
        *self.owner.lock() = Some(thread::current().id());
        self.in_transaction.store(true, Ordering::SeqCst);

        Ok(Arc::new(SqliteTransaction::new(
            held,
            self.owner.clone(),
            self.in_transaction.clone(),
        )))
    }

    fn close(&self) -> rusqlite::Result<()> {
        SqliteConnection::close(self)
    }
}
