//! Transaction coordinator

use std::panic::{self, AssertUnwindSafe};

use super::Db;
use crate::db::Handle;
use crate::error::{execution, Error, Stage};

impl Db {
    /// Run `body` inside a transaction.
    ///
    /// `body` receives a mapper scoped to the transaction that shares this
    /// mapper's model cache and config. The transaction commits when `body`
    /// returns `Ok` and rolls back when it returns `Err` or panics. A body
    /// error is returned as is, even when the rollback also fails. A panic
    /// resumes once the rollback has run.
    ///
    /// Fails with [`Error::NestedTransaction`] on a mapper that is already
    /// transaction-scoped, without calling `body`.
    pub fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        E: From<Error>,
        F: FnOnce(&Db) -> Result<T, E>,
    {
        let conn = match &self.handle {
            Handle::Connection(conn) => conn,
            Handle::Transaction(_) => return Err(Error::NestedTransaction.into()),
        };

        let tx = conn.begin().map_err(execution(Stage::Begin))?;
        tracing::debug!("transaction started");
        let scoped = self.scoped(Handle::Transaction(tx.clone()));

        match panic::catch_unwind(AssertUnwindSafe(|| body(&scoped))) {
            Ok(Ok(value)) => {
                tx.commit().map_err(execution(Stage::Commit))?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                match tx.rollback() {
                    Ok(()) => tracing::debug!("transaction rolled back"),
                    Err(rollback) => {
                        let rollback = execution(Stage::Rollback)(rollback);
                        tracing::warn!(error = %rollback, "discarding rollback failure after failed body");
                    }
                }
                Err(err)
            }
            Err(fault) => {
                if let Err(rollback) = tx.rollback() {
                    let rollback = execution(Stage::Rollback)(rollback);
                    tracing::warn!(error = %rollback, "rollback after panic failed");
                } else {
                    tracing::debug!("transaction rolled back after panic");
                }
                panic::resume_unwind(fault)
            }
        }
    }
}
