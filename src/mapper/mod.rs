//! The mapper: named-parameter SQL, CRUD and transactions over an execution handle
//!
//! ```
//! use sqlite_map::{args, record, Db, Dest, SqliteConnection};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! record! { User { id, name } }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = SqliteConnection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")?;
//! let db = Db::new(conn);
//!
//! let mut fox = User { name: "Fox".into(), ..Default::default() };
//! db.insert(&mut fox)?;
//!
//! let mut found = User::default();
//! db.select(Dest::One(&mut found), "WHERE name = $name", &args! { "name" => "Fox" })?;
//! assert_eq!(found.id, fox.id);
//! # Ok(())
//! # }
//! ```

mod crud;
mod shape;
mod transaction;
mod typed;

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::db::{Args, Connection, Handle, Row};
use crate::error::{execution, Error, Result, ShapeError, Stage};
use crate::models::QueryResult;
use crate::rewrite::rewrite;
use crate::schema::{Column, FieldMapping, Model, ModelCache, Pluralizer, Record};

pub use shape::{Dest, Shape};
pub use typed::ModelDb;

/// Maps records onto tables through a connection or an open transaction.
///
/// Cloning is cheap; clones share the handle, model cache and config.
#[derive(Clone, Debug)]
pub struct Db {
    handle: Handle,
    models: ModelCache,
    config: Config,
}

impl Db {
    pub fn new(conn: impl Connection + 'static) -> Self {
        Self::with_config(conn, Config::default())
    }

    pub fn with_config(conn: impl Connection + 'static, config: Config) -> Self {
        Self::from_shared(Arc::new(conn), config)
    }

    pub fn from_shared(conn: Arc<dyn Connection>, config: Config) -> Self {
        Db {
            handle: Handle::Connection(conn),
            models: ModelCache::new(),
            config,
        }
    }

    pub fn builder(conn: impl Connection + 'static) -> DbBuilder {
        DbBuilder {
            conn: Arc::new(conn),
            config: Config::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn is_transaction(&self) -> bool {
        self.handle.is_transaction()
    }

    /// The cached model of `R`, resolved on first use.
    pub fn resolve<R: Record>(&self) -> Result<Arc<Model>> {
        Ok(self
            .models
            .get_or_resolve::<R>(self.config.pluralizer.as_ref())?)
    }

    /// A handle bound to one record type.
    pub fn model<R: Record>(&self) -> ModelDb<'_, R> {
        ModelDb::new(self)
    }

    /// Run raw SQL with named parameters and return its rows.
    pub fn query(&self, sql: &str, args: &Args) -> Result<Vec<Row>> {
        let rewritten = rewrite(sql, args)?;
        self.handle
            .query(&rewritten.sql, &rewritten.args)
            .map_err(execution(Stage::Query))
    }

    /// Run raw SQL with named parameters that returns no rows.
    pub fn exec(&self, sql: &str, args: &Args) -> Result<QueryResult> {
        let rewritten = rewrite(sql, args)?;
        self.handle
            .execute(&rewritten.sql, &rewritten.args)
            .map_err(execution(Stage::Exec))
    }

    /// Close the underlying connection for this mapper and every clone.
    ///
    /// Fails with [`Error::CloseInTransaction`] on a transaction-scoped
    /// mapper.
    pub fn close(&self) -> Result<()> {
        match &self.handle {
            Handle::Connection(conn) => {
                conn.close().map_err(execution(Stage::Close))?;
                tracing::debug!("connection closed");
                Ok(())
            }
            Handle::Transaction(_) => Err(Error::CloseInTransaction),
        }
    }

    fn clock(&self) -> &dyn Clock {
        self.config.clock.as_ref()
    }

    fn scoped(&self, handle: Handle) -> Db {
        Db {
            handle,
            models: self.models.clone(),
            config: self.config.clone(),
        }
    }
}

/// Builds a [`Db`] with custom naming or time collaborators.
pub struct DbBuilder {
    conn: Arc<dyn Connection>,
    config: Config,
}

impl DbBuilder {
    pub fn pluralizer(mut self, pluralizer: impl Pluralizer + 'static) -> Self {
        self.config.pluralizer = Arc::new(pluralizer);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.config.clock = Arc::new(clock);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Db {
        Db::from_shared(self.conn, self.config)
    }
}

fn column_of<'r, R: Record>(record: &'r R, mapping: &FieldMapping) -> Result<&'r dyn Column> {
    record.column(mapping.index).ok_or_else(|| {
        ShapeError::UnknownField {
            record: R::NAME,
            field: mapping.field.to_string(),
        }
        .into()
    })
}

fn column_mut_of<'r, R: Record>(
    record: &'r mut R,
    mapping: &FieldMapping,
) -> Result<&'r mut dyn Column> {
    record.column_mut(mapping.index).ok_or_else(|| {
        ShapeError::UnknownField {
            record: R::NAME,
            field: mapping.field.to_string(),
        }
        .into()
    })
}
