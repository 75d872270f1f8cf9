pub mod clock;
pub mod config;
pub mod db;
mod error;
pub mod mapper;
mod models;
pub mod rewrite;
pub mod schema;

pub use clock::{Clock, SystemClock};
pub use config::{Config, SqliteOptions, TransactionMode};
pub use db::{Args, Row, SqliteConnection, ToValue, TryToValue, Updates};
pub use error::{Error, Result, ShapeError, Stage};
pub use mapper::{Db, DbBuilder, Dest, ModelDb, Shape};
pub use models::QueryResult;
pub use rewrite::{rewrite, Rewritten};
pub use rusqlite::types::Value;
pub use schema::{Column, FieldDef, Model, NullTime, Pluralizer, Record, Role};

pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}
