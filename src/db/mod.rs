//! Database module - execution handles the mapper issues statements through

mod database;
pub(crate) mod handle;
pub(crate) mod params;
mod row;
mod statement;
mod transaction;

pub use database::SqliteConnection;
pub use handle::{Connection, Handle, Queryable, Transaction};
pub use params::{
    args_from_json, convert_single_param, Args, ToValue, TryToValue, Updates, TIMESTAMP_FORMAT,
};
pub use row::{sqlite_to_json, Row};
pub use transaction::SqliteTransaction;
