//! Statement module - running parameterized SQL on a locked rusqlite connection

use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::db::row::read_values;
use crate::db::Row;
use crate::models::QueryResult;

/// Execute a query and return every row, materialized.
pub(crate) fn all(conn: &Connection, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare_cached(sql)?;

    let column_names: Arc<[String]> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let column_count = column_names.len();

    let mut rows = stmt.query(params_from_iter(params))?;
    let mut results = Vec::new();

    while let Some(row) = rows.next()? {
        results.push(Row::new(column_names.clone(), read_values(row, column_count)?));
    }

    Ok(results)
}

/// Execute a statement and return changes and the last inserted rowid.
pub(crate) fn run(conn: &Connection, sql: &str, params: &[Value]) -> rusqlite::Result<QueryResult> {
    let mut stmt = conn.prepare_cached(sql)?;
    let changes = stmt.execute(params_from_iter(params))?;

    Ok(QueryResult {
        changes: changes as u64,
        last_insert_rowid: conn.last_insert_rowid(),
    })
}
