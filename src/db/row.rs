//! Row module - materialized result rows and their JSON view

use std::sync::Arc;

use base64::Engine;
use rusqlite::types::{FromSql, FromSqlError, Value, ValueRef};
use serde_json::{Map, Number};

/// One result row, detached from the statement that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Row { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Decode column `index` as `T`.
    pub fn get<T: FromSql>(&self, index: usize) -> rusqlite::Result<T> {
        let value = self
            .values
            .get(index)
            .ok_or(rusqlite::Error::InvalidColumnIndex(index))?;
        T::column_result(ValueRef::from(value)).map_err(|err| match err {
            FromSqlError::InvalidType => rusqlite::Error::InvalidColumnType(
                index,
                self.columns[index].clone(),
                ValueRef::from(value).data_type(),
            ),
            other => rusqlite::Error::FromSqlConversionFailure(
                index,
                ValueRef::from(value).data_type(),
                Box::new(other),
            ),
        })
    }

    /// Decode the column called `name` as `T`.
    pub fn get_by_name<T: FromSql>(&self, name: &str) -> rusqlite::Result<T> {
        let index = self
            .columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| rusqlite::Error::InvalidColumnName(name.to_string()))?;
        self.get(index)
    }

    /// Render the row as a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = Map::new();
        for (name, value) in self.columns.iter().zip(&self.values) {
            map.insert(name.clone(), sqlite_to_json(value));
        }
        serde_json::Value::Object(map)
    }
}

/// Convert a SQLite value to JSON with proper type handling
///
/// Blobs are rendered as standard base64 text.
pub fn sqlite_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Real(f) => {
            serde_json::Value::Number(Number::from_f64(*f).unwrap_or(Number::from(0)))
        }
        Value::Text(t) => serde_json::Value::String(t.clone()),
        Value::Blob(b) => {
            serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
        }
    }
}

/// Read every column of a live rusqlite row into owned values.
pub(crate) fn read_values(row: &rusqlite::Row<'_>, count: usize) -> rusqlite::Result<Vec<Value>> {
    (0..count)
        .map(|i| row.get_ref(i).map(Value::from))
        .collect()
}
