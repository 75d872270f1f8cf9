use serde::{Deserialize, Serialize};

/// Outcome of a statement that does not return rows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryResult {
    pub changes: u64,
    pub last_insert_rowid: i64,
}

impl QueryResult {
    pub fn rows_affected(&self) -> u64 {
        self.changes
    }

    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_rowid
    }
}
