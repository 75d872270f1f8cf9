//! Mapper and connection configuration

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::schema::{BasicPluralizer, Pluralizer};

/// Naming and time collaborators, scoped to one mapper and shared with
/// the transaction-scoped mappers it creates.
#[derive(Clone)]
pub struct Config {
    pub pluralizer: Arc<dyn Pluralizer>,
    pub clock: Arc<dyn Clock>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pluralizer: Arc::new(BasicPluralizer),
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config").finish_non_exhaustive()
    }
}

/// How `BEGIN` acquires locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    #[default]
    Deferred,
    Immediate,
    Exclusive,
}

impl TransactionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMode::Deferred => "DEFERRED",
            TransactionMode::Immediate => "IMMEDIATE",
            TransactionMode::Exclusive => "EXCLUSIVE",
        }
    }
}

/// Options applied when opening a [`SqliteConnection`](crate::SqliteConnection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    pub transaction_mode: TransactionMode,
    pub foreign_keys: bool,
    /// Use write-ahead logging. Ignored for in-memory databases.
    pub journal_wal: bool,
    /// Page cache size in KiB.
    pub cache_size_kib: u32,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        SqliteOptions {
            transaction_mode: TransactionMode::Deferred,
            foreign_keys: true,
            journal_wal: true,
            cache_size_kib: 64_000,
        }
    }
}

impl SqliteOptions {
    pub(crate) fn pragmas(&self, in_memory: bool) -> String {
        let mut pragmas = String::from("PRAGMA extended_result_codes = ON;\n");
        if self.journal_wal && !in_memory {
            pragmas.push_str("PRAGMA journal_mode = WAL;\nPRAGMA synchronous = NORMAL;\n");
        }
        pragmas.push_str(&format!("PRAGMA cache_size = -{};\n", self.cache_size_kib));
        pragmas.push_str("PRAGMA temp_store = MEMORY;\n");
        pragmas.push_str(&format!(
            "PRAGMA foreign_keys = {};",
            if self.foreign_keys { "ON" } else { "OFF" }
        ));
        pragmas
    }
}
