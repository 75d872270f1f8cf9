use std::fmt;

use rusqlite::types::FromSqlError;
use rusqlite::Error as SqliteError;

use crate::schema::Role;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the mapper.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `$name` placeholder had no value in the argument bag.
    #[error("missing argument for named parameter: {0}")]
    MissingParameter(String),

    #[error("invalid destination: {0}")]
    InvalidShape(#[from] ShapeError),

    /// The execution handle reported a failure during `stage`.
    #[error("failed to {stage}: {source}")]
    Execution {
        stage: Stage,
        #[source]
        source: SqliteError,
    },

    /// `transaction` was called on a mapper that is already transaction-scoped.
    #[error("nested transactions are not supported")]
    NestedTransaction,

    /// `close` was called on a transaction-scoped mapper.
    #[error("cannot close a transaction-scoped mapper")]
    CloseInTransaction,

    /// A value passed to `try_args!` cannot be bound.
    #[error("cannot bind argument `{name}`: {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: SqliteError,
    },

    /// A single-record select matched nothing.
    #[error("no rows in result set")]
    NoRows,
}

impl Error {
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Error::NoRows)
    }
}

/// Destination and model problems detected before a statement is issued.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("{operation} expects {expected}, got {actual}")]
    WrongShape {
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("record `{0}` does not have an id column")]
    NoIdColumn(&'static str),

    #[error("no updates provided")]
    NoUpdates,

    #[error("cannot update missing field `{field}` on `{record}`")]
    UnknownField { record: &'static str, field: String },

    #[error("cannot update ignored field `{field}` on `{record}`")]
    IgnoredField { record: &'static str, field: String },

    #[error("unsupported {role} field type: {type_name}")]
    UnsupportedTimestamp {
        role: Role,
        type_name: &'static str,
    },

    #[error("ambiguous {role} column on `{record}`: both `{first}` and `{second}` claim it")]
    AmbiguousRole {
        record: &'static str,
        role: Role,
        first: &'static str,
        second: &'static str,
    },

    #[error("cannot assign value to field `{field}`: {source}")]
    Conversion {
        field: String,
        #[source]
        source: FromSqlError,
    },
}

/// The operation that was running when the execution handle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Select,
    Insert,
    Update,
    Delete,
    Query,
    Exec,
    Count,
    Exists,
    Scan,
    Begin,
    Commit,
    Rollback,
    Close,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Select => "execute select",
            Stage::Insert => "execute insert",
            Stage::Update => "execute update",
            Stage::Delete => "execute delete",
            Stage::Query => "execute query",
            Stage::Exec => "execute statement",
            Stage::Count => "execute count",
            Stage::Exists => "execute exists",
            Stage::Scan => "scan row",
            Stage::Begin => "begin transaction",
            Stage::Commit => "commit transaction",
            Stage::Rollback => "rollback transaction",
            Stage::Close => "close connection",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a driver error with the stage that produced it.
pub fn execution(stage: Stage) -> impl FnOnce(SqliteError) -> Error {
    move |source| Error::Execution { stage, source }
}
