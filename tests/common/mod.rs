//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlite_map::{record, Clock, Db, NullTime, SqliteConnection};

pub const SCHEMA: &str = "
    CREATE TABLE key_values (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        `key` TEXT NOT NULL UNIQUE,
        value TEXT NOT NULL,
        created_at TEXT,
        updated_at TEXT
    );
    CREATE TABLE notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key_value_id INTEGER NOT NULL REFERENCES key_values(id),
        body TEXT NOT NULL
    );
";

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct MockClock(Arc<Mutex<DateTime<Utc>>>);

impl MockClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        MockClock(Arc::new(Mutex::new(start)))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub struct Fixture {
    pub db: Db,
    pub clock: MockClock,
    pub conn: SqliteConnection,
}

pub fn setup() -> Fixture {
    let conn = SqliteConnection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();

    let clock = MockClock::new(start_time());
    let db = Db::builder(conn.clone()).clock(clock.clone()).build();

    Fixture { db, clock, conn }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyValue {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

record! {
    KeyValue {
        id,
        key,
        value,
        created_at,
        updated_at,
    }
}

pub fn kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: value.to_string(),
        ..Default::default()
    }
}

/// Same table, identity under a different field name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CustomId {
    pub custom_id: i64,
    pub key: String,
    pub value: String,
}

record! {
    CustomId in "key_values" {
        custom_id => "id",
        key,
        value,
    }
}

/// Same table, timestamps that may be NULL.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NullTimeKeyValue {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub created_at: NullTime,
    pub updated_at: NullTime,
}

record! {
    NullTimeKeyValue in "key_values" {
        id,
        key,
        value,
        created_at,
        updated_at,
    }
}

/// Same table, no identity column.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyOnly {
    pub key: String,
    pub value: String,
}

record! {
    KeyOnly in "key_values" {
        key,
        value,
    }
}

/// Same table, unsigned identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UnsignedKeyValue {
    pub id: u64,
    pub key: String,
    pub value: String,
}

record! {
    UnsignedKeyValue in "key_values" {
        id,
        key,
        value,
    }
}

/// Same table, addressed through its schema.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MainKeyValue {
    pub id: i64,
    pub key: String,
    pub value: String,
}

record! {
    MainKeyValue in "main.key_values" {
        id,
        key,
        value,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Note {
    pub id: i64,
    pub key_value_id: i64,
    pub body: String,
}

record! {
    Note {
        id,
        key_value_id,
        body,
    }
}

pub fn insert_kv(db: &Db, key: &str, value: &str) -> KeyValue {
    let mut record = kv(key, value);
    db.insert(&mut record).unwrap();
    record
}
