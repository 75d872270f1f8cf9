//! A mapper bound to one record type

use std::marker::PhantomData;

use super::{Db, Dest};
use crate::db::{Args, Updates};
use crate::error::Result;
use crate::schema::Record;

/// Operations on `R`'s table without spelling out destination shapes.
///
/// Obtained from [`Db::model`].
pub struct ModelDb<'a, R> {
    db: &'a Db,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R: Record> ModelDb<'a, R> {
    pub(crate) fn new(db: &'a Db) -> Self {
        ModelDb {
            db,
            _record: PhantomData,
        }
    }

    /// Every row matching `fragment`.
    pub fn many(&self, fragment: &str, args: &Args) -> Result<Vec<R>> {
        let mut records = Vec::new();
        self.db.select(Dest::Many(&mut records), fragment, args)?;
        Ok(records)
    }

    /// The first row matching `fragment`, or `None` when nothing matches.
    pub fn find(&self, fragment: &str, args: &Args) -> Result<Option<R>> {
        let mut record = R::default();
        match self.db.select(Dest::One(&mut record), fragment, args) {
            Ok(()) => Ok(Some(record)),
            Err(err) if err.is_no_rows() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn insert(&self, record: &mut R) -> Result<()> {
        self.db.insert(record)
    }

    pub fn update(&self, fragment: &str, args: &Args, updates: &Updates) -> Result<u64> {
        self.db.update::<R>(fragment, args, updates)
    }

    pub fn update_record(&self, record: &mut R, updates: &Updates) -> Result<()> {
        self.db.update_record(record, updates)
    }

    pub fn delete(&self, fragment: &str, args: &Args) -> Result<u64> {
        self.db.delete::<R>(fragment, args)
    }

    pub fn delete_record(&self, record: &R) -> Result<u64> {
        self.db.delete_record(record)
    }

    pub fn exists(&self, fragment: &str, args: &Args) -> Result<bool> {
        self.db.exists::<R>(fragment, args)
    }

    pub fn count(&self, fragment: &str, args: &Args) -> Result<i64> {
        self.db.count::<R>(fragment, args)
    }
}
