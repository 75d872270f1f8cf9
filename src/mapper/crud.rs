//! Select, insert, update and delete built from resolved models

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rusqlite::types::{Value, ValueRef};

use super::{column_mut_of, column_of, Db, Dest};
use crate::db::{Args, Row, Updates};
use crate::error::{execution, Error, Result, ShapeError, Stage};
use crate::rewrite::rewrite;
use crate::schema::{field_index, Model, Record, Role};

impl Db {
    /// Select rows of `R`'s table into `dest`.
    ///
    /// `fragment` follows `FROM <table>` and may use `$name` placeholders.
    /// A single-record destination needs at least one row and takes the
    /// first; a collection is replaced by every row returned.
    pub fn select<R: Record>(&self, dest: Dest<'_, R>, fragment: &str, args: &Args) -> Result<()> {
        let model = self.resolve::<R>()?;
        let rewritten = rewrite(fragment, args)?;

        let sql = format!(
            "SELECT {} FROM {} {}",
            model.qualified_columns(),
            model.quoted_table(),
            rewritten.sql
        );
        let rows = self
            .handle
            .query(&sql, &rewritten.args)
            .map_err(execution(Stage::Select))?;

        match dest {
            Dest::One(record) => {
                let row = rows.first().ok_or(Error::NoRows)?;
                *record = scan(&model, row)?;
            }
            Dest::Boxed(record) => {
                let row = rows.first().ok_or(Error::NoRows)?;
                **record = scan(&model, row)?;
            }
            Dest::Many(records) => {
                *records = rows
                    .iter()
                    .map(|row| scan(&model, row))
                    .collect::<Result<Vec<R>>>()?;
            }
            Dest::ManyBoxed(records) => {
                *records = rows
                    .iter()
                    .map(|row| scan(&model, row).map(Box::new))
                    .collect::<Result<Vec<Box<R>>>>()?;
            }
        }

        Ok(())
    }

    /// Insert `record` and assign its generated id.
    ///
    /// `created_at` and `updated_at` fields are set to the current time
    /// before the statement runs, so they stay set even if it fails. A zero
    /// id is bound as NULL so SQLite generates one.
    pub fn insert<R: Record>(&self, record: &mut R) -> Result<()> {
        let model = self.resolve::<R>()?;

        let now = self.clock().now();
        for mapping in [model.created_at(), model.updated_at()].into_iter().flatten() {
            column_mut_of(record, mapping)?.touch(now);
        }

        let mut columns = Vec::with_capacity(model.fields.len());
        let mut values = Vec::with_capacity(model.fields.len());
        for mapping in &model.fields {
            let mut value = column_of(record, mapping)?
                .to_value()
                .map_err(execution(Stage::Insert))?;
            if mapping.role == Role::Id && value == Value::Integer(0) {
                value = Value::Null;
            }
            columns.push(format!("`{}`", mapping.column));
            values.push(value);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            model.quoted_table(),
            columns.join(", "),
            vec!["?"; values.len()].join(", ")
        );
        let result = self
            .handle
            .execute(&sql, &values)
            .map_err(execution(Stage::Insert))?;

        if let Some(id) = model.id() {
            column_mut_of(record, id)?.set_generated_id(result.last_insert_rowid);
        }

        Ok(())
    }

    /// Update rows of `R`'s table matched by `fragment`.
    ///
    /// `updates` is keyed by field name; keys that name no mapped column are
    /// skipped. Returns the number of rows changed.
    pub fn update<R: Record>(&self, fragment: &str, args: &Args, updates: &Updates) -> Result<u64> {
        let model = self.resolve::<R>()?;
        if updates.is_empty() {
            return Err(ShapeError::NoUpdates.into());
        }

        let (updates, _) = self.stamp_updates::<R>(&model, updates)?;
        let (set_clause, mut values) = set_clause(&model, &updates);
        if values.is_empty() {
            return Err(ShapeError::NoUpdates.into());
        }

        let rewritten = rewrite(fragment, args)?;
        values.extend(rewritten.args);

        let sql = format!(
            "UPDATE {} SET {} {}",
            model.quoted_table(), set_clause, rewritten.sql
        );
        let result = self
            .handle
            .execute(&sql, &values)
            .map_err(execution(Stage::Update))?;

        Ok(result.changes)
    }

    /// Update one record by id and copy the new values onto it.
    ///
    /// Every key must name a mapped field. `updated_at`, when present, is
    /// set to the current time whatever `updates` says about it.
    pub fn update_record<R: Record>(&self, record: &mut R, updates: &Updates) -> Result<()> {
        let model = self.resolve::<R>()?;
        if updates.is_empty() {
            return Err(ShapeError::NoUpdates.into());
        }
        let id = model.id().ok_or(ShapeError::NoIdColumn(R::NAME))?;

        for field in updates.keys() {
            match field_index::<R>(field) {
                None => {
                    return Err(ShapeError::UnknownField {
                        record: R::NAME,
                        field: field.clone(),
                    }
                    .into())
                }
                Some(index) if R::FIELDS[index].is_ignored() => {
                    return Err(ShapeError::IgnoredField {
                        record: R::NAME,
                        field: field.clone(),
                    }
                    .into())
                }
                Some(_) => {}
            }
        }

        let (updates, now) = self.stamp_updates::<R>(&model, updates)?;

        // convert on a scratch record first so write-back cannot fail half way
        let mut scratch = R::default();
        assign(&model, &mut scratch, &updates)?;

        let (set_clause, mut values) = set_clause(&model, &updates);
        values.push(
            column_of(record, id)?
                .to_value()
                .map_err(execution(Stage::Update))?,
        );

        let sql = format!(
            "UPDATE {} SET {} WHERE `{}` = ?",
            model.quoted_table(), set_clause, id.column
        );
        self.handle
            .execute(&sql, &values)
            .map_err(execution(Stage::Update))?;

        assign(&model, record, &updates)?;
        if let (Some(updated_at), Some(now)) = (model.updated_at(), now) {
            column_mut_of(record, updated_at)?.touch(now);
        }

        Ok(())
    }

    /// Delete rows of `R`'s table matched by `fragment`. Returns the number
    /// of rows removed.
    pub fn delete<R: Record>(&self, fragment: &str, args: &Args) -> Result<u64> {
        let model = self.resolve::<R>()?;
        let rewritten = rewrite(fragment, args)?;

        let sql = format!("DELETE FROM {} {}", model.quoted_table(), rewritten.sql);
        let result = self
            .handle
            .execute(&sql, &rewritten.args)
            .map_err(execution(Stage::Delete))?;

        Ok(result.changes)
    }

    /// Delete one record by id.
    pub fn delete_record<R: Record>(&self, record: &R) -> Result<u64> {
        let model = self.resolve::<R>()?;
        let id = model.id().ok_or(ShapeError::NoIdColumn(R::NAME))?;
        let value = column_of(record, id)?
            .to_value()
            .map_err(execution(Stage::Delete))?;

        let sql = format!("DELETE FROM {} WHERE `{}` = ?", model.quoted_table(), id.column);
        let result = self
            .handle
            .execute(&sql, &[value])
            .map_err(execution(Stage::Delete))?;

        Ok(result.changes)
    }

    /// Delete each record by id, in order, inside one transaction.
    ///
    /// Any failure rolls back every deletion already made.
    pub fn delete_records<R: Record>(&self, records: Dest<'_, R>) -> Result<u64> {
        let shape = records.shape();
        let records: Vec<&R> = match records {
            Dest::Many(records) => records.iter().collect(),
            Dest::ManyBoxed(records) => records.iter().map(|record| &**record).collect(),
            Dest::One(_) | Dest::Boxed(_) => {
                return Err(ShapeError::WrongShape {
                    operation: "delete_records",
                    expected: "a collection of records",
                    actual: shape.as_str(),
                }
                .into())
            }
        };

        self.transaction(|tx| {
            let mut deleted = 0;
            for record in &records {
                deleted += tx.delete_record(*record)?;
            }
            Ok(deleted)
        })
    }

    /// Whether any row of `R`'s table matches `fragment`.
    pub fn exists<R: Record>(&self, fragment: &str, args: &Args) -> Result<bool> {
        let model = self.resolve::<R>()?;
        let rewritten = rewrite(fragment, args)?;

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} {})",
            model.quoted_table(), rewritten.sql
        );
        let rows = self
            .handle
            .query(&sql, &rewritten.args)
            .map_err(execution(Stage::Exists))?;

        rows.first()
            .ok_or(Error::NoRows)?
            .get::<bool>(0)
            .map_err(execution(Stage::Scan))
    }

    /// Number of rows of `R`'s table matching `fragment`.
    pub fn count<R: Record>(&self, fragment: &str, args: &Args) -> Result<i64> {
        let model = self.resolve::<R>()?;
        let rewritten = rewrite(fragment, args)?;

        let sql = format!("SELECT COUNT(*) FROM {} {}", model.quoted_table(), rewritten.sql);
        let rows = self
            .handle
            .query(&sql, &rewritten.args)
            .map_err(execution(Stage::Count))?;

        rows.first()
            .ok_or(Error::NoRows)?
            .get::<i64>(0)
            .map_err(execution(Stage::Scan))
    }

    /// Copy `updates` and set the `updated_at` field, if `R` has one, to now.
    ///
    /// Returns the instant used, for writing back onto a record.
    fn stamp_updates<'u, R: Record>(
        &self,
        model: &Model,
        updates: &'u Updates,
    ) -> Result<(Cow<'u, Updates>, Option<DateTime<Utc>>)> {
        let Some(updated_at) = model.updated_at() else {
            return Ok((Cow::Borrowed(updates), None));
        };

        let now = self.clock().now();
        let mut stamped = R::default();
        let column = column_mut_of(&mut stamped, updated_at)?;
        if !column.touch(now) {
            return Err(ShapeError::UnsupportedTimestamp {
                role: Role::UpdatedAt,
                type_name: column.type_name(),
            }
            .into());
        }
        let value = column.to_value().map_err(execution(Stage::Update))?;

        let mut stamped = updates.clone();
        stamped.insert(updated_at.field.to_string(), value);
        Ok((Cow::Owned(stamped), Some(now)))
    }
}

/// `` `col` = ?, ... `` for every mapped field present in `updates`, in
/// mapping order, with the matching values.
fn set_clause(model: &Model, updates: &Updates) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for mapping in &model.fields {
        if let Some(value) = updates.get(mapping.field) {
            clauses.push(format!("`{}` = ?", mapping.column));
            values.push(value.clone());
        }
    }

    (clauses.join(", "), values)
}

/// Assign every mapped field named in `updates` on `record`.
fn assign<R: Record>(model: &Model, record: &mut R, updates: &Updates) -> Result<()> {
    for mapping in &model.fields {
        if let Some(value) = updates.get(mapping.field) {
            column_mut_of(record, mapping)?
                .set_value(ValueRef::from(value))
                .map_err(|source| ShapeError::Conversion {
                    field: mapping.field.to_string(),
                    source,
                })?;
        }
    }
    Ok(())
}

/// Materialize one row into a fresh record. Columns arrive in mapping order.
fn scan<R: Record>(model: &Model, row: &Row) -> Result<R> {
    let mut record = R::default();

    for (position, mapping) in model.fields.iter().enumerate() {
        let value = row
            .value(position)
            .ok_or(rusqlite::Error::InvalidColumnIndex(position))
            .map_err(execution(Stage::Scan))?;
        let value = ValueRef::from(value);

        column_mut_of(&mut record, mapping)?
            .set_value(value)
            .map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(position, value.data_type(), Box::new(err))
            })
            .map_err(execution(Stage::Scan))?;
    }

    Ok(record)
}
