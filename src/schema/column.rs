//! Per-field value plumbing between record fields and SQLite values

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};

use crate::db::ToValue;

/// A record field that maps onto one column.
///
/// Implemented for the scalar types SQLite stores natively, their `Option`
/// forms, and the timestamp representations. Implement it for your own
/// newtypes to map them.
pub trait Column: Send {
    /// The value bound when this field is written.
    fn to_value(&self) -> rusqlite::Result<Value>;

    /// Assign the field from a result value.
    fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()>;

    /// Set the field to `now`. Returns `false` for non-timestamp types.
    fn touch(&mut self, _now: DateTime<Utc>) -> bool {
        false
    }

    /// Assign a database-generated identity. Returns `false` when the type
    /// cannot hold `id`.
    fn set_generated_id(&mut self, _id: i64) -> bool {
        false
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! plain_column {
    ($($t:ty),* $(,)?) => {
        $(
            impl Column for $t {
                fn to_value(&self) -> rusqlite::Result<Value> {
                    Ok(ToValue::to_value(self))
                }

                fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
                    *self = <$t>::column_result(value)?;
                    Ok(())
                }
            }

            impl Column for Option<$t> {
                fn to_value(&self) -> rusqlite::Result<Value> {
                    Ok(ToValue::to_value(self))
                }

                fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
                    *self = <Option<$t>>::column_result(value)?;
                    Ok(())
                }
            }
        )*
    };
}

plain_column!(f32, f64, bool, String, Vec<u8>);

macro_rules! integer_column {
    ($($t:ty),* $(,)?) => {
        $(
            impl Column for $t {
                fn to_value(&self) -> rusqlite::Result<Value> {
                    let value = i64::try_from(*self)
                        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
                    Ok(Value::Integer(value))
                }

                fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
                    *self = narrow::<$t>(i64::column_result(value)?)?;
                    Ok(())
                }

                fn set_generated_id(&mut self, id: i64) -> bool {
                    match <$t>::try_from(id) {
                        Ok(id) => {
                            *self = id;
                            true
                        }
                        Err(_) => false,
                    }
                }
            }

            impl Column for Option<$t> {
                fn to_value(&self) -> rusqlite::Result<Value> {
                    match self {
                        Some(inner) => Column::to_value(inner),
                        None => Ok(Value::Null),
                    }
                }

                fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
                    *self = <Option<i64>>::column_result(value)?
                        .map(narrow::<$t>)
                        .transpose()?;
                    Ok(())
                }

                fn set_generated_id(&mut self, id: i64) -> bool {
                    match <$t>::try_from(id) {
                        Ok(id) => {
                            *self = Some(id);
                            true
                        }
                        Err(_) => false,
                    }
                }
            }
        )*
    };
}

/// Fit a stored integer into a narrower or unsigned field type.
fn narrow<T: TryFrom<i64>>(value: i64) -> FromSqlResult<T> {
    T::try_from(value).map_err(|_| FromSqlError::OutOfRange(value))
}

integer_column!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Column for DateTime<Utc> {
    fn to_value(&self) -> rusqlite::Result<Value> {
        Ok(ToValue::to_value(self))
    }

    fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
        *self = DateTime::<Utc>::column_result(value)?;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) -> bool {
        *self = now;
        true
    }
}

impl Column for Option<DateTime<Utc>> {
    fn to_value(&self) -> rusqlite::Result<Value> {
        Ok(ToValue::to_value(self))
    }

    fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
        *self = <Option<DateTime<Utc>>>::column_result(value)?;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) -> bool {
        *self = Some(now);
        true
    }
}

impl Column for NaiveDateTime {
    fn to_value(&self) -> rusqlite::Result<Value> {
        Ok(ToValue::to_value(self))
    }

    fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
        *self = NaiveDateTime::column_result(value)?;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) -> bool {
        *self = now.naive_utc();
        true
    }
}

impl Column for Option<NaiveDateTime> {
    fn to_value(&self) -> rusqlite::Result<Value> {
        Ok(ToValue::to_value(self))
    }

    fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
        *self = <Option<NaiveDateTime>>::column_result(value)?;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) -> bool {
        *self = Some(now.naive_utc());
        true
    }
}

/// A timestamp that may be NULL, with validity tracked separately from
/// the time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullTime {
    pub time: DateTime<Utc>,
    pub valid: bool,
}

impl NullTime {
    pub fn new(time: DateTime<Utc>) -> Self {
        NullTime { time, valid: true }
    }

    pub fn null() -> Self {
        NullTime::default()
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        self.valid.then_some(self.time)
    }
}

impl ToValue for NullTime {
    fn to_value(&self) -> Value {
        ToValue::to_value(&self.get())
    }
}

impl Column for NullTime {
    fn to_value(&self) -> rusqlite::Result<Value> {
        Ok(ToValue::to_value(self))
    }

    fn set_value(&mut self, value: ValueRef<'_>) -> FromSqlResult<()> {
        *self = match <Option<DateTime<Utc>>>::column_result(value)? {
            Some(time) => NullTime::new(time),
            None => NullTime::null(),
        };
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) -> bool {
        *self = NullTime::new(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_id_assignment() {
        let mut signed: i32 = 0;
        assert!(signed.set_generated_id(42));
        assert_eq!(signed, 42);

        let mut unsigned: u64 = 7;
        assert!(!unsigned.set_generated_id(-1));
        assert_eq!(unsigned, 7);
        assert!(unsigned.set_generated_id(9));
        assert_eq!(unsigned, 9);

        let mut narrow: u8 = 0;
        assert!(!narrow.set_generated_id(300));

        let mut text = String::new();
        assert!(!text.set_generated_id(1));
    }

    #[test]
    fn test_touch_only_timestamps() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let mut plain = DateTime::<Utc>::default();
        assert!(plain.touch(now));
        assert_eq!(plain, now);

        let mut optional: Option<DateTime<Utc>> = None;
        assert!(optional.touch(now));
        assert_eq!(optional, Some(now));

        let mut null_time = NullTime::null();
        assert!(null_time.touch(now));
        assert_eq!(null_time.get(), Some(now));

        let mut text = String::from("x");
        assert!(!text.touch(now));
        assert_eq!(text, "x");
    }

    #[test]
    fn test_null_time_round_trip() {
        let mut field = NullTime::new(Utc::now());
        field.set_value(ValueRef::Null).unwrap();
        assert!(!field.valid);
        assert_eq!(Column::to_value(&field).unwrap(), Value::Null);

        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let stored = ToValue::to_value(&at);
        field.set_value(ValueRef::from(&stored)).unwrap();
        assert_eq!(field.get(), Some(at));
    }

    #[test]
    fn test_u64_overflow_is_an_error() {
        assert!(Column::to_value(&u64::MAX).is_err());
        assert_eq!(Column::to_value(&5u64).unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_set_value_type_mismatch() {
        let mut n: i64 = 0;
        assert!(n.set_value(ValueRef::Text(b"abc")).is_err());
        assert_eq!(n, 0);

        let mut small: Option<u8> = None;
        assert!(matches!(
            small.set_value(ValueRef::Integer(300)),
            Err(FromSqlError::OutOfRange(300))
        ));
        small.set_value(ValueRef::Integer(7)).unwrap();
        assert_eq!(small, Some(7));
    }
}
