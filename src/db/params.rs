//! Params module - argument bags and conversion of Rust values to SQLite values

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Value;

/// Named arguments for `$name` placeholders.
pub type Args = HashMap<String, Value>;

/// Field name to new value, for `update` and `update_record`.
pub type Updates = HashMap<String, Value>;

/// Text layout used for every timestamp written by this crate.
///
/// rusqlite's chrono `FromSql` reads it back losslessly.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Infallible conversion of a Rust value into a bindable SQLite value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! integer_to_value {
    ($($t:ty),* $(,)?) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Integer(i64::from(*self))
            }
        })*
    };
}

integer_to_value!(i8, i16, i32, i64, u8, u16, u32);

/// Conversion that can fail, for integers wider than SQLite's `INTEGER`.
///
/// Every [`ToValue`] type converts without error. `u64`, `usize` and `isize`
/// only convert when they fit in an `i64`. Used by [`try_args!`](crate::try_args).
pub trait TryToValue {
    fn try_to_value(&self) -> rusqlite::Result<Value>;
}

impl<T: ToValue + ?Sized> TryToValue for T {
    fn try_to_value(&self) -> rusqlite::Result<Value> {
        Ok(self.to_value())
    }
}

macro_rules! checked_integer_to_value {
    ($($t:ty),* $(,)?) => {
        $(impl TryToValue for $t {
            fn try_to_value(&self) -> rusqlite::Result<Value> {
                i64::try_from(*self)
                    .map(Value::Integer)
                    .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
            }
        })*
    };
}

checked_integer_to_value!(u64, usize, isize);

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Text(self.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Text(self.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        convert_single_param(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

/// Convert a single JSON value to a SQLite value
///
/// Arrays and objects are stored as their JSON text.
pub fn convert_single_param(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        compound => Value::Text(compound.to_string()),
    }
}

/// Build an argument bag from a JSON object.
///
/// Returns `None` when `object` is not a JSON object.
pub fn args_from_json(object: &serde_json::Value) -> Option<Args> {
    let map = object.as_object()?;
    Some(
        map.iter()
            .map(|(name, value)| (name.clone(), convert_single_param(value)))
            .collect(),
    )
}

/// Build an [`Args`] (or [`Updates`]) map from `name => value` pairs.
///
/// ```
/// use sqlite_map::args;
///
/// let args = args! { "name" => "Fox", "age" => 32 };
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Args::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::ToValue::to_value(&$value),
            );
        )+
        map
    }};
}

/// Like [`args!`], but also accepts `u64`, `usize` and `isize` values.
///
/// Evaluates to `Result<Args, Error>`; a value that does not fit in an
/// `i64` fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument).
///
/// ```
/// use sqlite_map::{try_args, Error, Value};
///
/// let args = try_args! { "id" => 7u64 }.unwrap();
/// assert_eq!(args["id"], Value::Integer(7));
///
/// let err = try_args! { "id" => u64::MAX }.unwrap_err();
/// assert!(matches!(err, Error::InvalidArgument { .. }));
/// ```
#[macro_export]
macro_rules! try_args {
    () => {
        ::std::result::Result::<$crate::Args, $crate::Error>::Ok($crate::Args::new())
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        (|| -> ::std::result::Result<$crate::Args, $crate::Error> {
            let mut map = $crate::Args::new();
            $(
                let name = ::std::string::String::from($name);
                let value = $crate::TryToValue::try_to_value(&$value).map_err(|source| {
                    $crate::Error::InvalidArgument {
                        name: name.clone(),
                        source,
                    }
                })?;
                map.insert(name, value);
            )+
            ::std::result::Result::Ok(map)
        })()
    };
}
