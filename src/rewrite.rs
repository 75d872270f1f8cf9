//! Named-parameter rewriting.
//!
//! Query text uses `$name` placeholders; `$$` is a literal `$`. Rewriting
//! replaces every placeholder with `?` and collects the bound values in the
//! order the placeholders appear. The scan is over raw text: quotes and
//! comments get no special treatment.

use rusqlite::types::Value;

use crate::db::Args;
use crate::error::{Error, Result};

/// Driver placeholder emitted for each named parameter.
pub const PLACEHOLDER: char = '?';

/// Output of [`rewrite`]: positional SQL and its arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rewritten {
    pub sql: String,
    pub args: Vec<Value>,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Rewrite `text` into positional form using `args`.
///
/// Each occurrence of a name contributes its own argument. Fails on the
/// first placeholder without a value.
pub fn rewrite(text: &str, args: &Args) -> Result<Rewritten> {
    let mut sql = String::with_capacity(text.len());
    let mut values = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            sql.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                sql.push('$');
            }
            Some(&next) if is_ident_start(next) => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_ident_continue(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }

                match args.get(&name) {
                    Some(value) => {
                        sql.push(PLACEHOLDER);
                        values.push(value.clone());
                    }
                    None => return Err(Error::MissingParameter(name)),
                }
            }
            _ => sql.push('$'),
        }
    }

    Ok(Rewritten { sql, args: values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn ok(text: &str, args: &Args) -> (String, Vec<Value>) {
        let rewritten = rewrite(text, args).unwrap();
        (rewritten.sql, rewritten.args)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_simple_parameter() {
        let (sql, values) = ok("WHERE id = $id", &args! { "id" => 123 });
        assert_eq!(sql, "WHERE id = ?");
        assert_eq!(values, vec![Value::Integer(123)]);
    }

    #[test]
    fn test_repeated_parameter_binds_each_occurrence() {
        let (sql, values) = ok("user_id = $x OR admin_id = $x", &args! { "x" => 5 });
        assert_eq!(sql, "user_id = ? OR admin_id = ?");
        assert_eq!(values, vec![Value::Integer(5), Value::Integer(5)]);
    }

    #[test]
    fn test_encounter_order() {
        let (sql, values) = ok(
            "WHERE id = $id, name = $name;",
            &args! { "name" => "test", "id" => 1 },
        );
        assert_eq!(sql, "WHERE id = ?, name = ?;");
        assert_eq!(values, vec![Value::Integer(1), text("test")]);
    }

    #[test]
    fn test_identifier_characters() {
        let args = args! { "user_id" => 1, "param123" => 2, "_private" => 3 };
        let (sql, values) = ok("$user_id $param123 $_private", &args);
        assert_eq!(sql, "? ? ?");
        assert_eq!(
            values,
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_literal_dollars() {
        let none = Args::new();
        assert_eq!(ok("price LIKE '$$19.99'", &none).0, "price LIKE '$19.99'");
        assert_eq!(ok("price = '$'", &none).0, "price = '$'");
        assert_eq!(ok("score > $123invalid", &none).0, "score > $123invalid");
        assert_eq!(ok("name != $-invalid", &none).0, "name != $-invalid");
        assert_eq!(ok("$", &none).0, "$");
        assert_eq!(ok("$$param = 123", &none).0, "$param = 123");
        assert_eq!(ok("$$first AND $$second", &none).0, "$first AND $second");
    }

    #[test]
    fn test_dollar_runs_pair_from_the_left() {
        let none = Args::new();
        assert_eq!(ok("$$", &none).0, "$");
        assert_eq!(ok("$$$", &none).0, "$$");
        assert_eq!(ok("$$$$", &none).0, "$$");
        assert_eq!(ok("$$$$$", &none).0, "$$$");
        assert_eq!(ok("$$$123", &none).0, "$$123");
        assert_eq!(ok("$$$$double", &none).0, "$$double");
    }

    #[test]
    fn test_escape_then_parameter() {
        let (sql, values) = ok("$$literal AND $param", &args! { "param" => "value" });
        assert_eq!(sql, "$literal AND ?");
        assert_eq!(values, vec![text("value")]);

        // `$$$name` is an escaped `$` followed by a parameter
        let (sql, values) = ok("$$$name", &args! { "name" => 1 });
        assert_eq!(sql, "$?");
        assert_eq!(values, vec![Value::Integer(1)]);
    }

    #[test]
    fn test_empty_input() {
        let (sql, values) = ok("", &Args::new());
        assert!(sql.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn test_null_value() {
        let none: Option<i64> = None;
        let (_, values) = ok("deleted_at = $deleted", &args! { "deleted" => none });
        assert_eq!(values, vec![Value::Null]);
    }

    #[test]
    fn test_multibyte_text() {
        let (sql, values) = ok("SELECT * FROM üsers WHERE nämé = $name", &args! { "name" => "tëst" });
        assert_eq!(sql, "SELECT * FROM üsers WHERE nämé = ?");
        assert_eq!(values, vec![text("tëst")]);

        let (sql, _) = ok("$nämé", &args! { "nämé" => 1 });
        assert_eq!(sql, "?");
    }

    #[test]
    fn test_missing_parameter() {
        let err = rewrite("WHERE id = $missing", &args! { "other" => 1 }).unwrap_err();
        assert!(matches!(err, Error::MissingParameter(ref name) if name == "missing"));
        assert_eq!(
            err.to_string(),
            "missing argument for named parameter: missing"
        );
    }

    #[test]
    fn test_first_missing_parameter_wins() {
        for _ in 0..16 {
            let err = rewrite("id = $missing1 AND name = $missing2", &Args::new()).unwrap_err();
            assert!(matches!(err, Error::MissingParameter(ref name) if name == "missing1"));
        }
    }
}
