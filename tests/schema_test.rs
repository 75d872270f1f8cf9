//! Tests for record metadata and statement rewriting through the public API
//! Run with: cargo test --test schema_test

use sqlite_map::schema::{snake_case, BasicPluralizer};
use sqlite_map::{
    args, record, rewrite, Args, Db, Error, Pluralizer, Record, Role, ShapeError, SqliteConnection,
    Value,
};

#[derive(Debug, Default)]
struct BlogPost {
    id: i64,
    title: String,
    body_text: String,
    internal_notes: String,
}

record! {
    BlogPost {
        id,
        title,
        body_text => "body",
        internal_notes => "-",
    }
}

#[derive(Debug, Default)]
struct Person {
    id: u32,
    name: String,
}

record! {
    Person { id, name }
}

#[derive(Debug, Default)]
struct Parcel {
    id: i64,
    created_at: String,
}

record! {
    Parcel in "crates" { id, created_at }
}

#[derive(Debug, Default)]
struct Twice {
    id: i64,
    legacy_id: i64,
}

record! {
    Twice { id, legacy_id => "id" }
}

fn memory_db() -> Db {
    Db::new(SqliteConnection::open_in_memory().unwrap())
}

mod model_tests {
    use super::*;

    #[test]
    fn test_table_and_columns() {
        let db = memory_db();
        let model = db.resolve::<BlogPost>().unwrap();

        assert_eq!(model.table_name, "blog_posts");
        assert_eq!(model.columns().collect::<Vec<_>>(), vec!["id", "title", "body"]);
        assert_eq!(model.id().map(|f| f.role), Some(Role::Id));
        assert!(model.field("internal_notes").is_none());
    }

    #[test]
    fn test_table_override() {
        let db = memory_db();
        assert_eq!(db.resolve::<Parcel>().unwrap().table_name, "crates");
    }

    #[test]
    fn test_irregular_plural() {
        let db = memory_db();
        assert_eq!(db.resolve::<Person>().unwrap().table_name, "people");
    }

    #[test]
    fn test_ambiguous_identity_is_rejected() {
        let db = memory_db();
        let err = db.resolve::<Twice>().unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidShape(ShapeError::AmbiguousRole { role: Role::Id, .. })
        ));
    }

    #[test]
    fn test_record_declaration() {
        assert_eq!(BlogPost::NAME, "BlogPost");
        assert_eq!(BlogPost::FIELDS.len(), 4);
        assert!(BlogPost::FIELDS[3].is_ignored());
        assert_eq!(BlogPost::FIELDS[2].tag, Some("body"));
    }

    struct Singular;

    impl Pluralizer for Singular {
        fn pluralize(&self, word: &str) -> String {
            word.to_string()
        }
    }

    #[test]
    fn test_custom_pluralizer() {
        let db = Db::builder(SqliteConnection::open_in_memory().unwrap())
            .pluralizer(Singular)
            .build();

        assert_eq!(db.resolve::<BlogPost>().unwrap().table_name, "blog_post");
        // overrides are not pluralized
        assert_eq!(db.resolve::<Parcel>().unwrap().table_name, "crates");
    }

    #[test]
    fn test_unsupported_updated_at_type_fails_update() {
        #[derive(Debug, Default)]
        struct Stamped {
            id: i64,
            updated_at: String,
        }

        record! {
            Stamped { id, updated_at }
        }

        let db = memory_db();
        let err = db
            .update::<Stamped>("", &Args::new(), &args! { "id" => 1 })
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidShape(ShapeError::UnsupportedTimestamp { role: Role::UpdatedAt, .. })
        ));
    }
}

mod naming_tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("KeyValue"), "key_value");
        assert_eq!(snake_case("CreatedAt"), "created_at");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_pluralize() {
        let p = BasicPluralizer;
        assert_eq!(p.pluralize("key_value"), "key_values");
        assert_eq!(p.pluralize("category"), "categories");
        assert_eq!(p.pluralize("box"), "boxes");
        assert_eq!(p.pluralize("child"), "children");
    }
}

mod rewrite_tests {
    use super::*;

    #[test]
    fn test_rewrite_orders_arguments_by_appearance() {
        let rewritten = rewrite(
            "WHERE a = $b AND b = $a AND c = $b",
            &args! { "a" => 1, "b" => "two" },
        )
        .unwrap();

        assert_eq!(rewritten.sql, "WHERE a = ? AND b = ? AND c = ?");
        assert_eq!(
            rewritten.args,
            vec![
                Value::Text("two".into()),
                Value::Integer(1),
                Value::Text("two".into()),
            ]
        );
    }

    #[test]
    fn test_rewrite_escape() {
        let rewritten = rewrite("SELECT '$$1.00'", &Args::new()).unwrap();
        assert_eq!(rewritten.sql, "SELECT '$1.00'");
        assert!(rewritten.args.is_empty());
    }
}
