//! Record declarations: the static description of a mapped type

use crate::schema::Column;

/// Column tag that excludes a field from mapping.
pub const IGNORE_TAG: &str = "-";

/// One declared field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name as declared on the type.
    pub name: &'static str,
    /// Explicit column name, or [`IGNORE_TAG`] to skip the field.
    pub tag: Option<&'static str>,
}

impl FieldDef {
    pub const fn new(name: &'static str) -> Self {
        FieldDef { name, tag: None }
    }

    pub const fn tagged(name: &'static str, tag: &'static str) -> Self {
        FieldDef {
            name,
            tag: Some(tag),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.tag == Some(IGNORE_TAG)
    }
}

/// A type that maps onto a table.
///
/// Usually generated with [`record!`](crate::record); implement by hand
/// when a field needs custom handling. `FIELDS` lists fields in declaration
/// order and `column`/`column_mut` index into that same order.
pub trait Record: Default + Send + 'static {
    /// The declared type name, used to derive the table name.
    const NAME: &'static str;

    const FIELDS: &'static [FieldDef];

    /// Table name override. Read once per mapper and cached, so it must
    /// always return the same value.
    fn table_name() -> Option<String> {
        None
    }

    fn column(&self, index: usize) -> Option<&dyn Column>;

    fn column_mut(&mut self, index: usize) -> Option<&mut dyn Column>;
}

/// Position of the field called `name` in `R::FIELDS`.
pub fn field_index<R: Record>(name: &str) -> Option<usize> {
    R::FIELDS.iter().position(|field| field.name == name)
}

/// Implement [`Record`] for a struct by listing its mapped fields.
///
/// Each field may carry a column tag after `=>`; the tag `"-"` keeps the
/// field out of every statement. `in "table"` overrides the table name.
///
/// ```
/// use sqlite_map::record;
///
/// #[derive(Debug, Default)]
/// struct KeyValue {
///     id: i64,
///     key: String,
///     value: String,
///     cached: bool,
/// }
///
/// record! {
///     KeyValue {
///         id,
///         key => "key",
///         value,
///         cached => "-",
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $ty:ident $(in $table:literal)? {
            $($field:ident $(=> $tag:literal)?),+ $(,)?
        }
    ) => {
        impl $crate::Record for $ty {
            const NAME: &'static str = stringify!($ty);

            const FIELDS: &'static [$crate::FieldDef] = &[
                $($crate::FieldDef {
                    name: stringify!($field),
                    tag: $crate::__record_tag!($($tag)?),
                }),+
            ];

            $(
                fn table_name() -> ::std::option::Option<::std::string::String> {
                    ::std::option::Option::Some(::std::string::String::from($table))
                }
            )?

            #[allow(unused_assignments)]
            fn column(&self, index: usize) -> ::std::option::Option<&dyn $crate::Column> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(&self.$field);
                    }
                    position += 1;
                )+
                ::std::option::Option::None
            }

            #[allow(unused_assignments)]
            fn column_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::Column> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(&mut self.$field);
                    }
                    position += 1;
                )+
                ::std::option::Option::None
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
    () => {
        ::std::option::Option::None
    };
    ($tag:literal) => {
        ::std::option::Option::Some($tag)
    };
}
