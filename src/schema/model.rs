//! Model resolution: table name, columns and special roles for a record type

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ShapeError;
use crate::schema::naming::{snake_case, Pluralizer};
use crate::schema::Record;

/// Special meaning of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Ordinary,
    Id,
    CreatedAt,
    UpdatedAt,
}

impl Role {
    /// The column tag or snake-cased field name that claims this role.
    pub fn conventional_name(&self) -> Option<&'static str> {
        match self {
            Role::Ordinary => None,
            Role::Id => Some("id"),
            Role::CreatedAt => Some("created_at"),
            Role::UpdatedAt => Some("updated_at"),
        }
    }

    /// Role claimed by a tag, or by an untagged field's name.
    fn detect(name: &str, tag: Option<&str>) -> Role {
        let candidate = match tag {
            Some(tag) => tag.to_string(),
            None => snake_case(name).to_lowercase(),
        };
        // `ID` snake-cases to `i_d`; identity matches the name case-insensitively
        if tag.is_none() && name.eq_ignore_ascii_case("id") {
            return Role::Id;
        }
        match candidate.as_str() {
            "id" => Role::Id,
            "created_at" => Role::CreatedAt,
            "updated_at" => Role::UpdatedAt,
            _ => Role::Ordinary,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Ordinary => "ordinary",
            Role::Id => "id",
            Role::CreatedAt => "created_at",
            Role::UpdatedAt => "updated_at",
        };
        f.write_str(name)
    }
}

/// One mapped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Position in `Record::FIELDS`.
    pub index: usize,
    pub field: &'static str,
    pub column: String,
    pub role: Role,
}

/// Resolved metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub record: &'static str,
    pub table_name: String,
    /// Mapped fields in declaration order. Ignored fields are absent.
    pub fields: Vec<FieldMapping>,
    id: Option<usize>,
    created_at: Option<usize>,
    updated_at: Option<usize>,
}

impl Model {
    /// Derive the model of `R`.
    ///
    /// Fails when two fields claim the same special role.
    pub fn resolve<R: Record>(pluralizer: &dyn Pluralizer) -> Result<Model, ShapeError> {
        let table_name = match R::table_name() {
            Some(name) => name,
            None => pluralizer.pluralize(&snake_case(R::NAME)),
        };

        let mut model = Model {
            record: R::NAME,
            table_name,
            fields: Vec::with_capacity(R::FIELDS.len()),
            id: None,
            created_at: None,
            updated_at: None,
        };

        for (index, def) in R::FIELDS.iter().enumerate() {
            if def.is_ignored() {
                continue;
            }

            let column = match def.tag {
                Some(tag) => tag.to_string(),
                None => snake_case(def.name),
            };
            let role = Role::detect(def.name, def.tag);

            let slot = match role {
                Role::Ordinary => None,
                Role::Id => Some(&mut model.id),
                Role::CreatedAt => Some(&mut model.created_at),
                Role::UpdatedAt => Some(&mut model.updated_at),
            };
            if let Some(slot) = slot {
                if let Some(first) = *slot {
                    return Err(ShapeError::AmbiguousRole {
                        record: R::NAME,
                        role,
                        first: model.fields[first].field,
                        second: def.name,
                    });
                }
                *slot = Some(model.fields.len());
            }

            model.fields.push(FieldMapping {
                index,
                field: def.name,
                column,
                role,
            });
        }

        Ok(model)
    }

    pub fn id(&self) -> Option<&FieldMapping> {
        self.id.map(|i| &self.fields[i])
    }

    pub fn created_at(&self) -> Option<&FieldMapping> {
        self.created_at.map(|i| &self.fields[i])
    }

    pub fn updated_at(&self) -> Option<&FieldMapping> {
        self.updated_at.map(|i| &self.fields[i])
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|mapping| mapping.field == name)
    }

    /// Column names in mapping order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|mapping| mapping.column.as_str())
    }

    /// The table name with each dotted part quoted: `` `main`.`users` ``.
    pub fn quoted_table(&self) -> String {
        self.table_name
            .split('.')
            .map(|part| format!("`{}`", part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `` `table`.`column`, ... `` for SELECT lists.
    pub fn qualified_columns(&self) -> String {
        let table = self.quoted_table();
        self.columns()
            .map(|column| format!("{}.`{}`", table, column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolved models keyed by record type, shared by a mapper and the
/// transaction-scoped mappers it creates.
#[derive(Debug, Clone, Default)]
pub struct ModelCache {
    models: Arc<RwLock<HashMap<TypeId, Arc<Model>>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached model of `R`, resolving it on first use.
    ///
    /// Concurrent first calls may each resolve, but all of them receive the
    /// model that was stored first.
    pub fn get_or_resolve<R: Record>(
        &self,
        pluralizer: &dyn Pluralizer,
    ) -> Result<Arc<Model>, ShapeError> {
        let key = TypeId::of::<R>();

        if let Some(model) = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(model.clone());
        }

        tracing::trace!(record = R::NAME, "resolving model");
        let resolved = Arc::new(Model::resolve::<R>(pluralizer)?);

        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        Ok(models.entry(key).or_insert(resolved).clone())
    }

    pub fn len(&self) -> usize {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
