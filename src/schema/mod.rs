//! Record metadata: declarations, column plumbing, naming and model resolution

mod column;
mod model;
mod naming;
mod record;

pub use column::{Column, NullTime};
pub use model::{FieldMapping, Model, ModelCache, Role};
pub use naming::{snake_case, BasicPluralizer, Pluralizer};
pub use record::{field_index, FieldDef, Record, IGNORE_TAG};
