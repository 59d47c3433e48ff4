//! The form model: descriptors, values, the value store, visibility, and validation.

pub mod config;
pub mod field;
pub mod schema;
pub mod store;
pub mod value;
pub mod visibility;

pub use config::{check_descriptors, FormConfig, FormDocument, Revalidate};
pub use field::{Conditional, FieldDescriptor, FieldOption, FieldType, DEFAULT_RATING_MAX};
pub use schema::{
    AsyncSchemaValidator, Check, CustomRule, Immediate, Rule, Schema, SchemaValidator,
    ValidationResult,
};
pub use store::{Derived, Subscription, ValueStore};
pub use value::{FieldValue, FileHandle, FormValues};
