//! Error types.
//!
//! Configuration mistakes (bad descriptors) are programming errors and fail
//! construction loudly. User input mistakes never show up here: they live in
//! [`ValidationResult`](crate::form::ValidationResult) and render inline.

use std::time::Duration;

use thiserror::Error;

use crate::form::field::FieldType;

/// Error type callers may return from the submit callback.
pub type SubmitCallbackError = Box<dyn std::error::Error + Send + Sync>;

/// A single problem with one field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("field name must not be empty")]
    EmptyName,

    #[error("duplicate field name `{0}`")]
    DuplicateName(String),

    #[error("field `{field}`: unknown type `{type_name}`")]
    UnknownType { field: String, type_name: String },

    #[error("field `{field}`: type `{field_type}` requires at least one option")]
    MissingOptions { field: String, field_type: FieldType },

    #[error("field `{field}`: conditional references unknown field `{target}`")]
    DanglingConditional { field: String, target: String },

    #[error("field `{field}`: conditional references the field itself")]
    SelfConditional { field: String },

    #[error("field `{field}`: `max` only applies to rating fields")]
    MaxOnNonRating { field: String },

    #[error("field `{field}`: rating `max` must be at least 1")]
    ZeroMax { field: String },

    #[error("field `{field}`: no control registered for type `{field_type}`")]
    NoControl { field: String, field_type: FieldType },
}

/// Failure to build a form from its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid form configuration: {}", join(.0))]
    Invalid(Vec<DescriptorError>),

    #[error("failed to parse form configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// The descriptor problems, if this is an `Invalid` error.
    pub fn problems(&self) -> &[DescriptorError] {
        match self {
            ConfigError::Invalid(problems) => problems,
            ConfigError::Json(_) => &[],
        }
    }
}

fn join(errors: &[DescriptorError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A submission that did not reach a clean outcome.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The caller's submit callback returned an error. Passed through untouched.
    #[error("submit callback failed: {0}")]
    Callback(#[source] SubmitCallbackError),

    #[error("async validation timed out after {0:?}")]
    ValidationTimeout(Duration),
}

/// A programmatic value change named a field the form does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no field named `{0}`")]
pub struct UnknownField(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_problem() {
        let err = ConfigError::Invalid(vec![
            DescriptorError::DuplicateName("email".into()),
            DescriptorError::UnknownType {
                field: "mood".into(),
                type_name: "slider".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("duplicate field name `email`"));
        assert!(msg.contains("field `mood`: unknown type `slider`"));
        assert_eq!(err.problems().len(), 2);
    }

    #[test]
    fn missing_options_names_type() {
        let err = DescriptorError::MissingOptions {
            field: "plan".into(),
            field_type: FieldType::Select,
        };
        assert_eq!(
            err.to_string(),
            "field `plan`: type `select` requires at least one option"
        );
    }

    #[test]
    fn callback_error_keeps_source() {
        use std::error::Error as _;
        let err = SubmitError::Callback("backend down".into());
        assert_eq!(err.to_string(), "submit callback failed: backend down");
        assert!(err.source().is_some());
    }
}
