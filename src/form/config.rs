//! Form configuration: renderer settings, descriptor checks, and JSON documents.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DescriptorError};
use crate::form::field::{FieldDescriptor, FieldType, RawDescriptor};
use crate::form::schema::Schema;

// ---------------------------------------------------------------------------
// FormConfig
// ---------------------------------------------------------------------------

/// When errors are refreshed between submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revalidate {
    /// After the first submit attempt, each change re-checks the changed field.
    #[default]
    OnChange,
    /// Errors only change at the next submit.
    OnSubmit,
}

/// Presentation and behavior settings for a [`FormRenderer`](crate::FormRenderer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Heading drawn above the fields.
    pub title: Option<String>,
    /// Text of the submit button.
    pub submit_label: String,
    pub revalidate: Revalidate,
    /// Upper bound for async validation, in milliseconds.
    pub async_timeout_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            title: None,
            submit_label: "Submit".to_owned(),
            revalidate: Revalidate::OnChange,
            async_timeout_ms: 10_000,
        }
    }
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the submit button label (builder).
    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Set the revalidation policy (builder).
    pub fn with_revalidate(mut self, revalidate: Revalidate) -> Self {
        self.revalidate = revalidate;
        self
    }

    /// Set the async validation timeout (builder). Sub-millisecond parts are dropped.
    pub fn with_async_timeout(mut self, timeout: Duration) -> Self {
        self.async_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn async_timeout(&self) -> Duration {
        Duration::from_millis(self.async_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Descriptor checks
// ---------------------------------------------------------------------------

/// Check a descriptor list, collecting every problem rather than stopping at
/// the first. `has_control` reports whether a control exists for a type.
pub fn check_descriptors(
    fields: &[FieldDescriptor],
    has_control: impl Fn(FieldType) -> bool,
) -> Result<(), Vec<DescriptorError>> {
    let mut errors = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (idx, field) in fields.iter().enumerate() {
        if field.name.is_empty() {
            errors.push(DescriptorError::EmptyName);
        } else if seen.insert(&field.name, idx).is_some() {
            errors.push(DescriptorError::DuplicateName(field.name.clone()));
        }

        if field.field_type.requires_options() && field.options.is_empty() {
            errors.push(DescriptorError::MissingOptions {
                field: field.name.clone(),
                field_type: field.field_type,
            });
        }

        match (field.field_type, field.max) {
            (FieldType::Rating, Some(0)) => errors.push(DescriptorError::ZeroMax {
                field: field.name.clone(),
            }),
            (FieldType::Rating, _) | (_, None) => {}
            (_, Some(_)) => errors.push(DescriptorError::MaxOnNonRating {
                field: field.name.clone(),
            }),
        }

        if !has_control(field.field_type) {
            errors.push(DescriptorError::NoControl {
                field: field.name.clone(),
                field_type: field.field_type,
            });
        }
    }

    // Conditionals may point forward, so they are checked once every name is known.
    for field in fields {
        let Some(cond) = &field.conditional else {
            continue;
        };
        if cond.field == field.name {
            errors.push(DescriptorError::SelfConditional {
                field: field.name.clone(),
            });
        } else if !seen.contains_key(cond.field.as_str()) {
            errors.push(DescriptorError::DanglingConditional {
                field: field.name.clone(),
                target: cond.field.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Log each problem and wrap them into a [`ConfigError`].
pub(crate) fn reject(problems: Vec<DescriptorError>) -> ConfigError {
    for problem in &problems {
        tracing::error!(%problem, "invalid field descriptor");
    }
    ConfigError::Invalid(problems)
}

// ---------------------------------------------------------------------------
// FormDocument
// ---------------------------------------------------------------------------

/// A whole form described in JSON: settings, fields, and an optional schema.
///
/// ```json
/// {
///   "title": "Sign up",
///   "fields": [{ "name": "email", "label": "Email", "type": "email" }],
///   "schema": { "email": [{ "rule": "required" }, { "rule": "email" }] }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FormDocument {
    pub config: FormConfig,
    pub fields: Vec<FieldDescriptor>,
    pub schema: Schema,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(flatten)]
    config: FormConfig,
    fields: Vec<RawDescriptor>,
    #[serde(default)]
    schema: Option<Schema>,
}

impl FormDocument {
    /// Parse a document. Unknown field types and structural descriptor
    /// problems are reported together, each naming its field.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_str(json)?;

        let mut problems = Vec::new();
        let mut unknown = Vec::new();
        let mut fields = Vec::with_capacity(raw.fields.len());
        for raw_field in raw.fields {
            let name = raw_field.name.clone();
            match FieldDescriptor::try_from(raw_field) {
                Ok(field) => fields.push(field),
                Err(err) => {
                    unknown.push(name);
                    problems.push(err);
                }
            }
        }

        if let Err(errors) = check_descriptors(&fields, |_| true) {
            // A conditional on a field we could not type is not dangling.
            problems.extend(errors.into_iter().filter(|e| {
                !matches!(e, DescriptorError::DanglingConditional { target, .. } if unknown.contains(target))
            }));
        }

        if !problems.is_empty() {
            return Err(reject(problems));
        }

        Ok(Self {
            config: raw.config,
            fields,
            schema: raw.schema.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, name, FieldType::Text)
    }

    #[test]
    fn config_defaults() {
        let config = FormConfig::new();
        assert_eq!(config.submit_label, "Submit");
        assert_eq!(config.revalidate, Revalidate::OnChange);
        assert_eq!(config.async_timeout(), Duration::from_secs(10));
        assert_eq!(config.title, None);
    }

    #[test]
    fn config_builders() {
        let config = FormConfig::new()
            .with_title("Sign up")
            .with_submit_label("Create account")
            .with_revalidate(Revalidate::OnSubmit)
            .with_async_timeout(Duration::from_millis(250));
        assert_eq!(config.title.as_deref(), Some("Sign up"));
        assert_eq!(config.submit_label, "Create account");
        assert_eq!(config.revalidate, Revalidate::OnSubmit);
        assert_eq!(config.async_timeout_ms, 250);
    }

    #[test]
    fn valid_list_passes() {
        let fields = vec![
            text("country"),
            text("other").show_when("country", "other"),
            FieldDescriptor::new("stars", "Stars", FieldType::Rating).max(3),
        ];
        assert_eq!(check_descriptors(&fields, |_| true), Ok(()));
    }

    #[test]
    fn collects_every_problem() {
        let fields = vec![
            text("email"),
            text("email"),
            FieldDescriptor::new("plan", "Plan", FieldType::Radio),
            text("note").max(3),
            FieldDescriptor::new("stars", "Stars", FieldType::Rating).max(0),
            text("ghost").show_when("nowhere", true),
            text("loop").show_when("loop", true),
        ];
        let errors = check_descriptors(&fields, |_| true).unwrap_err();
        assert_eq!(
            errors,
            vec![
                DescriptorError::DuplicateName("email".into()),
                DescriptorError::MissingOptions {
                    field: "plan".into(),
                    field_type: FieldType::Radio,
                },
                DescriptorError::MaxOnNonRating { field: "note".into() },
                DescriptorError::ZeroMax { field: "stars".into() },
                DescriptorError::DanglingConditional {
                    field: "ghost".into(),
                    target: "nowhere".into(),
                },
                DescriptorError::SelfConditional { field: "loop".into() },
            ]
        );
    }

    #[test]
    fn forward_conditionals_are_fine() {
        let fields = vec![text("detail").show_when("kind", "x"), text("kind")];
        assert!(check_descriptors(&fields, |_| true).is_ok());
    }

    #[test]
    fn missing_control_is_reported() {
        let fields = vec![FieldDescriptor::new("cv", "CV", FieldType::File)];
        let errors = check_descriptors(&fields, |t| t != FieldType::File).unwrap_err();
        assert_eq!(
            errors,
            vec![DescriptorError::NoControl {
                field: "cv".into(),
                field_type: FieldType::File,
            }]
        );
    }

    #[test]
    fn document_from_json() {
        let doc = FormDocument::from_json(
            r#"{
                "title": "Sign up",
                "revalidate": "on_submit",
                "fields": [
                    { "name": "email", "label": "Email", "type": "email" },
                    { "name": "tos", "label": "Accept terms", "type": "checkbox" }
                ],
                "schema": { "tos": [{ "rule": "checked" }] }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.config.title.as_deref(), Some("Sign up"));
        assert_eq!(doc.config.submit_label, "Submit");
        assert_eq!(doc.config.revalidate, Revalidate::OnSubmit);
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.schema.field_names().collect::<Vec<_>>(), vec!["tos"]);
    }

    #[test]
    fn document_reports_unknown_types_with_other_problems() {
        let err = FormDocument::from_json(
            r#"{
                "fields": [
                    { "name": "mood", "label": "Mood", "type": "slider" },
                    { "name": "why", "label": "Why?", "type": "text",
                      "conditional": { "field": "mood", "value": "sad" } },
                    { "name": "plan", "label": "Plan", "type": "select" }
                ]
            }"#,
        )
        .unwrap_err();
        assert_eq!(
            err.problems(),
            &[
                DescriptorError::UnknownType {
                    field: "mood".into(),
                    type_name: "slider".into(),
                },
                DescriptorError::MissingOptions {
                    field: "plan".into(),
                    field_type: FieldType::Select,
                },
            ]
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = FormDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
