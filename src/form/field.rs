//! Field descriptors: the declarative description of one form control.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;
use crate::form::value::FieldValue;

/// Rating scale used when a descriptor does not set `max`.
pub const DEFAULT_RATING_MAX: u32 = 5;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// The closed set of control kinds a descriptor can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Date,
    Textarea,
    Checkbox,
    Radio,
    Select,
    File,
    Rating,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Password,
        FieldType::Date,
        FieldType::Textarea,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Select,
        FieldType::File,
        FieldType::Rating,
    ];

    /// The configuration name of this type (`"text"`, `"rating"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Date => "date",
            FieldType::Textarea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Select => "select",
            FieldType::File => "file",
            FieldType::Rating => "rating",
        }
    }

    /// Look a type up by its configuration name.
    pub fn parse(name: &str) -> Option<FieldType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Radio and select need a non-empty option list.
    pub fn requires_options(self) -> bool {
        matches!(self, FieldType::Radio | FieldType::Select)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Options and conditionals
// ---------------------------------------------------------------------------

/// One choice of a radio group or select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Show a field only while another field holds exactly `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub field: String,
    pub value: FieldValue,
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// Configuration for one form control.
///
/// # Examples
///
/// ```ignore
/// let other = FieldDescriptor::new("other_country", "Which country?", FieldType::Text)
///     .placeholder("Country name")
///     .show_when("country", "other");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl FieldDescriptor {
    /// Create a descriptor with no placeholder, options, or conditional.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            placeholder: None,
            options: Vec::new(),
            conditional: None,
            max: None,
        }
    }

    /// Set the placeholder text (builder pattern).
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Append one option (builder pattern).
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(value, label));
        self
    }

    /// Append `(value, label)` options (builder pattern).
    pub fn options<V, L>(mut self, options: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        self.options
            .extend(options.into_iter().map(|(v, l)| FieldOption::new(v, l)));
        self
    }

    /// Only show this field while `field` equals `value` (builder pattern).
    pub fn show_when(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.conditional = Some(Conditional {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Set the rating scale (builder pattern).
    pub fn max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Number of rating levels.
    pub fn rating_max(&self) -> u32 {
        self.max.unwrap_or(DEFAULT_RATING_MAX)
    }

    /// The option whose value is `value`, if any.
    pub fn option_for(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Wire shape of a descriptor. `type` stays a string until conversion so an
/// unknown type can be reported together with the field it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub conditional: Option<Conditional>,
    #[serde(default)]
    pub max: Option<u32>,
}

impl TryFrom<RawDescriptor> for FieldDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let field_type =
            FieldType::parse(&raw.field_type).ok_or_else(|| DescriptorError::UnknownType {
                field: raw.name.clone(),
                type_name: raw.field_type.clone(),
            })?;
        Ok(Self {
            name: raw.name,
            label: raw.label,
            field_type,
            placeholder: raw.placeholder,
            options: raw.options,
            conditional: raw.conditional,
            max: raw.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_type_names_round_trip() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::parse(t.as_str()), Some(t));
        }
        assert_eq!(FieldType::parse("slider"), None);
        assert_eq!(FieldType::Textarea.to_string(), "textarea");
    }

    #[test]
    fn only_choice_types_require_options() {
        let needing: Vec<_> = FieldType::ALL
            .into_iter()
            .filter(|t| t.requires_options())
            .collect();
        assert_eq!(needing, vec![FieldType::Radio, FieldType::Select]);
    }

    #[test]
    fn builder_sets_everything() {
        let d = FieldDescriptor::new("plan", "Plan", FieldType::Select)
            .placeholder("Pick one")
            .option("free", "Free")
            .options([("pro", "Pro")])
            .show_when("signup", true);
        assert_eq!(d.placeholder.as_deref(), Some("Pick one"));
        assert_eq!(d.options.len(), 2);
        assert_eq!(d.option_for("pro").map(|o| o.label.as_str()), Some("Pro"));
        assert_eq!(
            d.conditional,
            Some(Conditional {
                field: "signup".into(),
                value: FieldValue::Bool(true),
            })
        );
    }

    #[test]
    fn rating_max_defaults_to_five() {
        let d = FieldDescriptor::new("stars", "Stars", FieldType::Rating);
        assert_eq!(d.rating_max(), 5);
        assert_eq!(d.max(3).rating_max(), 3);
    }

    #[test]
    fn deserialize_from_json() {
        let d: FieldDescriptor = serde_json::from_str(
            r#"{
                "name": "other_country",
                "label": "Country name",
                "type": "text",
                "conditional": { "field": "country", "value": "other" }
            }"#,
        )
        .unwrap();
        assert_eq!(d.field_type, FieldType::Text);
        assert_eq!(
            d.conditional.map(|c| c.value),
            Some(FieldValue::Text("other".into()))
        );
    }

    #[test]
    fn unknown_type_names_the_field() {
        let err = serde_json::from_str::<FieldDescriptor>(
            r#"{ "name": "mood", "label": "Mood", "type": "slider" }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("field `mood`: unknown type `slider`"));
    }

    #[test]
    fn serializes_type_key() {
        let json = serde_json::to_value(FieldDescriptor::new("a", "A", FieldType::Email)).unwrap();
        assert_eq!(json["type"], "email");
        assert!(json.get("options").is_none());
    }
}
