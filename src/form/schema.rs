//! Validation: the validator traits, the result type, and a rule-based schema.
//!
//! The renderer only depends on [`SchemaValidator`] (or
//! [`AsyncSchemaValidator`] for submissions that wait on remote checks).
//! [`Schema`] is the built-in implementation: ordered rules per field, the
//! first failing rule providing the field's message.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::form::value::{FieldValue, FormValues};

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// Field name -> error message, at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: IndexMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one.
    ///
    /// The first message wins. Returns whether it was recorded.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) -> bool {
        match self.errors.entry(field.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(message.into());
                true
            }
        }
    }

    /// The message for `field`, if it failed.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Drop the message for `field`.
    pub fn clear(&mut self, field: &str) {
        self.errors.shift_remove(field);
    }

    /// Replace the message for `field` with the one in `other` (or none).
    pub fn take_field_from(&mut self, other: &ValidationResult, field: &str) {
        match other.error(field) {
            Some(message) => {
                self.errors.insert(field.to_owned(), message.to_owned());
            }
            None => self.clear(field),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Validator traits
// ---------------------------------------------------------------------------

/// Checks a value map and reports per-field errors.
pub trait SchemaValidator {
    fn validate(&self, values: &FormValues) -> ValidationResult;
}

impl<F> SchemaValidator for F
where
    F: Fn(&FormValues) -> ValidationResult,
{
    fn validate(&self, values: &FormValues) -> ValidationResult {
        self(values)
    }
}

/// A validator whose checks may wait on I/O (e.g. a uniqueness lookup).
pub trait AsyncSchemaValidator {
    fn validate(&self, values: &FormValues) -> impl Future<Output = ValidationResult>;
}

/// Adapts a synchronous validator to [`AsyncSchemaValidator`].
#[derive(Debug, Clone)]
pub struct Immediate<V>(pub V);

impl<V: SchemaValidator> AsyncSchemaValidator for Immediate<V> {
    fn validate(&self, values: &FormValues) -> impl Future<Output = ValidationResult> {
        std::future::ready(self.0.validate(values))
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

type CheckFn = dyn Fn(Option<&FieldValue>, &FormValues) -> Option<String> + Send + Sync;

/// A caller-supplied check. Returns the error message on failure.
#[derive(Clone)]
pub struct CustomRule(Arc<CheckFn>);

impl CustomRule {
    pub fn new(
        f: impl Fn(Option<&FieldValue>, &FormValues) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(<fn>)")
    }
}

/// One check applied to one field.
///
/// Except for `Required`, `Checked`, `RequiredWhen` and `Custom`, rules pass
/// on undefined or blank values; combine them with `Required` to demand input.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Defined and not blank.
    Required,
    /// Looks like `local@domain.tld`.
    Email,
    /// At least this many characters.
    MinLength(usize),
    /// At most this many characters.
    MaxLength(usize),
    /// Number at least this large.
    Min(i64),
    /// Number at most this large.
    Max(i64),
    /// Boolean `true` (terms-of-service style checkboxes).
    Checked,
    /// Value is one of the listed ones.
    OneOf(Vec<FieldValue>),
    /// Required while another field strictly equals `value`.
    RequiredWhen { field: String, value: FieldValue },
    /// Equal to another field's value (confirmations).
    Matches(String),
    Custom(CustomRule),
}

impl Rule {
    /// Run the rule; `None` means it passed, otherwise the default message.
    fn check(&self, value: Option<&FieldValue>, values: &FormValues) -> Option<String> {
        let present = value.filter(|v| !v.is_empty());
        match self {
            Rule::Required => present.is_none().then(|| "This field is required".to_owned()),
            Rule::Checked => {
                (value.and_then(FieldValue::as_bool) != Some(true)).then(|| "This box must be checked".to_owned())
            }
            Rule::RequiredWhen { field, value: expected } => {
                let applies = values.get(field) == Some(expected);
                (applies && present.is_none()).then(|| "This field is required".to_owned())
            }
            Rule::Custom(custom) => (custom.0)(value, values),
            _ => {
                let value = present?;
                self.check_present(value, values)
            }
        }
    }

    fn check_present(&self, value: &FieldValue, values: &FormValues) -> Option<String> {
        match self {
            Rule::Email => value
                .as_str()
                .filter(|s| looks_like_email(s))
                .is_none()
                .then(|| "Invalid email address".to_owned()),
            Rule::MinLength(min) => {
                let len = value.as_str()?.chars().count();
                (len < *min).then(|| format!("Must be at least {min} characters"))
            }
            Rule::MaxLength(max) => {
                let len = value.as_str()?.chars().count();
                (len > *max).then(|| format!("Must be at most {max} characters"))
            }
            Rule::Min(min) => {
                let n = value.as_number()?;
                (n < *min).then(|| format!("Must be at least {min}"))
            }
            Rule::Max(max) => {
                let n = value.as_number()?;
                (n > *max).then(|| format!("Must be at most {max}"))
            }
            Rule::OneOf(allowed) => (!allowed.contains(value)).then(|| "Invalid selection".to_owned()),
            Rule::Matches(other) => {
                (values.get(other) != Some(value)).then(|| format!("Must match {other}"))
            }
            Rule::Required
            | Rule::Checked
            | Rule::RequiredWhen { .. }
            | Rule::Custom(_) => None,
        }
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// A rule plus an optional message overriding its default one.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawCheck")]
pub struct Check {
    pub rule: Rule,
    pub message: Option<String>,
}

impl Check {
    pub fn new(rule: Rule) -> Self {
        Self { rule, message: None }
    }

    /// Override the message (builder pattern).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn run(&self, value: Option<&FieldValue>, values: &FormValues) -> Option<String> {
        let default = self.rule.check(value, values)?;
        Some(self.message.clone().unwrap_or(default))
    }
}

impl From<Rule> for Check {
    fn from(rule: Rule) -> Self {
        Check::new(rule)
    }
}

/// JSON shape of a check: `{"rule": "min_length", "min": 8, "message": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheck {
    rule: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    max: Option<i64>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    value: Option<FieldValue>,
    #[serde(default)]
    values: Option<Vec<FieldValue>>,
}

impl TryFrom<RawCheck> for Check {
    type Error = String;

    fn try_from(raw: RawCheck) -> Result<Self, Self::Error> {
        fn need<T>(opt: Option<T>, rule: &str, key: &str) -> Result<T, String> {
            opt.ok_or_else(|| format!("rule `{rule}` needs `{key}`"))
        }
        fn length(n: i64, rule: &str) -> Result<usize, String> {
            usize::try_from(n).map_err(|_| format!("rule `{rule}` needs a non-negative length"))
        }

        let name = raw.rule.as_str();
        let rule = match name {
            "required" => Rule::Required,
            "email" => Rule::Email,
            "checked" => Rule::Checked,
            "min_length" => Rule::MinLength(length(need(raw.min, name, "min")?, name)?),
            "max_length" => Rule::MaxLength(length(need(raw.max, name, "max")?, name)?),
            "min" => Rule::Min(need(raw.min, name, "min")?),
            "max" => Rule::Max(need(raw.max, name, "max")?),
            "one_of" => Rule::OneOf(need(raw.values, name, "values")?),
            "required_when" => Rule::RequiredWhen {
                field: need(raw.field, name, "field")?,
                value: need(raw.value, name, "value")?,
            },
            "matches" => Rule::Matches(need(raw.field, name, "field")?),
            other => return Err(format!("unknown rule `{other}`")),
        };
        Ok(Check {
            rule,
            message: raw.message,
        })
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered checks per field.
///
/// # Examples
///
/// ```ignore
/// let schema = Schema::new()
///     .field("email", [Rule::Required, Rule::Email])
///     .field("password", [Check::new(Rule::MinLength(8)).message("Too short")]);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: IndexMap<String, Vec<Check>>,
}

impl Schema {
    /// A schema with no rules: every value map is valid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append checks for `name` (builder pattern). Checks run in order.
    pub fn field<C: Into<Check>>(mut self, name: impl Into<String>, checks: impl IntoIterator<Item = C>) -> Self {
        let name = name.into();
        let checks = checks.into_iter().map(Into::into);
        self.fields.entry(name).or_default().extend(checks);
        self
    }

    /// Parse a schema from JSON: `{"field": [{"rule": "required"}, ...]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Names of the fields that carry rules.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl SchemaValidator for Schema {
    fn validate(&self, values: &FormValues) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (name, checks) in &self.fields {
            let value = values.get(name);
            if let Some(message) = checks.iter().find_map(|c| c.run(value, values)) {
                result.push(name.clone(), message);
            }
        }
        result
    }
}
