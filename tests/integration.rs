//! Integration tests for formdeck.
//!
//! These tests exercise the public API from outside the crate: mounting forms
//! from Rust and JSON, driving them with the Pilot, and submitting them
//! synchronously and asynchronously.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use formdeck::controls::Rating;
use formdeck::event::{Key, Modifiers};
use formdeck::form::schema::{CustomRule, Immediate};
use formdeck::testing::{render_control, Pilot};
use formdeck::{
    AsyncSchemaValidator, ConfigError, DescriptorError, FieldDescriptor, FieldType, FieldValue,
    FormConfig, FormDocument, FormRenderer, FormValues, Rule, Schema, SubmitCallbackError,
    SubmitError, SubmitOutcome, ValidationResult,
};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records every payload the submit callback receives.
#[derive(Clone, Default)]
struct Submissions(Rc<RefCell<Vec<FormValues>>>);

impl Submissions {
    fn callback(&self) -> impl FnMut(&FormValues) -> Result<(), SubmitCallbackError> + 'static {
        let log = self.0.clone();
        move |values: &FormValues| {
            log.borrow_mut().push(values.clone());
            Ok(())
        }
    }

    fn count(&self) -> usize {
        self.0.borrow().len()
    }

    fn last(&self) -> FormValues {
        self.0.borrow().last().cloned().unwrap()
    }
}

fn country_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("country", "Country", FieldType::Select)
            .options([("us", "United States"), ("other", "Other")]),
        FieldDescriptor::new("other_country", "Which country?", FieldType::Text)
            .show_when("country", "other"),
    ]
}

fn signup_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name", FieldType::Text),
        FieldDescriptor::new("email", "Email", FieldType::Email),
        FieldDescriptor::new("country", "Country", FieldType::Select)
            .options([("us", "United States"), ("other", "Other")]),
        FieldDescriptor::new("other_country", "Which country?", FieldType::Text)
            .show_when("country", "other"),
        FieldDescriptor::new("tos", "Accept terms", FieldType::Checkbox),
        FieldDescriptor::new("stars", "How did we do?", FieldType::Rating).max(3),
    ]
}

fn signup_schema() -> Schema {
    Schema::new()
        .field("name", [Rule::Required])
        .field("email", [Rule::Required, Rule::Email])
        .field(
            "other_country",
            [Rule::RequiredWhen {
                field: "country".into(),
                value: "other".into(),
            }],
        )
        .field("tos", [Rule::Checked])
}

fn signup(submissions: &Submissions) -> Pilot {
    Pilot::new(FormRenderer::new(signup_fields(), signup_schema(), submissions.callback()).unwrap())
}

fn fill_valid(pilot: &mut Pilot) {
    pilot.set("name", "Ada").unwrap();
    pilot.set("email", "ada@example.com").unwrap();
    pilot.set("tos", true).unwrap();
}

// ---------------------------------------------------------------------------
// Rendering and visibility
// ---------------------------------------------------------------------------

#[test]
fn test_every_field_renders_without_conditionals() {
    let fields: Vec<FieldDescriptor> = FieldType::ALL
        .into_iter()
        .map(|ty| {
            let d = FieldDescriptor::new(ty.as_str(), format!("{ty} label"), ty);
            if ty.requires_options() {
                d.option("a", "Option A")
            } else {
                d
            }
        })
        .collect();
    let form = FormRenderer::new(fields, Schema::new(), Submissions::default().callback()).unwrap();
    let pilot = Pilot::new(form);

    assert_eq!(pilot.form().view().fields.len(), FieldType::ALL.len());
    let text = pilot.render_text();
    for ty in FieldType::ALL {
        assert!(text.contains(&format!("{ty} label")), "missing {ty} in:\n{text}");
    }
}

#[test]
fn test_conditional_field_follows_country() {
    let mut pilot = Pilot::new(
        FormRenderer::new(country_fields(), Schema::new(), Submissions::default().callback()).unwrap(),
    );

    for (country, shown) in [("us", false), ("other", true), ("us", false)] {
        pilot.set("country", country).unwrap();
        let names = pilot.form().view().field_names().join(",");
        assert_eq!(pilot.form().is_visible("other_country"), shown, "country = {country}");
        assert_eq!(names.contains("other_country"), shown);
        assert_eq!(pilot.render_text().contains("Which country?"), shown);
    }
}

#[test]
fn test_hidden_value_is_preserved() {
    let mut pilot = Pilot::new(
        FormRenderer::new(country_fields(), Schema::new(), Submissions::default().callback()).unwrap(),
    );
    pilot.set("country", "other").unwrap();
    assert!(pilot.focus("other_country"));
    pilot.type_text("Narnia");
    pilot.set("country", "us").unwrap();

    assert!(!pilot.form().is_visible("other_country"));
    assert_eq!(pilot.form().value("other_country"), Some(FieldValue::from("Narnia")));

    pilot.set("country", "other").unwrap();
    assert_eq!(pilot.form().value("other_country"), Some(FieldValue::from("Narnia")));
}

#[test]
fn test_render_snapshots() {
    let mut pilot = Pilot::new(
        FormRenderer::new(country_fields(), Schema::new(), Submissions::default().callback()).unwrap(),
    );
    insta::assert_snapshot!(pilot.render_text(), @r"
    Country
      < United States >

    [ Submit ]
    ");

    pilot.press_key(Key::Right).unwrap();
    pilot.tab(1);
    pilot.type_text("Narnia");
    insta::assert_snapshot!(pilot.render_text(), @r"
    Country
      < Other >

    Which country?
      Narnia

    [ Submit ]
    ");
}

#[test]
fn test_watchers_see_live_changes() {
    let form = FormRenderer::new(country_fields(), Schema::new(), Submissions::default().callback()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_c = seen.clone();
    let sub = form.watch(move |values, _| {
        seen_c
            .borrow_mut()
            .push(values.get("country").and_then(FieldValue::as_str).map(str::to_owned));
    });

    let mut pilot = Pilot::new(form);
    pilot.press_key(Key::Right).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![Some("us".to_owned()), Some("other".to_owned()), Some("other".to_owned())]
    );

    assert!(pilot.form().unwatch(sub));
    pilot.press_key(Key::Left).unwrap();
    assert_eq!(seen.borrow().len(), 3);
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

#[test]
fn test_rating_level_two_of_three() {
    let fields = vec![FieldDescriptor::new("stars", "Stars", FieldType::Rating).max(3)];
    let mut pilot =
        Pilot::new(FormRenderer::new(fields, Schema::new(), Submissions::default().callback()).unwrap());

    pilot.press_key(Key::Char('2')).unwrap();
    let value = pilot.form().value("stars");
    assert_eq!(value, Some(FieldValue::Number(2)));

    let control = pilot.form().control("stars").unwrap();
    let rating = control.as_any().downcast_ref::<Rating>().unwrap();
    assert_eq!(rating.levels(value.as_ref()), vec![true, true, false]);
    assert_eq!(render_control(rating, value.as_ref(), 10), "\u{2605}\u{2605}\u{2606} 2/3");
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[test]
fn test_valid_submit_calls_back_once_with_all_names() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);
    pilot.set("stars", 3_i64).unwrap();

    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(submissions.count(), 1);

    let mut names: Vec<_> = submissions.last().names().map(str::to_owned).collect();
    names.sort();
    assert_eq!(names, vec!["country", "email", "name", "stars", "tos"]);
    assert_eq!(
        submissions.last().to_json().unwrap(),
        r#"{"name":"Ada","email":"ada@example.com","country":"us","tos":true,"stars":3}"#
    );
}

#[test]
fn test_hidden_but_set_field_is_submitted() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);
    pilot.set("country", "other").unwrap();
    pilot.set("other_country", "Narnia").unwrap();
    pilot.set("country", "us").unwrap();

    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(
        submissions.last().get("other_country"),
        Some(&FieldValue::from("Narnia"))
    );
}

#[test]
fn test_missing_email_blocks_submit_with_one_message() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    pilot.set("name", "Ada").unwrap();
    pilot.set("tos", true).unwrap();

    let SubmitOutcome::Invalid(result) = pilot.submit().unwrap() else {
        panic!("expected invalid");
    };
    assert_eq!(result.len(), 1);
    assert_eq!(result.error("email"), Some("This field is required"));
    assert_eq!(submissions.count(), 0);

    let view = pilot.form().view();
    let errors: Vec<_> = view.fields.iter().filter_map(|f| f.error.as_deref()).collect();
    assert_eq!(errors, vec!["This field is required"]);
    assert_eq!(pilot.render_text().matches("This field is required").count(), 1);
    assert_eq!(pilot.form().focused_field(), Some("email"));
}

#[test]
fn test_message_renders_below_its_control() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    pilot.set("name", "Ada").unwrap();
    pilot.set("email", "not-an-email").unwrap();
    pilot.set("tos", true).unwrap();
    pilot.submit().unwrap();

    let text = pilot.render_text();
    let lines: Vec<&str> = text.lines().collect();
    let label = lines.iter().position(|l| *l == "Email").unwrap();
    assert_eq!(lines[label + 1].trim(), "not-an-email");
    assert_eq!(lines[label + 2].trim(), "Invalid email address");
}

#[test]
fn test_fixing_field_and_resubmitting() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    pilot.set("name", "Ada").unwrap();
    pilot.set("tos", true).unwrap();
    assert!(matches!(pilot.submit().unwrap(), SubmitOutcome::Invalid(_)));

    // Focus landed on the failing field; type into it.
    pilot.type_text("ada@example.com");
    assert_eq!(pilot.form().error("email"), None);

    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(submissions.count(), 1);
    assert!(pilot.form().errors().is_empty());
}

#[test]
fn test_required_when_applies_to_visible_conditional() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);
    pilot.set("country", "other").unwrap();

    let SubmitOutcome::Invalid(result) = pilot.submit().unwrap() else {
        panic!("expected invalid");
    };
    assert_eq!(result.error("other_country"), Some("This field is required"));

    pilot.set("country", "us").unwrap();
    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
}

#[test]
fn test_callback_error_passes_through() {
    let fail = Rc::new(Cell::new(true));
    let fail_c = fail.clone();
    let fields = vec![FieldDescriptor::new("name", "Name", FieldType::Text)];
    let form = FormRenderer::new(fields, Schema::new(), move |_: &FormValues| {
        if fail_c.get() {
            Err::<(), SubmitCallbackError>("backend down".into())
        } else {
            Ok(())
        }
    })
    .unwrap();
    let mut pilot = Pilot::new(form);
    pilot.type_text("Ada");

    let err = pilot.submit().unwrap_err();
    let SubmitError::Callback(inner) = err else {
        panic!("expected callback error, got {err:?}");
    };
    assert_eq!(inner.to_string(), "backend down");
    assert!(!pilot.form().is_submitted());

    // Still usable.
    pilot.type_text("!");
    assert_eq!(pilot.form().value("name"), Some(FieldValue::from("Ada!")));
    fail.set(false);
    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
}

#[test]
fn test_fixing_one_field_clears_the_field_that_depends_on_it() {
    let submissions = Submissions::default();
    let fields = vec![
        FieldDescriptor::new("password", "Password", FieldType::Password),
        FieldDescriptor::new("confirm", "Confirm password", FieldType::Password),
    ];
    let schema = Schema::new()
        .field("password", [Rule::Required])
        .field("confirm", [Rule::Matches("password".into())]);
    let mut pilot = Pilot::new(FormRenderer::new(fields, schema, submissions.callback()).unwrap());

    pilot.type_text("abc");
    pilot.tab(1);
    pilot.type_text("abd");
    let SubmitOutcome::Invalid(result) = pilot.submit().unwrap() else {
        panic!("expected invalid");
    };
    assert_eq!(result.error("confirm"), Some("Must match password"));
    assert_eq!(pilot.form().focused_field(), Some("confirm"));

    pilot.press_key(Key::BackTab).unwrap();
    pilot.press_key(Key::Backspace).unwrap();
    pilot.type_text("d");
    assert_eq!(pilot.form().error("confirm"), None);
    assert!(!pilot.render_text().contains("Must match password"));

    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(submissions.last().get("password"), Some(&FieldValue::from("abd")));
}

#[test]
fn test_error_on_hidden_field_returns_when_shown_again() {
    let submissions = Submissions::default();
    let schema = Schema::new().field("other_country", [Rule::MinLength(3)]);
    let mut pilot = Pilot::new(FormRenderer::new(country_fields(), schema, submissions.callback()).unwrap());
    pilot.set("country", "other").unwrap();
    pilot.set("other_country", "ab").unwrap();
    assert!(matches!(pilot.submit().unwrap(), SubmitOutcome::Invalid(_)));

    pilot.set("country", "us").unwrap();
    assert_eq!(pilot.form().error("other_country"), None);
    insta::assert_snapshot!(pilot.render_text(), @r"
    Country
      < United States >

    Hidden fields need attention: Which country?
    [ Submit ]
    ");
    assert!(matches!(pilot.submit().unwrap(), SubmitOutcome::Invalid(_)));
    assert_eq!(submissions.count(), 0);

    pilot.set("country", "other").unwrap();
    assert_eq!(pilot.form().error("other_country"), Some("Must be at least 3 characters"));
    assert!(pilot.form().view().notice.is_none());

    assert!(pilot.focus("other_country"));
    pilot.type_text("c");
    assert_eq!(pilot.form().error("other_country"), None);
    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(submissions.count(), 1);
}

// ---------------------------------------------------------------------------
// Async submission
// ---------------------------------------------------------------------------

struct NeverResolves;

impl AsyncSchemaValidator for NeverResolves {
    fn validate(&self, _values: &FormValues) -> impl Future<Output = ValidationResult> {
        std::future::pending()
    }
}

fn email_taken() -> Immediate<Schema> {
    Immediate(Schema::new().field(
        "email",
        [Rule::Custom(CustomRule::new(|value, _| {
            (value.and_then(FieldValue::as_str) == Some("taken@example.com"))
                .then(|| "Email already registered".to_owned())
        }))],
    ))
}

#[test]
fn test_resubmit_while_pending_is_rejected() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);

    let ticket = pilot.form_mut().begin_submit().unwrap();
    assert!(pilot.form().is_pending());
    assert!(pilot.form().view().submit.disabled);

    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Pending);
    assert!(pilot.form_mut().begin_submit().is_none());
    assert_eq!(submissions.count(), 0);

    let outcome = pilot
        .form_mut()
        .complete_submit(ticket, ValidationResult::new())
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(submissions.count(), 1);
    assert!(!pilot.form().is_pending());
}

#[test]
fn test_reset_discards_pending_result() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);

    let ticket = pilot.form_mut().begin_submit().unwrap();
    pilot.press_key_with(Key::Char('r'), Modifiers::CTRL).unwrap();
    assert!(!pilot.form().is_pending());

    let outcome = pilot
        .form_mut()
        .complete_submit(ticket, ValidationResult::new())
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Discarded);
    assert_eq!(submissions.count(), 0);
    assert_eq!(pilot.form().value("name"), Some(FieldValue::from("")));
}

#[test]
fn test_async_validation_result_applies() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);
    pilot.set("email", "taken@example.com").unwrap();

    let outcome = tokio_test::block_on(pilot.form_mut().submit_async(&email_taken())).unwrap();
    let SubmitOutcome::Invalid(result) = outcome else {
        panic!("expected invalid");
    };
    assert_eq!(result.error("email"), Some("Email already registered"));
    assert_eq!(pilot.form().error("email"), Some("Email already registered"));
    assert_eq!(submissions.count(), 0);

    pilot.set("email", "ada@example.com").unwrap();
    let outcome = tokio_test::block_on(pilot.form_mut().submit_async(&email_taken())).unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(submissions.count(), 1);
}

#[test]
fn test_async_validation_times_out() {
    let submissions = Submissions::default();
    let form = FormRenderer::new(signup_fields(), signup_schema(), submissions.callback())
        .unwrap()
        .with_config(FormConfig::new().with_async_timeout(Duration::from_millis(20)));
    let mut pilot = Pilot::new(form);
    fill_valid(&mut pilot);

    let err = tokio_test::block_on(pilot.form_mut().submit_async(&NeverResolves)).unwrap_err();
    assert!(matches!(err, SubmitError::ValidationTimeout(d) if d == Duration::from_millis(20)));
    assert!(!pilot.form().is_pending());
    assert_eq!(submissions.count(), 0);
}

#[test]
fn test_cancelled_async_submit_leaves_form_usable() {
    let submissions = Submissions::default();
    let mut pilot = signup(&submissions);
    fill_valid(&mut pilot);

    let cancelled = tokio_test::block_on(async {
        tokio::time::timeout(Duration::from_millis(10), pilot.form_mut().submit_async(&NeverResolves)).await
    });
    assert!(cancelled.is_err());
    assert!(!pilot.form().is_pending());
    assert!(!pilot.form().view().submit.disabled);
    assert_eq!(submissions.count(), 0);

    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(submissions.count(), 1);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_bad_descriptors_name_their_fields() {
    let fields = vec![
        FieldDescriptor::new("email", "Email", FieldType::Email),
        FieldDescriptor::new("email", "Email again", FieldType::Email),
        FieldDescriptor::new("plan", "Plan", FieldType::Select),
        FieldDescriptor::new("why", "Why?", FieldType::Text).show_when("mood", "sad"),
    ];
    let err = FormRenderer::new(fields, Schema::new(), Submissions::default().callback()).unwrap_err();
    assert_eq!(
        err.problems(),
        &[
            DescriptorError::DuplicateName("email".into()),
            DescriptorError::MissingOptions {
                field: "plan".into(),
                field_type: FieldType::Select,
            },
            DescriptorError::DanglingConditional {
                field: "why".into(),
                target: "mood".into(),
            },
        ]
    );
}

#[test]
fn test_json_unknown_type_names_field() {
    let err = FormDocument::from_json(
        r#"{ "fields": [{ "name": "mood", "label": "Mood", "type": "slider" }] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert_eq!(err.to_string(), "invalid form configuration: field `mood`: unknown type `slider`");
}

#[test]
fn test_form_from_json_document() {
    let doc = FormDocument::from_json(
        r#"{
            "title": "Feedback",
            "submit_label": "Send",
            "fields": [
                { "name": "email", "label": "Email", "type": "email" },
                { "name": "stars", "label": "Stars", "type": "rating", "max": 3 }
            ],
            "schema": {
                "email": [{ "rule": "required" }, { "rule": "email" }],
                "stars": [{ "rule": "required", "message": "Pick a rating" }]
            }
        }"#,
    )
    .unwrap();

    let submissions = Submissions::default();
    let mut pilot = Pilot::new(FormRenderer::from_document(doc, submissions.callback()).unwrap());
    let view = pilot.form().view();
    assert_eq!(view.title.as_deref(), Some("Feedback"));
    assert_eq!(view.submit.label, "Send");

    pilot.type_text("ada@example.com");
    let SubmitOutcome::Invalid(result) = pilot.submit().unwrap() else {
        panic!("expected invalid");
    };
    assert_eq!(result.error("stars"), Some("Pick a rating"));
    assert_eq!(pilot.form().focused_field(), Some("stars"));

    pilot.press_key(Key::Char('3')).unwrap();
    assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
    assert_eq!(submissions.last().get("stars"), Some(&FieldValue::Number(3)));
}
