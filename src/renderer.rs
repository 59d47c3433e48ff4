//! The form renderer: descriptors + schema + submit callback in, an
//! interactive form out.
//!
//! [`FormRenderer`] owns the value store, one control per field, the focus
//! chain, and the current validation errors. It is headless: [`view`] reports
//! what would be shown and [`render`] draws it into strips. The terminal loop
//! lives in [`FormApp`](crate::app::FormApp).
//!
//! [`view`]: FormRenderer::view
//! [`render`]: FormRenderer::render

use tracing::{debug, info, warn};

use crate::controls::{Control, ControlRegistry, ControlResponse};
use crate::error::{ConfigError, DescriptorError, SubmitCallbackError, SubmitError, UnknownField};
use crate::event::{BindingAction, InputEvent, Key, KeyBindingRegistry, KeyEvent};
use crate::focus::{FocusChain, FocusTarget};
use crate::form::config::{check_descriptors, reject, FormConfig, FormDocument, Revalidate};
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::schema::{AsyncSchemaValidator, SchemaValidator, ValidationResult};
use crate::form::store::{Derived, Subscription, ValueStore};
use crate::form::value::{FieldValue, FormValues};
use crate::form::visibility;
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};
use crate::widgets::SubmitButton;

/// Columns controls and messages are indented under their label.
const INDENT: i32 = 2;

/// The caller's submit callback.
pub type SubmitCallback = Box<dyn FnMut(&FormValues) -> Result<(), SubmitCallbackError>>;

// ---------------------------------------------------------------------------
// Outcomes and views
// ---------------------------------------------------------------------------

/// How a submit attempt ended, when it did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed and the callback returned `Ok`.
    Submitted,
    /// Validation failed; the callback was not called.
    Invalid(ValidationResult),
    /// An async validation is still running; the attempt was rejected.
    Pending,
    /// The async submission was invalidated (by reset) before it completed.
    Discarded,
}

/// An in-flight async submission, from [`FormRenderer::begin_submit`].
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    values: FormValues,
}

impl SubmitTicket {
    /// The values being validated. These are what the callback receives.
    pub fn values(&self) -> &FormValues {
        &self.values
    }
}

/// One visible field, as the user sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub value: Option<FieldValue>,
    pub error: Option<String>,
    pub focused: bool,
}

/// The submit button, as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub disabled: bool,
    pub focused: bool,
}

/// Everything the form shows, without terminal details.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub title: Option<String>,
    /// Visible fields in descriptor order.
    pub fields: Vec<FieldView>,
    /// Form-level message shown above the button, e.g. for errors on
    /// hidden fields.
    pub notice: Option<String>,
    pub submit: ButtonView,
}

impl FormView {
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Clears the pending state of an async submission whose future was
/// dropped before it resolved.
struct PendingGuard<'a> {
    form: &'a mut FormRenderer,
    generation: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.form.pending == Some(self.generation) {
            debug!(generation = self.generation, "async submission cancelled");
            self.form.set_pending(None);
        }
    }
}

// ---------------------------------------------------------------------------
// FormRenderer
// ---------------------------------------------------------------------------

/// A mounted form.
///
/// # Examples
///
/// ```ignore
/// let fields = vec![
///     FieldDescriptor::new("email", "Email", FieldType::Email),
///     FieldDescriptor::new("tos", "Accept terms", FieldType::Checkbox),
/// ];
/// let schema = Schema::new()
///     .field("email", [Rule::Required, Rule::Email])
///     .field("tos", [Rule::Checked]);
/// let mut form = FormRenderer::new(fields, schema, |values| {
///     println!("{}", values.to_json()?);
///     Ok(())
/// })?;
/// ```
pub struct FormRenderer {
    fields: Vec<FieldDescriptor>,
    controls: Vec<Box<dyn Control>>,
    schema: Box<dyn SchemaValidator>,
    on_submit: SubmitCallback,
    config: FormConfig,
    store: ValueStore,
    visibility: Derived<Vec<bool>>,
    /// Visibility the focus chain was last built from.
    shown: Vec<bool>,
    /// Fields that have been visible at least once.
    mounted: Vec<bool>,
    errors: ValidationResult,
    attempted: bool,
    submitted: bool,
    /// Generation of the in-flight async submission.
    pending: Option<u64>,
    generation: u64,
    focus: FocusChain,
    button: SubmitButton,
    bindings: KeyBindingRegistry,
    should_quit: bool,
}

impl FormRenderer {
    /// Mount a form using the built-in controls.
    pub fn new(
        fields: Vec<FieldDescriptor>,
        schema: impl SchemaValidator + 'static,
        on_submit: impl FnMut(&FormValues) -> Result<(), SubmitCallbackError> + 'static,
    ) -> Result<Self, ConfigError> {
        Self::with_registry(fields, schema, on_submit, &ControlRegistry::with_defaults())
    }

    /// Mount a form whose controls come from `registry`.
    ///
    /// Every descriptor problem is reported at once; nothing is mounted if
    /// there is any.
    pub fn with_registry(
        fields: Vec<FieldDescriptor>,
        schema: impl SchemaValidator + 'static,
        on_submit: impl FnMut(&FormValues) -> Result<(), SubmitCallbackError> + 'static,
        registry: &ControlRegistry,
    ) -> Result<Self, ConfigError> {
        check_descriptors(&fields, |t| registry.contains(t)).map_err(reject)?;

        let mut controls = Vec::with_capacity(fields.len());
        for field in &fields {
            let control = registry.build(field).ok_or_else(|| {
                reject(vec![DescriptorError::NoControl {
                    field: field.name.clone(),
                    field_type: field.field_type,
                }])
            })?;
            controls.push(control);
        }

        let store = ValueStore::new(FormValues::new());
        let descriptors = fields.clone();
        let visibility = store.derive(move |values| visibility::evaluate(&descriptors, values));

        let config = FormConfig::default();
        let count = fields.len();
        let mut form = Self {
            fields,
            controls,
            schema: Box::new(schema),
            on_submit: Box::new(on_submit),
            button: SubmitButton::new(config.submit_label.clone()),
            config,
            store,
            visibility,
            shown: vec![false; count],
            mounted: vec![false; count],
            errors: ValidationResult::new(),
            attempted: false,
            submitted: false,
            pending: None,
            generation: 0,
            focus: FocusChain::new(),
            bindings: KeyBindingRegistry::with_defaults(),
            should_quit: false,
        };
        form.refresh();
        form.rebuild_focus();
        form.focus.focus_next();
        debug!(fields = count, "form mounted");
        Ok(form)
    }

    /// Mount a form loaded with [`FormDocument::from_json`].
    pub fn from_document(
        document: FormDocument,
        on_submit: impl FnMut(&FormValues) -> Result<(), SubmitCallbackError> + 'static,
    ) -> Result<Self, ConfigError> {
        let FormDocument {
            config,
            fields,
            schema,
        } = document;
        Ok(Self::new(fields, schema, on_submit)?.with_config(config))
    }

    /// Replace the settings (builder).
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.button = SubmitButton::new(config.submit_label.clone()).disabled(self.pending.is_some());
        self.config = config;
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Key bindings, for adding or removing shortcuts.
    pub fn bindings_mut(&mut self) -> &mut KeyBindingRegistry {
        &mut self.bindings
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    // -----------------------------------------------------------------------
    // Values
    // -----------------------------------------------------------------------

    /// Snapshot of the current values.
    pub fn values(&self) -> FormValues {
        self.store.snapshot()
    }

    pub fn value(&self, name: &str) -> Option<FieldValue> {
        self.store.get(name)
    }

    /// Number of value changes since mount.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Call `f(values, version)` now and after every value change.
    pub fn watch(&self, f: impl FnMut(&FormValues, u64) + 'static) -> Subscription {
        self.store.subscribe(f)
    }

    pub fn unwatch(&self, subscription: Subscription) -> bool {
        self.store.unsubscribe(subscription)
    }

    /// Set a field's value as if the user had entered it.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), UnknownField> {
        let idx = self.index_of(name)?;
        let value = value.into();
        self.controls[idx].sync(Some(&value));
        self.apply_change(idx, Some(value));
        Ok(())
    }

    /// Make a field undefined.
    pub fn clear_value(&mut self, name: &str) -> Result<(), UnknownField> {
        let idx = self.index_of(name)?;
        self.controls[idx].sync(None);
        self.apply_change(idx, None);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Visibility and focus
    // -----------------------------------------------------------------------

    /// Whether `name` is currently shown. Unknown names are not.
    pub fn is_visible(&self, name: &str) -> bool {
        self.index_of(name)
            .map(|idx| self.store.read(self.visibility)[idx])
            .unwrap_or(false)
    }

    /// Names of the visible fields, in descriptor order.
    pub fn visible_fields(&self) -> Vec<&str> {
        let visible = self.store.read(self.visibility);
        self.fields
            .iter()
            .zip(visible)
            .filter(|(_, shown)| *shown)
            .map(|(f, _)| f.name.as_str())
            .collect()
    }

    /// Move focus to a visible field. Returns `false` if it cannot take focus.
    pub fn focus_field(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Ok(idx) => self.focus.focus(FocusTarget::Field(idx)),
            Err(_) => false,
        }
    }

    /// Move focus to the submit button.
    pub fn focus_submit(&mut self) -> bool {
        self.focus.focus(FocusTarget::Submit)
    }

    pub fn focused(&self) -> Option<FocusTarget> {
        self.focus.current()
    }

    /// Name of the focused field, if focus is on a field.
    pub fn focused_field(&self) -> Option<&str> {
        match self.focus.current()? {
            FocusTarget::Field(idx) => Some(self.fields[idx].name.as_str()),
            FocusTarget::Submit => None,
        }
    }

    /// The control of `name`, e.g. for downcasting with `as_any`.
    pub fn control(&self, name: &str) -> Option<&dyn Control> {
        let idx = self.index_of(name).ok()?;
        Some(self.controls[idx].as_ref())
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Current errors, including those of hidden fields.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// Fields whose errors block submission while they are hidden.
    pub fn hidden_errors(&self) -> Vec<&str> {
        self.errors
            .iter()
            .map(|(field, _)| field)
            .filter(|field| self.index_of(field).is_ok() && !self.is_visible(field))
            .collect()
    }

    /// The message shown under `name`. Hidden fields show nothing.
    pub fn error(&self, name: &str) -> Option<&str> {
        if !self.is_visible(name) {
            return None;
        }
        self.errors.error(name)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether the last submit reached the callback successfully.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Whether an async validation is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Feed one input event. Returns the submit outcome when the event
    /// triggered a submission.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<Option<SubmitOutcome>, SubmitError> {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(text) => {
                if let Some(FocusTarget::Field(idx)) = self.focus.current() {
                    let value = self.store.get(&self.fields[idx].name);
                    let response = self.controls[idx].handle_paste(&text, value.as_ref());
                    self.apply_response(idx, response);
                }
                Ok(None)
            }
            InputEvent::Resize { .. } | InputEvent::Ignored => Ok(None),
        }
    }

    /// Feed one key press.
    ///
    /// Bindings (Tab, Ctrl+S, ...) take precedence; other keys go to the
    /// focused control. Enter on the submit button submits.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Option<SubmitOutcome>, SubmitError> {
        if let Some(action) = self.bindings.resolve(&key) {
            return self.run_action(action);
        }

        match self.focus.current() {
            Some(FocusTarget::Field(idx)) => {
                let value = self.store.get(&self.fields[idx].name);
                let response = self.controls[idx].handle_key(&key, value.as_ref());
                if response == ControlResponse::Ignored && key.code == Key::Enter {
                    self.focus.focus_next();
                }
                self.apply_response(idx, response);
                Ok(None)
            }
            Some(FocusTarget::Submit)
                if key.modifiers.is_empty() && matches!(key.code, Key::Enter | Key::Char(' ')) =>
            {
                self.submit().map(Some)
            }
            _ => Ok(None),
        }
    }

    fn run_action(&mut self, action: BindingAction) -> Result<Option<SubmitOutcome>, SubmitError> {
        match action {
            BindingAction::Quit => {
                debug!("quit requested");
                self.should_quit = true;
            }
            BindingAction::FocusNext => {
                self.focus.focus_next();
            }
            BindingAction::FocusPrevious => {
                self.focus.focus_previous();
            }
            BindingAction::Submit => return self.submit().map(Some),
            BindingAction::Reset => self.reset(),
        }
        Ok(None)
    }

    fn apply_response(&mut self, idx: usize, response: ControlResponse) {
        if let ControlResponse::Changed(value) = response {
            self.apply_change(idx, value);
        }
    }

    /// Write one field's value and bring visibility and errors up to date.
    fn apply_change(&mut self, idx: usize, value: Option<FieldValue>) {
        let name = self.fields[idx].name.clone();
        let changed = match value {
            Some(value) => self.store.set(&name, value),
            None => self.store.remove(&name),
        };
        if !changed {
            return;
        }
        debug!(field = %name, version = self.store.version(), "value changed");
        self.refresh();
        self.revalidate(&name);
    }

    /// Bring shown errors up to date after `changed` was edited.
    ///
    /// Every shown error is rechecked, since rules such as `Matches` or
    /// `RequiredWhen` read other fields. Only the edited field can gain a
    /// new error, and only under `OnChange`.
    fn revalidate(&mut self, changed: &str) {
        if !self.attempted {
            return;
        }
        let fresh = self.schema.validate(&self.store.snapshot());
        let on_change = self.config.revalidate == Revalidate::OnChange;
        let shown: Vec<String> = self.errors.iter().map(|(field, _)| field.to_owned()).collect();
        for field in &shown {
            if fresh.error(field).is_none() {
                debug!(field = %field, "error cleared");
                self.errors.clear(field);
            } else if on_change {
                self.errors.take_field_from(&fresh, field);
            }
        }
        if on_change {
            self.errors.take_field_from(&fresh, changed);
        }
    }

    /// Apply mount defaults to newly visible fields until visibility settles,
    /// then rebuild focus if anything was shown or hidden.
    fn refresh(&mut self) {
        let visible = loop {
            let visible = self.store.read(self.visibility);
            if !self.mount_new(&visible) {
                break visible;
            }
        };
        if visible == self.shown {
            return;
        }
        for (field, (&now, &before)) in self.fields.iter().zip(visible.iter().zip(&self.shown)) {
            if now != before {
                debug!(field = %field.name, visible = now, "visibility changed");
            }
        }
        self.shown = visible;
        self.rebuild_focus();
    }

    /// Give each field that just became visible for the first time its
    /// control's default value. Returns whether any value changed.
    fn mount_new(&mut self, visible: &[bool]) -> bool {
        let mut changed = false;
        for (idx, &shown) in visible.iter().enumerate() {
            if !shown || self.mounted[idx] {
                continue;
            }
            self.mounted[idx] = true;
            let name = &self.fields[idx].name;
            if self.store.get(name).is_some() {
                continue;
            }
            if let Some(default) = self.controls[idx].default_value() {
                self.controls[idx].sync(Some(&default));
                changed |= self.store.set(name, default);
            }
        }
        changed
    }

    fn rebuild_focus(&mut self) {
        let mut targets: Vec<FocusTarget> = self
            .shown
            .iter()
            .enumerate()
            .filter(|&(idx, &shown)| shown && self.controls[idx].can_focus())
            .map(|(idx, _)| FocusTarget::Field(idx))
            .collect();
        if self.button.can_focus() {
            targets.push(FocusTarget::Submit);
        }
        self.focus.rebuild(targets);
    }

    fn index_of(&self, name: &str) -> Result<usize, UnknownField> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| UnknownField(name.to_owned()))
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Validate the current values and, if they pass, call the submit callback
    /// exactly once with them.
    ///
    /// A callback error comes back as [`SubmitError::Callback`], untouched;
    /// the form stays usable.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if self.pending.is_some() {
            debug!("submit rejected: validation pending");
            return Ok(SubmitOutcome::Pending);
        }
        let values = self.store.snapshot();
        let result = self.schema.validate(&values);
        self.finish_submit(values, result)
    }

    /// Start an async submission. Returns `None` while one is already pending.
    ///
    /// Until [`complete_submit`](Self::complete_submit) is called (or the
    /// form is reset) further submits return [`SubmitOutcome::Pending`].
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if self.pending.is_some() {
            debug!("submit rejected: validation pending");
            return None;
        }
        self.generation += 1;
        self.set_pending(Some(self.generation));
        debug!(generation = self.generation, "async validation started");
        Some(SubmitTicket {
            generation: self.generation,
            values: self.store.snapshot(),
        })
    }

    /// Apply the result of an async validation started by
    /// [`begin_submit`](Self::begin_submit).
    ///
    /// A ticket invalidated by [`reset`](Self::reset) is dropped without side
    /// effects and yields [`SubmitOutcome::Discarded`].
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: ValidationResult,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self.pending != Some(ticket.generation) {
            debug!(generation = ticket.generation, "stale validation result discarded");
            return Ok(SubmitOutcome::Discarded);
        }
        self.set_pending(None);
        self.finish_submit(ticket.values, result)
    }

    /// Validate with the schema, then with `validator`, and submit.
    ///
    /// The async check only runs when the schema passes. It is bounded by
    /// [`FormConfig::async_timeout`]; a timeout leaves the form unsubmitted
    /// and ready for another attempt.
    pub async fn submit_async<V: AsyncSchemaValidator>(
        &mut self,
        validator: &V,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self.pending.is_some() {
            debug!("submit rejected: validation pending");
            return Ok(SubmitOutcome::Pending);
        }
        let sync_result = self.schema.validate(&self.store.snapshot());
        if !sync_result.is_valid() {
            return self.finish_submit(self.store.snapshot(), sync_result);
        }

        let Some(ticket) = self.begin_submit() else {
            return Ok(SubmitOutcome::Pending);
        };
        let timeout = self.config.async_timeout();
        let mut guard = PendingGuard {
            generation: ticket.generation,
            form: self,
        };
        let validated = tokio::time::timeout(timeout, validator.validate(ticket.values())).await;
        match validated {
            Ok(result) => guard.form.complete_submit(ticket, result),
            Err(_) => {
                warn!(?timeout, "async validation timed out");
                guard.form.set_pending(None);
                Err(SubmitError::ValidationTimeout(timeout))
            }
        }
    }

    fn finish_submit(
        &mut self,
        values: FormValues,
        result: ValidationResult,
    ) -> Result<SubmitOutcome, SubmitError> {
        self.attempted = true;
        self.submitted = false;

        if !result.is_valid() {
            for (field, message) in result.iter() {
                debug!(field, message, hidden = !self.is_visible(field), "validation failed");
            }
            self.errors = result.clone();
            self.focus_first_error();
            return Ok(SubmitOutcome::Invalid(result));
        }

        self.errors = ValidationResult::new();
        match (self.on_submit)(&values) {
            Ok(()) => {
                self.submitted = true;
                info!(fields = values.len(), "form submitted");
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(error = %err, "submit callback failed");
                Err(SubmitError::Callback(err))
            }
        }
    }

    fn focus_first_error(&mut self) {
        let visible = self.store.read(self.visibility);
        let first = self
            .fields
            .iter()
            .enumerate()
            .find(|(idx, f)| visible[*idx] && self.errors.error(&f.name).is_some());
        if let Some((idx, _)) = first {
            self.focus.focus(FocusTarget::Field(idx));
        }
    }

    fn set_pending(&mut self, pending: Option<u64>) {
        self.pending = pending;
        self.button.set_disabled(pending.is_some());
        self.rebuild_focus();
    }

    /// Back to the mounted state: values cleared to mount defaults, no
    /// errors, not submitted, and any pending async submission discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.button.set_disabled(false);
        self.errors = ValidationResult::new();
        self.attempted = false;
        self.submitted = false;
        self.mounted.iter_mut().for_each(|m| *m = false);
        self.store.replace(FormValues::new());
        for control in &mut self.controls {
            control.sync(None);
        }
        self.refresh();
        self.rebuild_focus();
        if self.focus.current().is_none() {
            self.focus.focus_next();
        }
        debug!(version = self.store.version(), "form reset");
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// What the form currently shows.
    pub fn view(&self) -> FormView {
        let focused = self.focus.current();
        let fields = self
            .visible_indices()
            .map(|idx| {
                let field = &self.fields[idx];
                FieldView {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    field_type: field.field_type,
                    value: self.store.get(&field.name),
                    error: self.errors.error(&field.name).map(str::to_owned),
                    focused: focused == Some(FocusTarget::Field(idx)),
                }
            })
            .collect();
        FormView {
            title: self.config.title.clone(),
            fields,
            notice: self.notice(),
            submit: ButtonView {
                label: self.button.label().to_owned(),
                disabled: self.button.is_disabled(),
                focused: focused == Some(FocusTarget::Submit),
            },
        }
    }

    /// Rows needed to draw the whole form.
    pub fn height(&self) -> i32 {
        let title = if self.config.title.is_some() { 2 } else { 0 };
        let fields: i32 = self.visible_indices().map(|idx| self.field_height(idx) + 1).sum();
        let notice = i32::from(self.notice().is_some());
        title + fields + notice + 1
    }

    /// Draw the form top-down into `region`.
    ///
    /// Each visible field gets its label, its control (indented), and its
    /// error message directly below, followed by a blank row.
    pub fn render(&self, region: Region) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let mut strips = Vec::new();
        let mut y = region.y;
        let focused = self.focus.current();

        if let Some(title) = &self.config.title {
            strips.push(Strip::text(y, region.x, title, CellStyle::label().fg("cyan"), region.width));
            y += 2;
        }

        for idx in self.visible_indices() {
            let field = &self.fields[idx];
            let control = &self.controls[idx];
            let is_focused = focused == Some(FocusTarget::Field(idx));

            let mut body = Region::new(region.x, y, region.width, control.height());
            if !control.draws_label() {
                let label_style = if is_focused {
                    CellStyle::label().fg("cyan")
                } else {
                    CellStyle::label()
                };
                strips.push(Strip::text(y, region.x, &field.label, label_style, region.width));
                y += 1;
                body = Region::new(region.x, y, region.width, control.height()).indent(INDENT);
            }

            let value = self.store.get(&field.name);
            strips.extend(control.render(body, value.as_ref(), is_focused));
            y += control.height();

            if let Some(message) = self.errors.error(&field.name) {
                let at = Region::new(region.x, y, region.width, 1).indent(INDENT);
                strips.push(Strip::text(y, at.x, message, CellStyle::error(), at.width));
                y += 1;
            }
            y += 1;
        }

        if let Some(notice) = self.notice() {
            strips.push(Strip::text(y, region.x, &notice, CellStyle::error(), region.width));
            y += 1;
        }

        let button_region = Region::new(region.x, y, region.width, 1);
        strips.extend(self.button.render(button_region, focused == Some(FocusTarget::Submit)));
        strips.retain(|s| s.y < region.bottom());
        strips
    }

    /// Names the hidden fields whose errors block submission.
    fn notice(&self) -> Option<String> {
        let labels: Vec<&str> = self
            .hidden_errors()
            .into_iter()
            .filter_map(|name| self.index_of(name).ok())
            .map(|idx| self.fields[idx].label.as_str())
            .collect();
        if labels.is_empty() {
            return None;
        }
        Some(format!("Hidden fields need attention: {}", labels.join(", ")))
    }

    fn field_height(&self, idx: usize) -> i32 {
        let control = &self.controls[idx];
        let label = i32::from(!control.draws_label());
        let error = i32::from(self.errors.error(&self.fields[idx].name).is_some());
        label + control.height() + error
    }

    fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.shown
            .iter()
            .enumerate()
            .filter(|(_, shown)| **shown)
            .map(|(idx, _)| idx)
    }
}

impl std::fmt::Debug for FormRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRenderer")
            .field("fields", &self.fields.len())
            .field("store", &self.store)
            .field("errors", &self.errors)
            .field("focus", &self.focus.current())
            .field("pending", &self.pending)
            .field("submitted", &self.submitted)
            .finish()
    }
}
