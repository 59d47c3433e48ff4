//! Pilot: programmatic interaction with a headless form.
//!
//! The `Pilot` wraps a [`FormRenderer`] and provides methods to simulate
//! user input (key presses, typing, pasting) and to render the form to text
//! for snapshot testing.

use crate::error::{SubmitError, UnknownField};
use crate::event::input::{InputEvent, Key, KeyEvent, Modifiers};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::renderer::{FormRenderer, SubmitOutcome};
use crate::testing::snapshot::strips_to_string;

/// A headless form driver for tests.
///
/// # Examples
///
/// ```ignore
/// use formdeck::testing::Pilot;
/// use formdeck::event::Key;
///
/// let mut pilot = Pilot::new(form);
/// pilot.type_text("ada@example.com");
/// pilot.press_key(Key::Tab);
/// pilot.press_key(Key::Char(' '));
/// assert_eq!(pilot.submit().unwrap(), SubmitOutcome::Submitted);
/// ```
pub struct Pilot {
    form: FormRenderer,
    width: i32,
}

impl Pilot {
    /// Drive `form`, rendering 60 columns wide.
    pub fn new(form: FormRenderer) -> Self {
        Self { form, width: 60 }
    }

    /// Render at a different width (builder pattern).
    pub fn with_width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Simulate a key press with no modifiers.
    pub fn press_key(&mut self, key: Key) -> Result<Option<SubmitOutcome>, SubmitError> {
        self.form.handle_key(KeyEvent::new(key, Modifiers::NONE))
    }

    /// Simulate a key press with the given modifiers.
    pub fn press_key_with(
        &mut self,
        key: Key,
        modifiers: Modifiers,
    ) -> Result<Option<SubmitOutcome>, SubmitError> {
        self.form.handle_key(KeyEvent::new(key, modifiers))
    }

    /// Simulate typing each character of `text` as individual key presses.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            // Plain characters never submit, so there is no outcome to keep.
            let _ = self.press_key(Key::Char(ch));
        }
    }

    /// Simulate a bracketed paste into the focused control.
    pub fn paste(&mut self, text: &str) {
        let _ = self.form.handle_input(InputEvent::Paste(text.to_owned()));
    }

    /// Press Tab `times` times.
    pub fn tab(&mut self, times: usize) {
        for _ in 0..times {
            let _ = self.press_key(Key::Tab);
        }
    }

    /// Focus a field by name. Returns `false` if it is hidden or unknown.
    pub fn focus(&mut self, name: &str) -> bool {
        self.form.focus_field(name)
    }

    /// Set a value directly, bypassing the control.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), UnknownField> {
        self.form.set_value(name, value)
    }

    /// Submit with Ctrl+S, as a user would.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        let outcome = self.press_key_with(Key::Char('s'), Modifiers::CTRL)?;
        Ok(outcome.unwrap_or(SubmitOutcome::Pending))
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// The whole form as plain text, trailing spaces trimmed.
    pub fn render_text(&self) -> String {
        let height = self.form.height();
        let strips = self.form.render(Region::new(0, 0, self.width, height));
        strips_to_string(&strips, self.width, height)
    }

    pub fn form(&self) -> &FormRenderer {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormRenderer {
        &mut self.form
    }

    pub fn into_form(self) -> FormRenderer {
        self.form
    }
}
