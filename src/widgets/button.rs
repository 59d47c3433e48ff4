//! Submit button.
//!
//! Renders its label in brackets at the left of its row. A disabled button
//! (while an async validation is pending) cannot be focused and is drawn dim.

use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

/// The form's submit button.
///
/// # Examples
///
/// ```ignore
/// let btn = SubmitButton::new("Create account");
/// let waiting = SubmitButton::new("Submit").disabled(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    label: String,
    disabled: bool,
}

impl SubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    /// Set whether the button is disabled (builder pattern).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn can_focus(&self) -> bool {
        !self.disabled
    }

    /// Draw the button in the first row of `region`.
    pub fn render(&self, region: Region, focused: bool) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let style = if self.disabled {
            CellStyle::hint()
        } else if focused {
            CellStyle::focused().bold()
        } else {
            CellStyle::label()
        };
        let text = if self.disabled {
            format!("[ {}\u{2026} ]", self.label)
        } else {
            format!("[ {} ]", self.label)
        };
        let mut strip = Strip::text(region.y, region.x, &text, style, region.width);
        strip.fill(region.width, CellStyle::new());
        vec![strip]
    }
}
