//! Single-line text controls: text, email, password, and date fields.

use std::any::Any;

use crate::controls::{value_style, Control, ControlResponse};
use crate::event::{Key, KeyEvent};
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

const DATE_LEN: usize = 10;

// ---------------------------------------------------------------------------
// EditBuffer
// ---------------------------------------------------------------------------

/// Text being edited plus a cursor.
///
/// The cursor is a byte offset into the text. All cursor operations are
/// char-boundary safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position (byte offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text, moving the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Delete the character before the cursor. Returns whether anything changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.prev_boundary();
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    /// Delete the character after the cursor. Returns whether anything changed.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        let next = self.next_boundary();
        self.text.drain(self.cursor..next);
        true
    }

    pub fn left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_boundary();
        }
    }

    pub fn right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.next_boundary();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Number of characters before the cursor.
    pub fn cursor_chars(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    fn prev_boundary(&self) -> usize {
        let mut pos = self.cursor.saturating_sub(1);
        while pos > 0 && !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn next_boundary(&self) -> usize {
        let mut pos = self.cursor + 1;
        while pos < self.text.len() && !self.text.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }

    /// Apply a navigation or deletion key shared by every text control.
    ///
    /// Returns `Some(changed)` when the key was an editing key.
    pub(crate) fn apply_edit_key(&mut self, key: Key) -> Option<bool> {
        match key {
            Key::Backspace => Some(self.backspace()),
            Key::Delete => Some(self.delete()),
            Key::Left => {
                self.left();
                Some(false)
            }
            Key::Right => {
                self.right();
                Some(false)
            }
            Key::Home => {
                self.home();
                Some(false)
            }
            Key::End => {
                self.end();
                Some(false)
            }
            _ => None,
        }
    }
}

/// Draw `display` in one row, with the cursor cell reversed when focused.
pub(crate) fn render_line(
    region: Region,
    display: &str,
    cursor_col: Option<usize>,
    style: CellStyle,
) -> Strip {
    let width = region.width.max(0) as usize;
    let chars: Vec<char> = display.chars().collect();
    // Scroll so the cursor stays inside the region.
    let start = match cursor_col {
        Some(col) if width > 0 && col >= width => col + 1 - width,
        _ => 0,
    };
    let mut strip = Strip::new(region.y, region.x);
    for (i, &ch) in chars.iter().enumerate().skip(start).take(width) {
        let cell_style = if cursor_col == Some(i) {
            style.clone().reverse()
        } else {
            style.clone()
        };
        strip.push(ch, cell_style);
    }
    if let Some(col) = cursor_col {
        if col >= chars.len() && strip.width() < region.width {
            strip.push(' ', style.clone().reverse());
        }
    }
    strip.fill(region.width, style);
    strip
}

// ---------------------------------------------------------------------------
// TextInput
// ---------------------------------------------------------------------------

/// One-line input for text, email, password (masked), and date fields.
///
/// Date fields accept digits and `-` only, up to `YYYY-MM-DD`.
#[derive(Debug)]
pub struct TextInput {
    field_type: FieldType,
    placeholder: String,
    buffer: EditBuffer,
}

impl TextInput {
    pub fn new(field: &FieldDescriptor) -> Self {
        let placeholder = match (&field.placeholder, field.field_type) {
            (Some(p), _) => p.clone(),
            (None, FieldType::Date) => "YYYY-MM-DD".to_owned(),
            (None, _) => String::new(),
        };
        Self {
            field_type: field.field_type,
            placeholder,
            buffer: EditBuffer::new(),
        }
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    fn accepts(&self, ch: char) -> bool {
        match self.field_type {
            FieldType::Date => {
                (ch.is_ascii_digit() || ch == '-') && self.buffer.text().len() < DATE_LEN
            }
            _ => !ch.is_control(),
        }
    }

    fn changed(&self) -> ControlResponse {
        ControlResponse::Changed(Some(FieldValue::Text(self.buffer.text().to_owned())))
    }
}

impl Control for TextInput {
    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn default_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Text(String::new()))
    }

    fn sync(&mut self, value: Option<&FieldValue>) {
        let text = value.and_then(FieldValue::as_str).unwrap_or_default();
        if text != self.buffer.text() {
            self.buffer.set_text(text);
        }
    }

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let text = value.and_then(FieldValue::as_str).unwrap_or_default();
        let cursor = focused.then(|| self.buffer.cursor_chars());
        let strip = if text.is_empty() && !self.placeholder.is_empty() {
            render_line(region, &self.placeholder, cursor.map(|_| 0), CellStyle::hint())
        } else if self.field_type == FieldType::Password {
            let masked = "\u{2022}".repeat(text.chars().count());
            render_line(region, &masked, cursor, value_style(focused))
        } else {
            render_line(region, text, cursor, value_style(focused))
        };
        vec![strip]
    }

    fn handle_key(&mut self, key: &KeyEvent, value: Option<&FieldValue>) -> ControlResponse {
        self.sync(value);
        if let Some(ch) = key.typed_char() {
            if !self.accepts(ch) {
                return ControlResponse::Consumed;
            }
            self.buffer.insert_char(ch);
            return self.changed();
        }
        match self.buffer.apply_edit_key(key.code) {
            Some(true) => self.changed(),
            Some(false) => ControlResponse::Consumed,
            None => ControlResponse::Ignored,
        }
    }

    fn handle_paste(&mut self, text: &str, value: Option<&FieldValue>) -> ControlResponse {
        self.sync(value);
        let accepted: String = text
            .chars()
            .filter(|&ch| ch != '\n' && ch != '\r')
            .collect();
        let mut inserted = false;
        for ch in accepted.chars() {
            if self.accepts(ch) {
                self.buffer.insert_char(ch);
                inserted = true;
            }
        }
        if inserted {
            self.changed()
        } else {
            ControlResponse::Consumed
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
