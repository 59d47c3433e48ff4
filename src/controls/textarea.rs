//! Multi-line text control.

use std::any::Any;

use crate::controls::text::{render_line, EditBuffer};
use crate::controls::{value_style, Control, ControlResponse};
use crate::event::{Key, KeyEvent};
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

/// Visible rows of a text area.
pub const TEXTAREA_ROWS: i32 = 3;

/// Multi-line input. Enter inserts a newline; the view scrolls to keep the
/// cursor line visible.
#[derive(Debug)]
pub struct TextArea {
    placeholder: String,
    buffer: EditBuffer,
}

impl TextArea {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            placeholder: field.placeholder.clone().unwrap_or_default(),
            buffer: EditBuffer::new(),
        }
    }

    /// (line, column) of the cursor, both counted in characters.
    fn cursor_position(&self) -> (usize, usize) {
        let before = &self.buffer.text()[..self.buffer.cursor()];
        let line = before.matches('\n').count();
        let col = before.rsplit('\n').next().unwrap_or("").chars().count();
        (line, col)
    }

    fn changed(&self) -> ControlResponse {
        ControlResponse::Changed(Some(FieldValue::Text(self.buffer.text().to_owned())))
    }
}

impl Control for TextArea {
    fn field_type(&self) -> FieldType {
        FieldType::Textarea
    }

    fn height(&self) -> i32 {
        TEXTAREA_ROWS
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
        let rows = region.height.min(TEXTAREA_ROWS).max(0) as usize;
        let (cursor_line, cursor_col) = self.cursor_position();

        if text.is_empty() && !self.placeholder.is_empty() {
            let mut strips = vec![render_line(
                region,
                &self.placeholder,
                focused.then_some(0),
                CellStyle::hint(),
            )];
            for row in 1..rows {
                let mut strip = Strip::new(region.y + row as i32, region.x);
                strip.fill(region.width, CellStyle::new());
                strips.push(strip);
            }
            return strips;
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let first = if focused && cursor_line >= rows {
            cursor_line + 1 - rows
        } else {
            0
        };
        (0..rows)
            .map(|row| {
                let line_idx = first + row;
                let line = lines.get(line_idx).copied().unwrap_or("");
                let cursor = (focused && line_idx == cursor_line).then_some(cursor_col);
                let line_region = Region::new(region.x, region.y + row as i32, region.width, 1);
                render_line(line_region, line, cursor, value_style(focused))
            })
            .collect()
    }

    fn handle_key(&mut self, key: &KeyEvent, value: Option<&FieldValue>) -> ControlResponse {
        self.sync(value);
        if key.code == Key::Enter && key.modifiers.is_empty() {
            self.buffer.insert_char('\n');
            return self.changed();
        }
        if let Some(ch) = key.typed_char() {
            if ch.is_control() {
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
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.is_empty() {
            return ControlResponse::Consumed;
        }
        self.buffer.insert_str(&text);
        self.changed()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
