//! File selection control.
//!
//! The terminal has no file dialog, so the user types a path. Enter commits
//! it as a [`FileHandle`]; Enter on an empty path clears the selection.

use std::any::Any;

use crate::controls::text::{render_line, EditBuffer};
use crate::controls::{value_style, Control, ControlResponse};
use crate::event::{Key, KeyEvent};
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::value::{FieldValue, FileHandle};
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

#[derive(Debug)]
pub struct FilePicker {
    placeholder: String,
    path: EditBuffer,
}

impl FilePicker {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            placeholder: field
                .placeholder
                .clone()
                .unwrap_or_else(|| "Type a path, then Enter".to_owned()),
            path: EditBuffer::new(),
        }
    }

    /// The path typed so far.
    pub fn pending_path(&self) -> &str {
        self.path.text()
    }
}

fn describe(file: &FileHandle) -> String {
    match file.size {
        Some(size) => format!("{} ({size} bytes)", file.name),
        None => file.name.clone(),
    }
}

impl Control for FilePicker {
    fn field_type(&self) -> FieldType {
        FieldType::File
    }

    fn sync(&mut self, value: Option<&FieldValue>) {
        match value.and_then(FieldValue::as_file) {
            Some(file) => self.path.set_text(file.path.to_string_lossy()),
            None => self.path.clear(),
        }
    }

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let strip = if focused {
            render_line(
                region,
                self.path.text(),
                Some(self.path.cursor_chars()),
                value_style(true),
            )
        } else {
            match value.and_then(FieldValue::as_file) {
                Some(file) => render_line(region, &describe(file), None, CellStyle::new()),
                None => render_line(region, &self.placeholder, None, CellStyle::hint()),
            }
        };
        vec![strip]
    }

    fn handle_key(&mut self, key: &KeyEvent, _value: Option<&FieldValue>) -> ControlResponse {
        if key.code == Key::Enter && key.modifiers.is_empty() {
            let path = self.path.text().trim();
            if path.is_empty() {
                return ControlResponse::Changed(None);
            }
            let file = FileHandle::from_path(path);
            tracing::debug!(path = %file.path.display(), size = ?file.size, "file selected");
            return ControlResponse::Changed(Some(FieldValue::File(file)));
        }
        if let Some(ch) = key.typed_char() {
            self.path.insert_char(ch);
            return ControlResponse::Consumed;
        }
        match self.path.apply_edit_key(key.code) {
            Some(_) => ControlResponse::Consumed,
            None => ControlResponse::Ignored,
        }
    }

    fn handle_paste(&mut self, text: &str, _value: Option<&FieldValue>) -> ControlResponse {
        self.path.insert_str(text.trim_end_matches(['\n', '\r']));
        ControlResponse::Consumed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker() -> FilePicker {
        FilePicker::new(&FieldDescriptor::new("cv", "CV", FieldType::File))
    }

    fn type_path(picker: &mut FilePicker, path: &str) {
        for ch in path.chars() {
            assert_eq!(
                picker.handle_key(&KeyEvent::plain(Key::Char(ch)), None),
                ControlResponse::Consumed
            );
        }
    }

    #[test]
    fn enter_commits_a_file_handle() {
        let mut picker = picker();
        type_path(&mut picker, "/tmp/none/cv.pdf");
        let response = picker.handle_key(&KeyEvent::plain(Key::Enter), None);
        let ControlResponse::Changed(Some(FieldValue::File(file))) = response else {
            panic!("expected a file, got {response:?}");
        };
        assert_eq!(file.name, "cv.pdf");
    }

    #[test]
    fn enter_on_empty_clears() {
        let mut picker = picker();
        assert_eq!(
            picker.handle_key(&KeyEvent::plain(Key::Enter), None),
            ControlResponse::Changed(None)
        );
    }

    #[test]
    fn unfocused_shows_selection_or_placeholder() {
        let picker = picker();
        let empty = picker.render(Region::new(0, 0, 30, 1), None, false);
        assert_eq!(empty[0].plain_text().trim_end(), "Type a path, then Enter");

        let file = FieldValue::File(FileHandle {
            path: "/x/cv.pdf".into(),
            name: "cv.pdf".into(),
            size: Some(42),
        });
        let chosen = picker.render(Region::new(0, 0, 30, 1), Some(&file), false);
        assert_eq!(chosen[0].plain_text().trim_end(), "cv.pdf (42 bytes)");
    }

    #[test]
    fn sync_loads_existing_path() {
        let mut picker = picker();
        picker.sync(Some(&FieldValue::File(FileHandle::from_path("/a/b.txt"))));
        assert_eq!(picker.pending_path(), "/a/b.txt");
    }
}
