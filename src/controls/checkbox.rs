//! Checkbox control.

use std::any::Any;

use crate::controls::{Control, ControlResponse};
use crate::event::{Key, KeyEvent};
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

/// `[x] Label`. Space or Enter toggles. Starts unchecked.
#[derive(Debug)]
pub struct Checkbox {
    label: String,
}

impl Checkbox {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            label: field.label.clone(),
        }
    }
}

impl Control for Checkbox {
    fn field_type(&self) -> FieldType {
        FieldType::Checkbox
    }

    fn draws_label(&self) -> bool {
        true
    }

    fn default_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Bool(false))
    }

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let checked = value.and_then(FieldValue::as_bool).unwrap_or(false);
        let mark = if checked { "[x]" } else { "[ ]" };
        let box_style = if focused {
            CellStyle::focused()
        } else {
            CellStyle::new()
        };
        let mut strip = Strip::new(region.y, region.x);
        strip.push_str(mark, box_style);
        strip.push(' ', CellStyle::new());
        strip.push_str(&self.label, CellStyle::label());
        strip.fill(region.width, CellStyle::new());
        vec![strip]
    }

    fn handle_key(&mut self, key: &KeyEvent, value: Option<&FieldValue>) -> ControlResponse {
        match key.code {
            Key::Char(' ') | Key::Enter if key.modifiers.is_empty() => {
                let checked = value.and_then(FieldValue::as_bool).unwrap_or(false);
                ControlResponse::Changed(Some(FieldValue::Bool(!checked)))
            }
            _ => ControlResponse::Ignored,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
