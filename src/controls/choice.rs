//! Option controls: radio groups and selects.

use std::any::Any;

use crate::controls::{Control, ControlResponse};
use crate::event::{Key, KeyEvent};
use crate::form::field::{FieldDescriptor, FieldOption, FieldType};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

fn selected_index(options: &[FieldOption], value: Option<&FieldValue>) -> Option<usize> {
    let value = value.and_then(FieldValue::as_str)?;
    options.iter().position(|o| o.value == value)
}

fn option_value(options: &[FieldOption], idx: usize) -> Option<FieldValue> {
    options.get(idx).map(|o| FieldValue::Text(o.value.clone()))
}

// ---------------------------------------------------------------------------
// RadioGroup
// ---------------------------------------------------------------------------

/// One row per option. Up/Down move the highlight, Space/Enter select.
///
/// No option is selected until the user picks one.
#[derive(Debug)]
pub struct RadioGroup {
    options: Vec<FieldOption>,
    highlighted: usize,
}

impl RadioGroup {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            options: field.options.clone(),
            highlighted: 0,
        }
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }
}

impl Control for RadioGroup {
    fn field_type(&self) -> FieldType {
        FieldType::Radio
    }

    fn height(&self) -> i32 {
        self.options.len().max(1) as i32
    }

    fn sync(&mut self, value: Option<&FieldValue>) {
        if let Some(idx) = selected_index(&self.options, value) {
            self.highlighted = idx;
        }
    }

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip> {
        let selected = selected_index(&self.options, value);
        self.options
            .iter()
            .enumerate()
            .take(region.height.max(0) as usize)
            .map(|(i, option)| {
                let mark = if selected == Some(i) { "(\u{2022})" } else { "( )" };
                let style = if focused && i == self.highlighted {
                    CellStyle::focused()
                } else {
                    CellStyle::new()
                };
                let mut strip = Strip::new(region.y + i as i32, region.x);
                strip.push_str(mark, style.clone());
                strip.push(' ', CellStyle::new());
                strip.push_str(&option.label, style);
                strip.fill(region.width, CellStyle::new());
                strip
            })
            .collect()
    }

    fn handle_key(&mut self, key: &KeyEvent, _value: Option<&FieldValue>) -> ControlResponse {
        if !key.modifiers.is_empty() || self.options.is_empty() {
            return ControlResponse::Ignored;
        }
        match key.code {
            Key::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
                ControlResponse::Consumed
            }
            Key::Down => {
                self.highlighted = (self.highlighted + 1).min(self.options.len() - 1);
                ControlResponse::Consumed
            }
            Key::Char(' ') | Key::Enter => {
                ControlResponse::Changed(option_value(&self.options, self.highlighted))
            }
            _ => ControlResponse::Ignored,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Select
// ---------------------------------------------------------------------------

/// `< Label >` on one row. Arrow keys cycle through options; the first
/// option is selected when the field is shown.
#[derive(Debug)]
pub struct Select {
    options: Vec<FieldOption>,
}

impl Select {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            options: field.options.clone(),
        }
    }
}

impl Control for Select {
    fn field_type(&self) -> FieldType {
        FieldType::Select
    }

    fn default_value(&self) -> Option<FieldValue> {
        option_value(&self.options, 0)
    }

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let label = selected_index(&self.options, value)
            .and_then(|i| self.options.get(i))
            .map_or("", |o| o.label.as_str());
        let style = if focused {
            CellStyle::focused()
        } else {
            CellStyle::new()
        };
        let mut strip = Strip::new(region.y, region.x);
        strip.push_str(&format!("< {label} >"), style);
        strip.fill(region.width, CellStyle::new());
        vec![strip]
    }

    fn handle_key(&mut self, key: &KeyEvent, value: Option<&FieldValue>) -> ControlResponse {
        if !key.modifiers.is_empty() || self.options.is_empty() {
            return ControlResponse::Ignored;
        }
        let len = self.options.len();
        let current = selected_index(&self.options, value);
        let next = match key.code {
            Key::Right | Key::Down => current.map_or(0, |i| (i + 1) % len),
            Key::Left | Key::Up => current.map_or(len - 1, |i| (i + len - 1) % len),
            _ => return ControlResponse::Ignored,
        };
        ControlResponse::Changed(option_value(&self.options, next))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
