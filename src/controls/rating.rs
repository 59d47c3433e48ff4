//! Rating control: `max` discrete levels, filled cumulatively.

use std::any::Any;

use crate::controls::{Control, ControlResponse};
use crate::event::{Key, KeyEvent};
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::{CellStyle, Strip};

const FILLED: char = '\u{2605}';
const EMPTY: char = '\u{2606}';

/// Levels `1..=max`. Selecting level k stores the integer k.
///
/// Digits pick a level directly, Left/Right step, `0` or Backspace clears.
#[derive(Debug)]
pub struct Rating {
    max: u32,
}

impl Rating {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            max: field.rating_max(),
        }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Fill state of each level, lowest first.
    pub fn levels(&self, value: Option<&FieldValue>) -> Vec<bool> {
        let selected = self.selected(value);
        (1..=self.max).map(|level| level <= selected).collect()
    }

    /// The selected level, or 0 when unset. Out-of-range values are clamped.
    pub fn selected(&self, value: Option<&FieldValue>) -> u32 {
        value
            .and_then(FieldValue::as_number)
            .map_or(0, |n| n.clamp(0, i64::from(self.max)) as u32)
    }

    fn select(&self, level: u32) -> ControlResponse {
        if level == 0 {
            ControlResponse::Changed(None)
        } else {
            ControlResponse::Changed(Some(FieldValue::Number(i64::from(level.min(self.max)))))
        }
    }
}

impl Control for Rating {
    fn field_type(&self) -> FieldType {
        FieldType::Rating
    }

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip> {
        if region.is_empty() {
            return Vec::new();
        }
        let star_style = if focused {
            CellStyle::new().fg("yellow").bold()
        } else {
            CellStyle::new().fg("yellow")
        };
        let mut strip = Strip::new(region.y, region.x);
        for filled in self.levels(value) {
            strip.push(if filled { FILLED } else { EMPTY }, star_style.clone());
        }
        let selected = self.selected(value);
        if selected > 0 {
            strip.push_str(&format!(" {selected}/{}", self.max), CellStyle::hint());
        }
        strip.fill(region.width, CellStyle::new());
        vec![strip]
    }

    fn handle_key(&mut self, key: &KeyEvent, value: Option<&FieldValue>) -> ControlResponse {
        if !key.modifiers.is_empty() {
            return ControlResponse::Ignored;
        }
        let selected = self.selected(value);
        match key.code {
            Key::Char('0') | Key::Backspace | Key::Delete => {
                if selected == 0 {
                    ControlResponse::Consumed
                } else {
                    self.select(0)
                }
            }
            Key::Char(ch) => match ch.to_digit(10) {
                Some(level) if level <= self.max => self.select(level),
                Some(_) => ControlResponse::Consumed,
                None => ControlResponse::Ignored,
            },
            Key::Right if selected < self.max => self.select(selected + 1),
            Key::Left if selected > 0 => self.select(selected - 1),
            Key::Left | Key::Right => ControlResponse::Consumed,
            _ => ControlResponse::Ignored,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
