//! Form controls: one interactive control per field type.
//!
//! A control owns only transient editing state (cursor, highlighted option,
//! typed path). The field's value lives in the form's
//! [`ValueStore`](crate::form::ValueStore); controls read it on every call and
//! report edits through [`ControlResponse`].

pub mod checkbox;
pub mod choice;
pub mod file;
pub mod rating;
pub mod text;
pub mod textarea;

use std::any::Any;
use std::collections::HashMap;

use crate::event::KeyEvent;
use crate::form::field::{FieldDescriptor, FieldType};
use crate::form::value::FieldValue;
use crate::geometry::Region;
use crate::render::strip::Strip;

pub use checkbox::Checkbox;
pub use choice::{RadioGroup, Select};
pub use file::FilePicker;
pub use rating::Rating;
pub use text::{EditBuffer, TextInput};
pub use textarea::TextArea;

// ---------------------------------------------------------------------------
// Control trait
// ---------------------------------------------------------------------------

/// What a control did with an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlResponse {
    /// Not handled; the renderer may use the key for something else.
    Ignored,
    /// Handled without changing the value (cursor moves, highlighting).
    Consumed,
    /// The value changed. `None` makes the field undefined.
    Changed(Option<FieldValue>),
}

/// An interactive control bound to one field.
///
/// The trait is object-safe; the renderer holds `Box<dyn Control>`.
pub trait Control {
    fn field_type(&self) -> FieldType;

    /// Rows the control occupies, excluding the label and error rows.
    fn height(&self) -> i32 {
        1
    }

    fn can_focus(&self) -> bool {
        true
    }

    /// Whether the control draws its own label (so the renderer skips the label row).
    fn draws_label(&self) -> bool {
        false
    }

    /// Value given to the field when it is first shown.
    fn default_value(&self) -> Option<FieldValue> {
        None
    }

    /// Re-align transient state with a value set from outside the control.
    fn sync(&mut self, _value: Option<&FieldValue>) {}

    fn render(&self, region: Region, value: Option<&FieldValue>, focused: bool) -> Vec<Strip>;

    fn handle_key(&mut self, key: &KeyEvent, value: Option<&FieldValue>) -> ControlResponse;

    fn handle_paste(&mut self, _text: &str, _value: Option<&FieldValue>) -> ControlResponse {
        ControlResponse::Ignored
    }

    /// Downcast to `&dyn Any` for inspecting a concrete control.
    fn as_any(&self) -> &dyn Any;
}

// ---------------------------------------------------------------------------
// ControlRegistry
// ---------------------------------------------------------------------------

/// Builds the control for one descriptor.
pub type ControlFactory = Box<dyn Fn(&FieldDescriptor) -> Box<dyn Control>>;

/// Dispatch table from field type to control factory.
///
/// Overriding a type only takes a `register` call; nothing else in the
/// renderer names concrete controls.
pub struct ControlRegistry {
    factories: HashMap<FieldType, ControlFactory>,
}

impl ControlRegistry {
    /// An empty registry; every type is unsupported until registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in control for every field type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for ty in [
            FieldType::Text,
            FieldType::Email,
            FieldType::Password,
            FieldType::Date,
        ] {
            registry.register(ty, |d| Box::new(TextInput::new(d)));
        }
        registry.register(FieldType::Textarea, |d| Box::new(TextArea::new(d)));
        registry.register(FieldType::Checkbox, |d| Box::new(Checkbox::new(d)));
        registry.register(FieldType::Radio, |d| Box::new(RadioGroup::new(d)));
        registry.register(FieldType::Select, |d| Box::new(Select::new(d)));
        registry.register(FieldType::File, |d| Box::new(FilePicker::new(d)));
        registry.register(FieldType::Rating, |d| Box::new(Rating::new(d)));
        registry
    }

    /// Register (or replace) the factory for `field_type`.
    pub fn register(
        &mut self,
        field_type: FieldType,
        factory: impl Fn(&FieldDescriptor) -> Box<dyn Control> + 'static,
    ) {
        self.factories.insert(field_type, Box::new(factory));
    }

    /// Remove the factory for `field_type`. Returns `true` if one existed.
    pub fn unregister(&mut self, field_type: FieldType) -> bool {
        self.factories.remove(&field_type).is_some()
    }

    pub fn contains(&self, field_type: FieldType) -> bool {
        self.factories.contains_key(&field_type)
    }

    /// Build the control for `field`, or `None` if its type is not registered.
    pub fn build(&self, field: &FieldDescriptor) -> Option<Box<dyn Control>> {
        self.factories.get(&field.field_type).map(|f| f(field))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ControlRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.factories.keys().map(|t| t.as_str()).collect();
        types.sort_unstable();
        f.debug_struct("ControlRegistry").field("types", &types).finish()
    }
}

/// Cell style for a control's main row.
pub(crate) fn value_style(focused: bool) -> crate::render::strip::CellStyle {
    use crate::render::strip::CellStyle;
    if focused {
        CellStyle::new().fg("cyan")
    } else {
        CellStyle::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_type() {
        let registry = ControlRegistry::with_defaults();
        assert_eq!(registry.len(), FieldType::ALL.len());
        for ty in FieldType::ALL {
            let d = FieldDescriptor::new("f", "F", ty).option("a", "A");
            let control = registry.build(&d).unwrap();
            assert_eq!(control.field_type(), ty);
        }
    }

    #[test]
    fn unregister_makes_type_unsupported() {
        let mut registry = ControlRegistry::with_defaults();
        assert!(registry.unregister(FieldType::File));
        assert!(!registry.unregister(FieldType::File));
        assert!(!registry.contains(FieldType::File));
        assert!(registry
            .build(&FieldDescriptor::new("cv", "CV", FieldType::File))
            .is_none());
    }

    #[test]
    fn register_overrides_factory() {
        let mut registry = ControlRegistry::new();
        // Dates rendered by the plain text control.
        registry.register(FieldType::Date, |d| {
            Box::new(TextInput::new(&FieldDescriptor::new(d.name.clone(), d.label.clone(), FieldType::Text)))
        });
        let control = registry
            .build(&FieldDescriptor::new("dob", "Born", FieldType::Date))
            .unwrap();
        assert_eq!(control.field_type(), FieldType::Text);
    }
}
