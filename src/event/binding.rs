//! Key binding registry and resolution.
//!
//! [`KeyBindingRegistry`] maps key+modifier combinations to form-level
//! [`BindingAction`]s. Keys without a binding go to the focused control.

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};

/// Form-level action triggered by a key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingAction {
    /// Leave the form without submitting.
    Quit,
    /// Move focus to the next visible control.
    FocusNext,
    /// Move focus to the previous visible control.
    FocusPrevious,
    /// Validate and submit from anywhere in the form.
    Submit,
    /// Restore mount defaults.
    Reset,
}

/// Registry of key bindings, mapping (Key, Modifiers) -> BindingAction.
#[derive(Debug, Clone)]
pub struct KeyBindingRegistry {
    bindings: HashMap<(Key, Modifiers), BindingAction>,
}

impl KeyBindingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a registry with standard default bindings.
    ///
    /// Defaults:
    /// - `Ctrl+C` -> Quit
    /// - `Tab` -> FocusNext
    /// - `BackTab` (Shift+Tab) -> FocusPrevious
    /// - `Ctrl+S` -> Submit
    /// - `Ctrl+R` -> Reset
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Char('c'), Modifiers::CTRL, BindingAction::Quit);
        registry.bind(Key::Tab, Modifiers::NONE, BindingAction::FocusNext);
        registry.bind(Key::BackTab, Modifiers::NONE, BindingAction::FocusPrevious);
        registry.bind(Key::Char('s'), Modifiers::CTRL, BindingAction::Submit);
        registry.bind(Key::Char('r'), Modifiers::CTRL, BindingAction::Reset);
        registry
    }

    /// Register a key binding.
    ///
    /// If a binding already exists for this key+modifier combination, it is replaced.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: BindingAction) {
        self.bindings.insert((key, modifiers), action);
    }

    /// Remove a key binding, returning the removed action if any.
    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<BindingAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// Look up the action for a given key event (exact key + modifiers match).
    pub fn resolve(&self, event: &KeyEvent) -> Option<BindingAction> {
        self.bindings.get(&(event.code, event.modifiers)).copied()
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyBindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
