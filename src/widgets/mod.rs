//! Built-in widgets that are not field controls.

pub mod button;

pub use button::SubmitButton;
