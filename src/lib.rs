//! # formdeck
//!
//! A configuration-driven form renderer for terminal applications.
//!
//! Describe a form as a list of [`FieldDescriptor`]s (in Rust or JSON), attach
//! a [`SchemaValidator`] and a submit callback, and [`FormRenderer`] gives back
//! an interactive form: one control per visible field, live conditional
//! visibility, validation on submit, and one inline message per failing field.
//!
//! ## Core Systems
//!
//! - **[`form`]**: descriptors, values, the versioned value store, visibility, schema, config
//! - **[`controls`]**: one control per field type, dispatched through [`ControlRegistry`]
//! - **[`renderer`]**: [`FormRenderer`], which ties the form together
//! - **[`reactive`]**: signals, effects, and memos on an owned runtime
//! - **[`event`]**: input events and key bindings
//! - **[`render`]**: styled strips and the crossterm driver
//! - **[`app`]**: [`FormApp`], a terminal session around a form
//! - **[`testing`]**: the headless [`Pilot`](testing::Pilot) and snapshot helpers
//!
//! ## Example
//!
//! ```ignore
//! use formdeck::{FieldDescriptor, FieldType, FormRenderer, Rule, Schema};
//!
//! let fields = vec![
//!     FieldDescriptor::new("country", "Country", FieldType::Select)
//!         .options([("us", "United States"), ("other", "Other")]),
//!     FieldDescriptor::new("other_country", "Which country?", FieldType::Text)
//!         .show_when("country", "other"),
//!     FieldDescriptor::new("stars", "How did we do?", FieldType::Rating).max(3),
//! ];
//! let schema = Schema::new().field("stars", [Rule::Required]);
//! let mut form = FormRenderer::new(fields, schema, |values| {
//!     println!("{}", values.to_json()?);
//!     Ok(())
//! })?;
//! ```

// Foundation
pub mod error;
pub mod geometry;

// Form model
pub mod form;

// Reactivity and events
pub mod event;
pub mod reactive;

// Controls and widgets
pub mod controls;
pub mod focus;
pub mod widgets;

// Rendering
pub mod render;
pub mod renderer;

// Application
pub mod app;
pub mod testing;

pub use app::{AppError, FormApp, FormExit};
pub use controls::{Control, ControlRegistry, ControlResponse};
pub use error::{ConfigError, DescriptorError, SubmitCallbackError, SubmitError, UnknownField};
pub use form::{
    AsyncSchemaValidator, Check, FieldDescriptor, FieldOption, FieldType, FieldValue, FileHandle,
    FormConfig, FormDocument, FormValues, Revalidate, Rule, Schema, SchemaValidator,
    ValidationResult,
};
pub use renderer::{FieldView, FormRenderer, FormView, SubmitOutcome, SubmitTicket};
