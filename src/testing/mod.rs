//! Headless testing helpers: the [`Pilot`] and snapshot rendering.
//!
//! Use the [`Pilot`] to drive a [`FormRenderer`](crate::FormRenderer) without a
//! terminal, and [`strips_to_string`] / [`render_control`] to capture output as
//! plain text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{render_control, strips_to_string};
