//! Reactive state: signals, effects, memos.
//!
//! Leptos-style fine-grained reactivity on an owned [`Runtime`].
//!
//! - [`Runtime::create_signal`] creates a read/write signal pair.
//! - [`Runtime::create_effect`] registers an auto-tracking side effect.
//! - [`Runtime::create_memo`] caches a derived computation.
//! - [`Runtime::batch`] coalesces multiple writes into one notification pass.

pub mod effect;
pub mod signal;

pub use signal::{EffectId, ReadSignal, Runtime, SignalId, WriteSignal};
