//! Auto-tracking side effects, computed memos and batching.
//!
//! # Effects
//!
//! An effect is a closure that re-runs whenever any signal it reads changes:
//!
//! ```ignore
//! let rt = Runtime::new();
//! let (count, set_count) = rt.create_signal(0);
//! rt.create_effect(move |rt| {
//!     println!("count = {}", count.get(rt));
//! });
//! set_count.set(&rt, 1); // prints "count = 1"
//! ```
//!
//! # Memos
//!
//! A memo is a cached derived computation. It only notifies downstream
//! subscribers when its output actually changes.
//!
//! # Batching
//!
//! [`Runtime::batch`] groups several writes so dependent effects run once.

use std::collections::HashSet;

use super::signal::{EffectId, EffectState, ReadSignal, Runtime};

impl Runtime {
    /// Create a side-effect that auto-tracks signal reads.
    ///
    /// The closure runs immediately once (establishing initial subscriptions),
    /// then re-runs whenever any tracked signal changes. The returned id can
    /// be passed to [`dispose_effect`](Self::dispose_effect).
    pub fn create_effect(&self, f: impl FnMut(&Runtime) + 'static) -> EffectId {
        let eid = self.inner.borrow_mut().effects.insert(EffectState {
            callback: Some(Box::new(f)),
            dependencies: HashSet::new(),
        });
        self.run_effect(eid);
        eid
    }

    /// Create a memoised derived computation.
    ///
    /// `f` runs immediately and whenever its dependencies change. The returned
    /// signal only notifies *its* subscribers when the computed value differs
    /// (by `PartialEq`) from the previous one.
    pub fn create_memo<T: Clone + PartialEq + 'static>(
        &self,
        mut f: impl FnMut(&Runtime) -> T + 'static,
    ) -> ReadSignal<T> {
        // Eager evaluation must not subscribe whatever effect is running now.
        let prev = self.inner.borrow_mut().tracking.take();
        let first = f(self);
        self.inner.borrow_mut().tracking = prev;

        let (read, write) = self.create_signal(first);
        self.create_effect(move |rt| {
            let next = f(rt);
            if read.with_untracked(rt, |old| old != &next) {
                write.set(rt, next);
            }
        });
        read
    }

    /// Batch multiple signal writes so that effects run only once.
    ///
    /// ```ignore
    /// rt.batch(|rt| {
    ///     set_a.set(rt, 1);
    ///     set_b.set(rt, 2);
    /// });
    /// ```
    pub fn batch<R>(&self, f: impl FnOnce(&Runtime) -> R) -> R {
        self.inner.borrow_mut().batch_depth += 1;
        let out = f(self);
        let outermost = {
            let mut inner = self.inner.borrow_mut();
            inner.batch_depth -= 1;
            inner.batch_depth == 0
        };
        if outermost {
            self.flush_pending();
        }
        out
    }

    /// Remove an effect so it no longer re-runs when its dependencies change.
    ///
    /// Returns `false` if the effect was already disposed.
    pub fn dispose_effect(&self, eid: EffectId) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.untrack(eid);
        inner.effects.remove(eid).is_some()
    }
}
