//! Runtime, signals and the effect scheduler.
//!
//! Fine-grained reactive primitives: signals store values, effects auto-track
//! reads, and memos cache derived computations. Single-threaded and
//! synchronous. Unlike a thread-local runtime, every [`Runtime`] is an owned
//! value: two forms never share reactive state, and dropping the runtime drops
//! every signal and effect it holds.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifies a signal slot inside a [`Runtime`].
    pub struct SignalId;

    /// Identifies an effect slot inside a [`Runtime`].
    pub struct EffectId;
}

// ---------------------------------------------------------------------------
// Runtime internals
// ---------------------------------------------------------------------------

struct SignalState {
    value: Box<dyn Any>,
    subscribers: HashSet<EffectId>,
}

pub(crate) type EffectFn = Box<dyn FnMut(&Runtime)>;

pub(crate) struct EffectState {
    /// Taken out while the effect runs so no borrow of the runtime is held
    /// across the user callback.
    pub(crate) callback: Option<EffectFn>,
    pub(crate) dependencies: HashSet<SignalId>,
}

pub(crate) struct Inner {
    signals: SlotMap<SignalId, SignalState>,
    pub(crate) effects: SlotMap<EffectId, EffectState>,
    /// The effect currently executing (for auto-tracking).
    pub(crate) tracking: Option<EffectId>,
    /// When > 0 we are inside a `batch()` call and effects are deferred.
    pub(crate) batch_depth: usize,
    /// Effects to re-run once the outermost batch (or notification pass) ends.
    pub(crate) pending_effects: Vec<EffectId>,
    /// Set while the notification loop is draining.
    running_effects: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            tracking: None,
            batch_depth: 0,
            pending_effects: Vec::new(),
            running_effects: false,
        }
    }

    /// Drop every dependency edge of `eid`.
    pub(crate) fn untrack(&mut self, eid: EffectId) {
        let deps: Vec<SignalId> = match self.effects.get_mut(eid) {
            Some(effect) => effect.dependencies.drain().collect(),
            None => return,
        };
        for sid in deps {
            if let Some(signal) = self.signals.get_mut(sid) {
                signal.subscribers.remove(&eid);
            }
        }
    }
}

/// An owned reactive runtime.
///
/// Signals and effects are arena slots addressed by `Copy` ids; every read and
/// write goes through the runtime that created them.
pub struct Runtime {
    pub(crate) inner: RefCell<Inner>,
}

impl Runtime {
    /// Create an empty runtime.
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner::new()),
        }
    }

    /// Create a reactive signal with the given initial value.
    ///
    /// Reading the returned [`ReadSignal`] inside an effect subscribes that
    /// effect to writes through the matching [`WriteSignal`].
    pub fn create_signal<T: 'static>(&self, initial: T) -> (ReadSignal<T>, WriteSignal<T>) {
        let id = self.inner.borrow_mut().signals.insert(SignalState {
            value: Box::new(initial),
            subscribers: HashSet::new(),
        });
        (
            ReadSignal {
                id,
                _marker: PhantomData,
            },
            WriteSignal {
                id,
                _marker: PhantomData,
            },
        )
    }

    /// Number of live signals.
    pub fn signal_count(&self) -> usize {
        self.inner.borrow().signals.len()
    }

    /// Number of live effects.
    pub fn effect_count(&self) -> usize {
        self.inner.borrow().effects.len()
    }

    /// Run a single effect: clear old deps, set tracking, execute callback.
    pub(crate) fn run_effect(&self, eid: EffectId) {
        let maybe_cb = {
            let mut inner = self.inner.borrow_mut();
            if !inner.effects.contains_key(eid) {
                return;
            }
            inner.untrack(eid);
            inner.effects.get_mut(eid).and_then(|e| e.callback.take())
        };

        // Already running further up the stack.
        let Some(mut cb) = maybe_cb else {
            return;
        };

        let prev_tracking = self.inner.borrow_mut().tracking.replace(eid);

        cb(self);

        let mut inner = self.inner.borrow_mut();
        inner.tracking = prev_tracking;
        // Disposed effects stay disposed.
        if let Some(effect) = inner.effects.get_mut(eid) {
            effect.callback = Some(cb);
        }
    }

    /// Notify a list of subscriber effects that a signal changed.
    fn notify_subscribers(&self, subs: Vec<EffectId>) {
        if subs.is_empty() {
            return;
        }

        {
            let mut inner = self.inner.borrow_mut();
            if inner.batch_depth > 0 || inner.running_effects {
                inner.pending_effects.extend(subs);
                return;
            }
            inner.running_effects = true;
        }

        let mut queue = subs;
        while !queue.is_empty() {
            let mut seen = HashSet::new();
            for eid in std::mem::take(&mut queue) {
                if seen.insert(eid) {
                    self.run_effect(eid);
                }
            }
            // Effects may have written to signals and queued more work.
            queue.append(&mut self.inner.borrow_mut().pending_effects);
        }

        self.inner.borrow_mut().running_effects = false;
    }

    pub(crate) fn flush_pending(&self) {
        let pending: Vec<EffectId> = std::mem::take(&mut self.inner.borrow_mut().pending_effects);
        self.notify_subscribers(pending);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Runtime")
            .field("signals", &inner.signals.len())
            .field("effects", &inner.effects.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ReadSignal
// ---------------------------------------------------------------------------

/// Read-half of a signal. `Copy`: only stores an id.
pub struct ReadSignal<T: 'static> {
    id: SignalId,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls so we don't require T: Copy/Clone for the signal itself.
impl<T: 'static> Copy for ReadSignal<T> {}
impl<T: 'static> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> ReadSignal<T> {
    /// Read the current value, subscribing the running effect (if any).
    pub fn get(&self, rt: &Runtime) -> T
    where
        T: Clone,
    {
        self.with(rt, T::clone)
    }

    /// Read by reference without cloning. Still subscribes the running effect.
    pub fn with<R>(&self, rt: &Runtime, f: impl FnOnce(&T) -> R) -> R {
        {
            let mut inner = rt.inner.borrow_mut();
            if let Some(eid) = inner.tracking {
                if let Some(signal) = inner.signals.get_mut(self.id) {
                    signal.subscribers.insert(eid);
                }
                if let Some(effect) = inner.effects.get_mut(eid) {
                    effect.dependencies.insert(self.id);
                }
            }
        }
        self.with_untracked(rt, f)
    }

    /// Read without tracking: will not subscribe any running effect.
    pub fn get_untracked(&self, rt: &Runtime) -> T
    where
        T: Clone,
    {
        self.with_untracked(rt, T::clone)
    }

    /// Read by reference without tracking.
    pub fn with_untracked<R>(&self, rt: &Runtime, f: impl FnOnce(&T) -> R) -> R {
        let inner = rt.inner.borrow();
        let value = inner
            .signals
            .get(self.id)
            .and_then(|s| s.value.downcast_ref::<T>())
            .expect("signal read through a foreign or dropped runtime");
        f(value)
    }
}

// ---------------------------------------------------------------------------
// WriteSignal
// ---------------------------------------------------------------------------

/// Write-half of a signal. `Copy`: only stores an id.
pub struct WriteSignal<T: 'static> {
    id: SignalId,
    _marker: PhantomData<fn(T)>,
}

impl<T: 'static> Copy for WriteSignal<T> {}
impl<T: 'static> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> WriteSignal<T> {
    /// Overwrite the signal value and notify subscribers.
    pub fn set(&self, rt: &Runtime, value: T) {
        self.update(rt, move |slot| *slot = value);
    }

    /// Mutate the value in-place and notify subscribers.
    pub fn update(&self, rt: &Runtime, f: impl FnOnce(&mut T)) {
        let subs = {
            let mut inner = rt.inner.borrow_mut();
            let Some(signal) = inner.signals.get_mut(self.id) else {
                return;
            };
            if let Some(value) = signal.value.downcast_mut::<T>() {
                f(value);
            }
            signal.subscribers.iter().copied().collect::<Vec<_>>()
        };
        rt.notify_subscribers(subs);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn create_and_read_signal() {
        let rt = Runtime::new();
        let (r, _w) = rt.create_signal(42);
        assert_eq!(r.get(&rt), 42);
    }

    #[test]
    fn set_and_read() {
        let rt = Runtime::new();
        let (r, w) = rt.create_signal(0);
        w.set(&rt, 7);
        assert_eq!(r.get(&rt), 7);
    }

    #[test]
    fn update_in_place() {
        let rt = Runtime::new();
        let (r, w) = rt.create_signal(vec![1, 2]);
        w.update(&rt, |v| v.push(3));
        assert_eq!(r.get(&rt), vec![1, 2, 3]);
    }

    #[test]
    fn signal_with() {
        let rt = Runtime::new();
        let (r, _w) = rt.create_signal(String::from("hello"));
        assert_eq!(r.with(&rt, |s| s.len()), 5);
    }

    #[test]
    fn runtimes_are_isolated() {
        let a = Runtime::new();
        let b = Runtime::new();
        let (_ra, _wa) = a.create_signal(1);
        assert_eq!(a.signal_count(), 1);
        assert_eq!(b.signal_count(), 0);
    }

    #[test]
    fn get_untracked_does_not_subscribe() {
        let rt = Runtime::new();
        let (r, w) = rt.create_signal(0);
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        rt.create_effect(move |rt| {
            let _ = r.get_untracked(rt);
            count_c.set(count_c.get() + 1);
        });
        assert_eq!(count.get(), 1);
        w.set(&rt, 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn effect_set_during_effect() {
        let rt = Runtime::new();
        let (a_r, a_w) = rt.create_signal(0);
        let (b_r, b_w) = rt.create_signal(0);
        let log = Rc::new(RefCell::new(Vec::<i32>::new()));
        let log_c = log.clone();

        rt.create_effect(move |rt| {
            let val = a_r.get(rt);
            b_w.set(rt, val * 2);
        });
        rt.create_effect(move |rt| {
            log_c.borrow_mut().push(b_r.get(rt));
        });

        a_w.set(&rt, 5);
        assert!(log.borrow().contains(&10));
    }

    #[test]
    fn debug_signals() {
        let rt = Runtime::new();
        let (r, w) = rt.create_signal(42);
        assert!(format!("{r:?}").contains("ReadSignal"));
        assert!(format!("{w:?}").contains("WriteSignal"));
        assert!(format!("{rt:?}").contains("signals: 1"));
    }
}
