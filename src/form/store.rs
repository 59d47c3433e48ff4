//! Versioned value store with an explicit subscribe/notify contract.
//!
//! The store owns its reactive [`Runtime`]. Every mutation bumps the version
//! and re-runs subscribers and derived values synchronously, before the
//! mutating call returns.

use crate::form::value::{FieldValue, FormValues};
use crate::reactive::{EffectId, ReadSignal, Runtime, WriteSignal};

/// Handle returned by [`ValueStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(EffectId);

/// A value derived from the store, recomputed after every mutation.
///
/// Read it with [`ValueStore::read`].
#[derive(Debug)]
pub struct Derived<T: 'static>(ReadSignal<T>);

impl<T: 'static> Clone for Derived<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: 'static> Copy for Derived<T> {}

/// Owned store of the values of one form.
pub struct ValueStore {
    rt: Runtime,
    values: ReadSignal<FormValues>,
    set_values: WriteSignal<FormValues>,
    version: ReadSignal<u64>,
    set_version: WriteSignal<u64>,
}

impl ValueStore {
    /// Create a store holding `initial` at version 0.
    pub fn new(initial: FormValues) -> Self {
        let rt = Runtime::new();
        let (values, set_values) = rt.create_signal(initial);
        let (version, set_version) = rt.create_signal(0_u64);
        Self {
            rt,
            values,
            set_values,
            version,
            set_version,
        }
    }

    /// Monotonic mutation counter.
    pub fn version(&self) -> u64 {
        self.version.get_untracked(&self.rt)
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.values
            .with_untracked(&self.rt, |values| values.get(name).cloned())
    }

    /// Clone of the latest values.
    pub fn snapshot(&self) -> FormValues {
        self.values.get_untracked(&self.rt)
    }

    /// Set `name`. Writing the value it already holds is a no-op that neither
    /// bumps the version nor notifies. Returns whether anything changed.
    pub fn set(&self, name: &str, value: FieldValue) -> bool {
        if self.get(name).as_ref() == Some(&value) {
            return false;
        }
        self.commit(|values| {
            values.set(name, value);
        });
        true
    }

    /// Make `name` undefined. Returns whether it held a value.
    pub fn remove(&self, name: &str) -> bool {
        if self.get(name).is_none() {
            return false;
        }
        self.commit(|values| {
            values.remove(name);
        });
        true
    }

    /// Swap in a whole new value map (used by reset).
    pub fn replace(&self, values: FormValues) {
        self.commit(move |slot| *slot = values);
    }

    /// Call `f(values, version)` now and after every mutation.
    pub fn subscribe(&self, mut f: impl FnMut(&FormValues, u64) + 'static) -> Subscription {
        let (values, version) = (self.values, self.version);
        Subscription(self.rt.create_effect(move |rt| {
            let current = values.get(rt);
            let v = version.get(rt);
            f(&current, v);
        }))
    }

    /// Stop a subscription. Returns `false` if it was already stopped.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.rt.dispose_effect(subscription.0)
    }

    /// Derive a value that is recomputed from the latest snapshot after each
    /// mutation. Dependents only see changes when the output differs.
    pub fn derive<T: Clone + PartialEq + 'static>(
        &self,
        mut f: impl FnMut(&FormValues) -> T + 'static,
    ) -> Derived<T> {
        let values = self.values;
        Derived(self.rt.create_memo(move |rt| values.with(rt, |v| f(v))))
    }

    /// Latest output of a derived value.
    pub fn read<T: Clone + 'static>(&self, derived: Derived<T>) -> T {
        derived.0.get_untracked(&self.rt)
    }

    fn commit(&self, f: impl FnOnce(&mut FormValues)) {
        let (set_values, set_version) = (self.set_values, self.set_version);
        self.rt.batch(|rt| {
            set_values.update(rt, f);
            set_version.update(rt, |v| *v += 1);
        });
    }
}

impl std::fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueStore")
            .field("version", &self.version())
            .field("values", &self.snapshot())
            .finish()
    }
}
