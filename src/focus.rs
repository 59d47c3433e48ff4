//! Focus chain over the visible controls of a form and its submit button.

/// Something that can hold keyboard focus.
///
/// Ordering follows the form: fields by descriptor index, then the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FocusTarget {
    /// The control of the field at this descriptor index.
    Field(usize),
    Submit,
}

/// Ordered list of focus targets for tab navigation.
///
/// The chain is rebuilt whenever visibility changes. Focus cycles through it
/// forward (Tab) or backward (BackTab).
#[derive(Debug, Default)]
pub struct FocusChain {
    targets: Vec<FocusTarget>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the targets, given in tab order.
    ///
    /// A focused target that is still present keeps focus. One that
    /// disappeared hands focus to the next target after it, wrapping to the
    /// first.
    pub fn rebuild(&mut self, targets: impl IntoIterator<Item = FocusTarget>) {
        let old = self.current();
        self.targets = targets.into_iter().collect();
        self.current = None;

        let Some(old) = old else {
            return;
        };
        if self.targets.is_empty() {
            return;
        }
        let pos = self
            .targets
            .iter()
            .position(|&t| t >= old)
            .unwrap_or(0);
        self.current = Some(pos);
    }

    /// The focused target, if any.
    pub fn current(&self) -> Option<FocusTarget> {
        self.current.and_then(|idx| self.targets.get(idx).copied())
    }

    /// Move focus forward. Wraps around.
    pub fn focus_next(&mut self) -> Option<FocusTarget> {
        if self.targets.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.targets.len(),
            None => 0,
        };
        self.current = Some(next);
        self.current()
    }

    /// Move focus backward. Wraps around.
    pub fn focus_previous(&mut self) -> Option<FocusTarget> {
        if self.targets.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.targets.len() - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.current()
    }

    /// Focus `target`. Returns `false` if it is not in the chain.
    pub fn focus(&mut self, target: FocusTarget) -> bool {
        match self.targets.iter().position(|&t| t == target) {
            Some(pos) => {
                self.current = Some(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
