//! Re-entrancy guard for reaction evaluation.
//!
//! Each entity's attribute state owns one [`ReactionGuard`]. Evaluation
//! enters it through [`ReactionGuard::try_enter`], which hands back a
//! [`GuardScope`]; dropping the scope (normal return, early return or
//! unwinding) puts the guard back to [`GuardState::Idle`].
//!
//! The guard limits recursion depth on one entity. It is not a lock: it uses
//! a [`Cell`] and is therefore `!Sync`.

use std::cell::Cell;

/// State of a reaction guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    /// No evaluation in flight on this entity.
    #[default]
    Idle,
    /// An evaluation on this entity is on the call stack.
    Processing,
}

/// Two-state re-entrancy guard.
#[derive(Debug, Default)]
pub struct ReactionGuard {
    state: Cell<GuardState>,
}

impl ReactionGuard {
    /// Create an idle guard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Cell::new(GuardState::Idle),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    /// Check whether an evaluation currently holds the guard.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.state.get() == GuardState::Processing
    }

    /// Move `Idle -> Processing`, or return `None` if already processing.
    #[must_use = "the guard is released as soon as the scope is dropped"]
    pub fn try_enter(&self) -> Option<GuardScope<'_>> {
        match self.state.get() {
            GuardState::Processing => None,
            GuardState::Idle => {
                self.state.set(GuardState::Processing);
                Some(GuardScope { guard: self })
            }
        }
    }
}

/// Held guard. Returns the guard to `Idle` when dropped.
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReactionGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.state.set(GuardState::Idle);
    }
}
