//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag a running backend polls between gates.
///
/// Clones observe the same flag. Raising it is sticky.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag has been raised.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// A fresh flag that is also raised when `self` is.
    ///
    /// Used to give each run its own flag while still honoring a
    /// sweep-wide interrupt.
    pub fn child(&self) -> ChildCancelFlag {
        ChildCancelFlag {
            parent: self.clone(),
            own: CancelFlag::new(),
        }
    }
}

/// A run-scoped flag linked to a sweep-scoped parent.
#[derive(Debug, Clone)]
pub struct ChildCancelFlag {
    parent: CancelFlag,
    own: CancelFlag,
}

impl ChildCancelFlag {
    /// Raise only this run's flag.
    pub fn cancel(&self) {
        self.own.cancel();
    }

    /// Whether this run or its parent was cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.own.is_cancelled() || self.parent.is_cancelled()
    }
}

/// Anything a backend can poll for cancellation.
pub trait Cancellation: Send + Sync {
    /// Whether the current run should stop.
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for CancelFlag {
    fn is_cancelled(&self) -> bool {
        CancelFlag::is_cancelled(self)
    }
}

impl Cancellation for ChildCancelFlag {
    fn is_cancelled(&self) -> bool {
        ChildCancelFlag::is_cancelled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_child_sees_parent_but_not_siblings() {
        let sweep = CancelFlag::new();
        let run_a = sweep.child();
        let run_b = sweep.child();

        run_a.cancel();
        assert!(run_a.is_cancelled());
        assert!(!run_b.is_cancelled());

        sweep.cancel();
        assert!(run_b.is_cancelled());
    }
}
