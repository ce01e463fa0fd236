//! Single-flight guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// Marks an operation as in flight until dropped.
///
/// At most one guard per flag exists at a time. The flag is cleared however
/// the guarded operation ends, including early returns and cancellation.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    /// Claims the flag, or returns `None` if it is already claimed.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
