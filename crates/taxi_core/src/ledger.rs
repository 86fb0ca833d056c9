//! Service ledger: count of trips between admission and completion.

use std::sync::{Mutex, MutexGuard};

/// Shared counter of in-flight trips, read by the termination detector.
#[derive(Debug, Default)]
pub struct ServiceLedger {
    active: Mutex<u64>,
}

impl ServiceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.active.lock().expect("service ledger mutex poisoned")
    }

    /// Record a trip admission.
    pub fn begin(&self) {
        *self.lock() += 1;
    }

    /// Record a trip completion.
    ///
    /// # Panics
    ///
    /// Panics when no trip is active: an unmatched `end` means the
    /// begin/end pairing is broken and the run cannot be trusted.
    pub fn end(&self) {
        let mut active = self.lock();
        assert!(*active > 0, "service ledger underflow: end() without begin()");
        *active -= 1;
    }

    pub fn count(&self) -> u64 {
        *self.lock()
    }
}
