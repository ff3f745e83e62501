use std::sync::atomic::{self, AtomicBool};

/// A one-shot latch. Exactly one caller of [`Latch::trip`] observes `true` until the latch is
/// [`reset`](Latch::reset).
#[derive(Debug, Default)]
pub struct Latch {
    tripped: AtomicBool,
}

impl Latch {
    pub const fn new() -> Self {
        Self { tripped: AtomicBool::new(false) }
    }

    /// Returns `true` only for the first call since construction or the last reset.
    pub fn trip(&self) -> bool {
        self.tripped
            .compare_exchange(false, true, atomic::Ordering::AcqRel, atomic::Ordering::Acquire)
            .is_ok()
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(atomic::Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.tripped.store(false, atomic::Ordering::Release);
    }
}
