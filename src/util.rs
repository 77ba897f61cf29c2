use std::sync::atomic::{AtomicBool, Ordering};

/// A flag that can be claimed at most once until it is re-armed
///
/// Among any number of threads calling [OneShot::fire], exactly one
/// observes `true` after each arming.
#[derive(Debug, Default)]
pub struct OneShot(AtomicBool);

impl OneShot {
    /// New latch, armed iff `armed` is true
    pub const fn new(armed: bool) -> Self {
        Self(AtomicBool::new(armed))
    }

    /// Claim the latch
    ///
    /// Returns `true` iff the latch was armed. The latch is disarmed
    /// afterwards.
    pub fn fire(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Arm the latch again
    pub fn rearm(&self) {
        self.0.store(true, Ordering::Release)
    }

    pub fn is_armed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
