//! Single-job guard
//!
//! The crawl engine assumes it never runs concurrently with itself. Callers
//! hold a `JobSlot` and must present a `JobPermit` from it to start a job; the
//! slot is free again when the permit is dropped.

use crate::HarvestError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Admits at most one job at a time
#[derive(Debug, Default)]
pub struct JobSlot {
    busy: AtomicBool,
}

/// Proof that the holder owns the job slot
#[derive(Debug)]
pub struct JobPermit<'a> {
    slot: &'a JobSlot,
}

impl JobSlot {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claims the slot
    ///
    /// # Errors
    ///
    /// * `HarvestError::AlreadyRunning` - another permit is still alive
    pub fn try_acquire(&self) -> Result<JobPermit<'_>, HarvestError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| JobPermit { slot: self })
            .map_err(|_| HarvestError::AlreadyRunning)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for JobPermit<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
