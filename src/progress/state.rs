use serde::{Deserialize, Serialize};

/// Progress of the running (or last) job as seen by pollers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Completion percentage, 0 to 100; only a completed job reports 100
    pub percent: u8,

    /// Items collected so far (may briefly exceed `total`)
    pub current: usize,

    /// Item cap of the job
    pub total: usize,
}

impl ProgressState {
    /// State before any item has been collected
    pub fn zero(total: usize) -> Self {
        Self {
            percent: 0,
            current: 0,
            total,
        }
    }

    /// Builds an in-flight state, deriving the percentage from `current` and `total`
    ///
    /// The percentage stops at 99 even once the cap is reached: the job is not
    /// done until its dataset has been exported.
    pub fn new(current: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (current.saturating_mul(100) / total).min(99) as u8
        };
        Self {
            percent,
            current,
            total,
        }
    }

    /// Final state of a job that ran to completion
    pub fn completed(current: usize, total: usize) -> Self {
        Self {
            percent: 100,
            current,
            total,
        }
    }
}
