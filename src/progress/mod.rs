//! Progress reporting for running jobs
//!
//! # Components
//!
//! - `ProgressState`: the `{percent, current, total}` snapshot pollers read
//! - `ProgressSink` / `SnapshotFile`: the external slot snapshots are written to
//! - `ProgressTracker` / `ProgressHandle`: the shared counter and its publisher

mod snapshot;
mod state;
mod tracker;

pub use snapshot::{read_snapshot, write_atomic, ProgressSink, SnapshotFile};
pub use state::ProgressState;
pub use tracker::{ProgressHandle, ProgressTracker};
