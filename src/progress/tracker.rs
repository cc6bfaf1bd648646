//! Cross-worker progress aggregation
//!
//! Workers share one atomic item counter. Every `step` increments the worker
//! that crossed the boundary sends the new count to a single publisher task,
//! which is the only writer of the progress slot. Counts that arrive out of
//! order are dropped, so published snapshots never go backwards.

use crate::progress::{ProgressSink, ProgressState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

enum ProgressEvent {
    Reached(usize),
    Finish(ProgressState),
}

/// Owner side of a job's progress state
///
/// Created once per job; workers receive cloned [`ProgressHandle`]s.
pub struct ProgressTracker {
    handle: ProgressHandle,
    publisher: JoinHandle<()>,
}

/// Worker side of a job's progress state
#[derive(Clone)]
pub struct ProgressHandle {
    counter: Arc<AtomicUsize>,
    total: usize,
    step: usize,
    events: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressTracker {
    /// Starts the publisher task and resets the slot to the zero state
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(total: usize, step: usize, sink: Arc<dyn ProgressSink>) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        let publisher = tokio::spawn(publish_loop(receiver, sink, total));

        Self {
            handle: ProgressHandle {
                counter: Arc::new(AtomicUsize::new(0)),
                total,
                step: step.max(1),
                events,
            },
            publisher,
        }
    }

    pub fn handle(&self) -> ProgressHandle {
        self.handle.clone()
    }

    /// Items recorded so far across all workers
    pub fn current(&self) -> usize {
        self.handle.current()
    }

    /// Publishes the final snapshot and stops the publisher task
    ///
    /// Call only after every worker has stopped. `completed` marks a job that
    /// ran to the end; its snapshot reports 100%.
    pub async fn finish(self, completed: bool) -> ProgressState {
        let current = self.current();
        let total = self.handle.total;
        let state = if completed {
            ProgressState::completed(current, total)
        } else {
            ProgressState::new(current, total)
        };

        if self.handle.events.send(ProgressEvent::Finish(state)).is_ok() {
            if let Err(e) = self.publisher.await {
                tracing::warn!("Progress publisher stopped unexpectedly: {}", e);
            }
        }

        state
    }
}

impl ProgressHandle {
    /// Items recorded so far across all workers
    pub fn current(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }

    /// Whether the shared counter has reached the job's cap
    ///
    /// Advisory: other workers may still be finishing an item, so the final
    /// count can exceed the cap by up to one item per other worker.
    pub fn cap_reached(&self) -> bool {
        self.current() >= self.total
    }

    /// Counts one emitted record and returns the new total
    pub fn record_item(&self) -> usize {
        let current = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        if current % self.step == 0 {
            // The publisher only goes away after finish().
            let _ = self.events.send(ProgressEvent::Reached(current));
        }
        current
    }
}

async fn publish_loop(
    mut receiver: mpsc::UnboundedReceiver<ProgressEvent>,
    sink: Arc<dyn ProgressSink>,
    total: usize,
) {
    publish(&sink, ProgressState::zero(total)).await;
    let mut published = 0;

    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::Reached(current) => {
                if current > published {
                    publish(&sink, ProgressState::new(current, total)).await;
                    published = current;
                }
            }
            ProgressEvent::Finish(mut state) => {
                state.current = state.current.max(published);
                publish(&sink, state).await;
                break;
            }
        }
    }
}

async fn publish(sink: &Arc<dyn ProgressSink>, state: ProgressState) {
    let sink = Arc::clone(sink);
    let result = tokio::task::spawn_blocking(move || sink.publish(&state)).await;

    match result {
        Ok(Ok(())) => tracing::trace!(
            "Progress: {}/{} ({}%)",
            state.current,
            state.total,
            state.percent
        ),
        Ok(Err(e)) => tracing::warn!("Failed to write progress snapshot: {}", e),
        Err(e) => tracing::warn!("Progress snapshot task failed: {}", e),
    }
}
