//! Read-only buffer queries and replay
//!
//! Every query works on a snapshot of the retention buffer taken under the
//! lock; filters and handlers run after the lock is released.

use crate::buffer::BufferStats;
use crate::bus::EventBus;
use crate::filter::{panic_message, EventFilter};
use crate::handler::EventHandler;
use futures::FutureExt;
use pulse_core::Event;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of [`EventBus::replay_events`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Events handed to the handler
    pub replayed: usize,
    /// Invocations that returned an error or panicked
    pub failed: usize,
}

impl EventBus {
    fn snapshot(&self) -> Vec<Arc<Event>> {
        self.state.lock().buffer.snapshot()
    }

    /// The last `count` retained events matching `filter`, oldest first.
    /// The filter is applied before the count.
    pub fn recent_events(&self, count: Option<usize>, filter: Option<&EventFilter>) -> Vec<Arc<Event>> {
        let mut matching: Vec<Arc<Event>> = self
            .snapshot()
            .into_iter()
            .filter(|event| filter.map_or(true, |f| f.matches(event)))
            .collect();
        if let Some(count) = count {
            let skip = matching.len().saturating_sub(count);
            matching.drain(..skip);
        }
        matching
    }

    /// Retained events with `start <= timestamp <= end` matching `filter`
    pub fn events_in_range(&self, start: u64, end: u64, filter: Option<&EventFilter>) -> Vec<Arc<Event>> {
        self.snapshot()
            .into_iter()
            .filter(|event| event.timestamp >= start && event.timestamp <= end)
            .filter(|event| filter.map_or(true, |f| f.matches(event)))
            .collect()
    }

    /// Retained events of exactly `event_type`
    pub fn events_by_type(&self, event_type: &str) -> Vec<Arc<Event>> {
        self.snapshot()
            .into_iter()
            .filter(|event| event.event_type == event_type)
            .collect()
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.state.lock().buffer.stats()
    }

    /// Feed retained events to a single handler, oldest first.
    ///
    /// Events older than `start_time` are skipped before the filter is
    /// evaluated. Priority plays no part; a failing invocation is logged and
    /// replay moves on to the next event.
    pub async fn replay_events(
        &self,
        handler: &dyn EventHandler,
        filter: Option<&EventFilter>,
        start_time: Option<u64>,
    ) -> ReplayReport {
        let mut report = ReplayReport::default();

        for event in self.snapshot() {
            if start_time.is_some_and(|start| event.timestamp < start) {
                continue;
            }
            if !filter.map_or(true, |f| f.matches(&event)) {
                continue;
            }

            report.replayed += 1;
            let outcome = AssertUnwindSafe(handler.handle(Arc::clone(&event)))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(
                        handler = %handler.name(),
                        event_id = %event.id,
                        event_type = %event.event_type,
                        error = %e,
                        "Replay handler failed; continuing"
                    );
                }
                Err(panic) => {
                    report.failed += 1;
                    warn!(
                        handler = %handler.name(),
                        event_id = %event.id,
                        event_type = %event.event_type,
                        panic = %panic_message(panic.as_ref()),
                        "Replay handler panicked; continuing"
                    );
                }
            }
        }

        debug!(
            handler = %handler.name(),
            replayed = report.replayed,
            failed = report.failed,
            "Replay finished"
        );
        report
    }
}
