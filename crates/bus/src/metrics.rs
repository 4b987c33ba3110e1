//! Bus delivery counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe atomic counters updated on the dispatch path
#[derive(Debug, Default)]
pub(crate) struct BusCounters {
    /// Events accepted by `emit`/`emit_batch`
    emitted: AtomicU64,
    /// Events taken off the queue and dispatched
    dispatched: AtomicU64,
    /// Successful handler invocations
    deliveries: AtomicU64,
    /// Handler invocations that returned an error or panicked
    handler_failures: AtomicU64,
    /// Filter predicates that panicked
    predicate_failures: AtomicU64,
    /// Events evicted from the retention buffer
    evicted: AtomicU64,
}

impl BusCounters {
    pub(crate) fn record_emitted(&self, count: usize) {
        self.emitted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_predicate_failure(&self) {
        self.predicate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self, count: usize) {
        if count > 0 {
            self.evicted.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> BusMetrics {
        BusMetrics {
            emitted: self.emitted.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            predicate_failures: self.predicate_failures.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

/// Bus counters for external consumption
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusMetrics {
    pub emitted: u64,
    pub dispatched: u64,
    pub deliveries: u64,
    pub handler_failures: u64,
    pub predicate_failures: u64,
    pub evicted: u64,
}
