use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct NormalizerCounters {
    seen: AtomicU64,
    normalized: AtomicU64,
    duplicates_dropped: AtomicU64,
    noise_dropped: AtomicU64,
    batches_flushed: AtomicU64,
    events_flushed: AtomicU64,
    gc_passes: AtomicU64,
}

impl NormalizerCounters {
    pub(crate) fn record_seen(&self) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_normalized(&self) {
        self.normalized.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_noise(&self) {
        self.noise_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, events: usize) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.events_flushed.fetch_add(events as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_gc_pass(&self) {
        self.gc_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> NormalizerMetrics {
        NormalizerMetrics {
            seen: self.seen.load(Ordering::Relaxed),
            normalized: self.normalized.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            noise_dropped: self.noise_dropped.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            events_flushed: self.events_flushed.load(Ordering::Relaxed),
            gc_passes: self.gc_passes.load(Ordering::Relaxed),
        }
    }
}

/// Normalizer counters for external consumption
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizerMetrics {
    /// Events passed to `normalize`
    pub seen: u64,
    /// Events that survived normalization
    pub normalized: u64,
    pub duplicates_dropped: u64,
    pub noise_dropped: u64,
    pub batches_flushed: u64,
    pub events_flushed: u64,
    /// Dedup table garbage-collection passes
    pub gc_passes: u64,
}
