//! Windowed deduplication keyed on event identity

use pulse_core::constants::DEDUP_GC_AGE_FACTOR;
use pulse_core::Event;
use std::collections::HashMap;

/// Composite identity used for deduplication.
///
/// The event type, followed by whichever of document URI, `line:character`
/// position and terminal/suggestion handle the payload carries. Events with
/// none of these dedup on their type alone.
pub fn dedup_key(event: &Event) -> String {
    let mut key = event.event_type.clone();
    if let Some(uri) = event.uri() {
        key.push('|');
        key.push_str(uri);
    }
    if let Some(position) = event.position() {
        key.push('|');
        key.push_str(&position.to_string());
    }
    if let Some(handle) = event.payload.handle() {
        key.push('|');
        key.push_str(handle);
    }
    key
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Observation {
    /// Seen within the window; nothing was recorded
    Duplicate,
    /// Recorded; `collected` is set when a garbage-collection pass ran
    Fresh { collected: Option<usize> },
}

/// Last-seen timestamp per dedup key
#[derive(Debug)]
pub(crate) struct DedupTable {
    last_seen: HashMap<String, u64>,
    window_ms: u64,
    gc_threshold: usize,
}

impl DedupTable {
    pub(crate) fn new(window_ms: u64, gc_threshold: usize) -> Self {
        Self {
            last_seen: HashMap::new(),
            window_ms,
            gc_threshold,
        }
    }

    pub(crate) fn observe(&mut self, key: String, timestamp: u64) -> Observation {
        if let Some(previous) = self.last_seen.get(&key) {
            if timestamp.saturating_sub(*previous) < self.window_ms {
                return Observation::Duplicate;
            }
        }

        self.last_seen.insert(key, timestamp);
        let collected = (self.last_seen.len() > self.gc_threshold).then(|| self.collect(timestamp));
        Observation::Fresh { collected }
    }

    /// Drop entries older than `DEDUP_GC_AGE_FACTOR` windows relative to `now`
    fn collect(&mut self, now: u64) -> usize {
        let max_age = self.window_ms.saturating_mul(DEDUP_GC_AGE_FACTOR);
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, seen| now.saturating_sub(*seen) <= max_age);
        before - self.last_seen.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub(crate) fn clear(&mut self) {
        self.last_seen.clear();
    }
}
