//! Bounded retention buffer

use pulse_core::Event;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Snapshot of the retention buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub size: usize,
    pub max_size: usize,
    /// Timestamp of the oldest retained event; `None` when empty
    pub oldest_timestamp: Option<u64>,
    /// Timestamp of the newest retained event; `None` when empty
    pub newest_timestamp: Option<u64>,
}

/// Most recent events in insertion order, capped at `max_size`
#[derive(Debug)]
pub(crate) struct RetentionBuffer {
    events: VecDeque<Arc<Event>>,
    max_size: usize,
}

impl RetentionBuffer {
    pub(crate) fn new(max_size: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size.min(4096)),
            max_size,
        }
    }

    /// Append events, then trim the oldest excess in a single drain.
    /// Returns the number of evicted events.
    pub(crate) fn extend<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = Arc<Event>>,
    {
        self.events.extend(events);
        let excess = self.events.len().saturating_sub(self.max_size);
        if excess > 0 {
            self.events.drain(..excess);
        }
        excess
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<Event>> {
        self.events.iter().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    pub(crate) fn stats(&self) -> BufferStats {
        BufferStats {
            size: self.events.len(),
            max_size: self.max_size,
            oldest_timestamp: self.events.front().map(|e| e.timestamp),
            newest_timestamp: self.events.back().map(|e| e.timestamp),
        }
    }
}
