//! Downstream seam for flushed batches

use crate::events::Event;
use async_trait::async_trait;

/// Receiver of normalized batches.
///
/// The normalizer only knows this trait; the bus implements it, and tests
/// implement it with collecting sinks. Implementations must not fail: every
/// error is the sink's own to contain.
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Accept a non-empty batch, in order
    async fn flush_batch(&self, events: Vec<Event>);
}
