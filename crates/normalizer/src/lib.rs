//! Normalization front-end for the pulse event bus.
//!
//! Raw producer events pass through [`EventNormalizer`], which assigns
//! identity, suppresses duplicates and noise, tags metadata and batches the
//! survivors for a [`pulse_core::BatchSink`]. The normalizer knows nothing
//! about the bus; the process entry point wires the two together.

pub mod dedup;
mod metrics;
pub mod noise;
mod normalizer;


pub use dedup::dedup_key;
pub use metrics::NormalizerMetrics;
pub use noise::{NoisePolicy, NoisePredicate};
pub use normalizer::EventNormalizer;
