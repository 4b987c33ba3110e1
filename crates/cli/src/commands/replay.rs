//! `pulse replay`: run a recorded event log through the full pipeline

use crate::commands::SummaryFormat;
use crate::console::{ConsoleSubscriber, ConsoleVerbosity};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use parking_lot::Mutex;
use pulse_bus::{BufferStats, BusMetrics, EventBus, EventFilter, EventHandler, Priority};
use pulse_config::Config;
use pulse_core::{BatchSink, Event, HandlerError};
use pulse_normalizer::{EventNormalizer, NormalizerMetrics};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn, Instrument};

/// Outcome of a replay run
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    /// Non-blank input lines
    pub lines_read: usize,
    pub parse_failures: usize,
    pub normalizer: NormalizerMetrics,
    pub bus: BusMetrics,
    pub buffer: BufferStats,
    /// Delivered events per type
    pub per_type: BTreeMap<String, u64>,
}

/// Counts delivered events per type
#[derive(Default)]
struct TypeTally {
    counts: Mutex<BTreeMap<String, u64>>,
}

#[async_trait]
impl EventHandler for TypeTally {
    async fn handle(&self, event: Arc<Event>) -> Result<(), HandlerError> {
        *self
            .counts
            .lock()
            .entry(event.event_type.clone())
            .or_default() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "type-tally"
    }
}

/// Map `--quiet` / `-v` flags to a console verbosity
pub fn verbosity(quiet: bool, verbose: u8) -> ConsoleVerbosity {
    match (quiet, verbose) {
        (true, _) => ConsoleVerbosity::Quiet,
        (false, 0) => ConsoleVerbosity::Normal,
        (false, 1) => ConsoleVerbosity::Verbose,
        _ => ConsoleVerbosity::Debug,
    }
}

/// Replay JSON Lines from `reader` through a fresh normalizer and bus.
///
/// Malformed lines are counted and skipped. Everything still pending in the
/// normalizer is flushed before both components are disposed.
pub async fn replay<R>(config: &Config, reader: R, console: ConsoleSubscriber) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let bus = Arc::new(EventBus::new(config.bus.clone()));
    let normalizer = EventNormalizer::new(config.normalizer.clone());
    let tally = Arc::new(TypeTally::default());
    bus.subscribe(Arc::clone(&tally), EventFilter::all(), Priority::High);
    bus.subscribe(console, EventFilter::all(), Priority::Normal);
    let sink: Arc<dyn BatchSink> = bus.clone();

    let mut lines = reader.lines();
    let mut lines_read = 0usize;
    let mut parse_failures = 0usize;
    while let Some(line) = lines.next_line().await.wrap_err("failed to read event log")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        lines_read += 1;

        match Event::from_json(line) {
            Ok(event) => normalizer.add_to_batch(event, &sink).await,
            Err(e) => {
                parse_failures += 1;
                warn!(line = lines_read, error = %e, "Skipping malformed event");
            }
        }
    }

    let flushed = normalizer.flush(bus.as_ref()).await;
    debug!(flushed, "Flushed final batch");

    let summary = ReplaySummary {
        lines_read,
        parse_failures,
        normalizer: normalizer.metrics(),
        bus: bus.metrics(),
        buffer: bus.buffer_stats(),
        per_type: tally.counts.lock().clone(),
    };

    normalizer.dispose();
    bus.dispose();
    info!(
        lines = summary.lines_read,
        dispatched = summary.bus.dispatched,
        "Replay finished"
    );
    Ok(summary)
}

/// Replay from a file, or from stdin when `input` is `None` or `-`
pub async fn replay_path(
    config: &Config,
    input: Option<&Path>,
    console: ConsoleSubscriber,
) -> Result<ReplaySummary> {
    match input.filter(|path| *path != Path::new("-")) {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .wrap_err_with(|| format!("failed to open event log '{}'", path.display()))?;
            replay(config, BufReader::new(file), console).await
        }
        None => replay(config, BufReader::new(tokio::io::stdin()), console).await,
    }
}

pub fn render_summary(summary: &ReplaySummary, format: SummaryFormat) -> Result<String> {
    match format {
        SummaryFormat::Json => {
            serde_json::to_string_pretty(summary).wrap_err("failed to serialize replay summary")
        }
        SummaryFormat::Text => {
            let mut out = String::new();
            let n = &summary.normalizer;
            let b = &summary.bus;
            writeln!(out, "Replay summary")?;
            writeln!(out, "  lines read        {}", summary.lines_read)?;
            writeln!(out, "  parse failures    {}", summary.parse_failures)?;
            writeln!(
                out,
                "  normalized        {} of {} ({} duplicates, {} noise)",
                n.normalized, n.seen, n.duplicates_dropped, n.noise_dropped
            )?;
            writeln!(
                out,
                "  batches flushed   {} ({} events)",
                n.batches_flushed, n.events_flushed
            )?;
            writeln!(
                out,
                "  dispatched        {} ({} deliveries, {} handler failures)",
                b.dispatched, b.deliveries, b.handler_failures
            )?;
            match (summary.buffer.oldest_timestamp, summary.buffer.newest_timestamp) {
                (Some(oldest), Some(newest)) => writeln!(
                    out,
                    "  buffer            {}/{} (oldest {}, newest {})",
                    summary.buffer.size, summary.buffer.max_size, oldest, newest
                )?,
                _ => writeln!(
                    out,
                    "  buffer            {}/{} (empty)",
                    summary.buffer.size, summary.buffer.max_size
                )?,
            }
            if !summary.per_type.is_empty() {
                writeln!(out, "  events by type")?;
                let width = summary.per_type.keys().map(String::len).max().unwrap_or(0);
                for (event_type, count) in &summary.per_type {
                    writeln!(out, "    {:<width$}  {}", event_type, count, width = width)?;
                }
            }
            Ok(out)
        }
    }
}

pub async fn execute(
    config: &Config,
    input: Option<&Path>,
    verbosity: ConsoleVerbosity,
    format: SummaryFormat,
) -> Result<()> {
    let console = ConsoleSubscriber::with_config(
        std::io::IsTerminal::is_terminal(&std::io::stderr()),
        verbosity,
    );
    let label = input
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    let summary = replay_path(config, input, console)
        .instrument(pulse_utils::replay_span(&label))
        .await?;
    print!("{}", render_summary(&summary, format)?);
    Ok(())
}
