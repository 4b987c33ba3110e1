//! Console subscriber for terminal output

use async_trait::async_trait;
use parking_lot::Mutex;
use pulse_bus::EventHandler;
use pulse_core::{DiagnosticSeverity, Event, EventPayload, HandlerError, SuggestionVerdict};
use std::io;
use std::sync::Arc;

/// Console subscriber that prints delivered events
pub struct ConsoleSubscriber {
    /// Use colored output
    use_colors: bool,
    /// Verbosity level
    verbosity: ConsoleVerbosity,
    /// Output writer
    writer: ConsoleWriter,
}

/// Console verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConsoleVerbosity {
    /// Only failures: error diagnostics and failed terminal commands
    Quiet,
    /// File, document lifecycle, terminal and suggestion events (default)
    Normal,
    /// Every event, including cursor and selection movement
    Verbose,
    /// Every event with id, source and metadata
    Debug,
}

/// Console output destination
enum ConsoleWriter {
    Stderr,
    Stdout,
    /// In-memory capture, used by tests
    Capture(Arc<Mutex<Vec<String>>>),
}

impl ConsoleSubscriber {
    /// Create a new console subscriber with default settings
    pub fn new() -> Self {
        Self::with_config(io::IsTerminal::is_terminal(&io::stderr()), ConsoleVerbosity::Normal)
    }

    /// Create a console subscriber with custom settings
    pub fn with_config(use_colors: bool, verbosity: ConsoleVerbosity) -> Self {
        Self {
            use_colors,
            verbosity,
            writer: ConsoleWriter::Stderr,
        }
    }

    /// Create a console subscriber for CI environments
    pub fn for_ci() -> Self {
        Self {
            use_colors: false,
            verbosity: ConsoleVerbosity::Normal,
            writer: ConsoleWriter::Stdout,
        }
    }

    /// Create an uncoloured subscriber that records lines instead of printing
    pub fn capturing(verbosity: ConsoleVerbosity) -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Self {
            use_colors: false,
            verbosity,
            writer: ConsoleWriter::Capture(Arc::clone(&lines)),
        };
        (subscriber, lines)
    }

    pub fn verbosity(&self) -> ConsoleVerbosity {
        self.verbosity
    }

    /// Format an event for console output; `None` when the verbosity hides it
    pub fn format_event(&self, event: &Event) -> Option<String> {
        let line = match &event.payload {
            EventPayload::Diagnostics(report) => {
                let errors = report.count_at_least(DiagnosticSeverity::Error);
                let warnings = report.count_at_least(DiagnosticSeverity::Warning) - errors;
                if errors > 0 {
                    self.colorize(
                        &format!("❌ {}: {} errors, {} warnings", report.uri, errors, warnings),
                        "red",
                    )
                } else if self.shows(ConsoleVerbosity::Normal) {
                    self.colorize(
                        &format!("🩺 {}: {} warnings", report.uri, warnings),
                        if warnings > 0 { "yellow" } else { "green" },
                    )
                } else {
                    return None;
                }
            }
            EventPayload::Terminal(terminal) => {
                let command = terminal.command.as_deref().unwrap_or("<unknown command>");
                match terminal.exit_code {
                    Some(code) if code != 0 => self.colorize(
                        &format!("🚨 [{}] `{}` exited with {}", terminal.terminal_id, command, code),
                        "red",
                    ),
                    Some(_) if self.shows(ConsoleVerbosity::Normal) => self.colorize(
                        &format!("✅ [{}] `{}` succeeded", terminal.terminal_id, command),
                        "green",
                    ),
                    None if self.shows(ConsoleVerbosity::Normal) => self.colorize(
                        &format!("▶ [{}] `{}`", terminal.terminal_id, command),
                        "blue",
                    ),
                    _ => return None,
                }
            }
            EventPayload::File(file) if self.shows(ConsoleVerbosity::Normal) => {
                let action = event.event_type.rsplit('.').next().unwrap_or_default();
                match &file.previous_uri {
                    Some(previous) => {
                        self.colorize(&format!("📁 {}: {} → {}", action, previous, file.uri), "cyan")
                    }
                    None => self.colorize(&format!("📁 {}: {}", action, file.uri), "cyan"),
                }
            }
            EventPayload::Suggestion(outcome) if self.shows(ConsoleVerbosity::Normal) => {
                let (verb, color) = match outcome.verdict {
                    SuggestionVerdict::Shown => ("shown", "white"),
                    SuggestionVerdict::Accepted => ("accepted", "green"),
                    SuggestionVerdict::Rejected => ("rejected", "yellow"),
                    SuggestionVerdict::Dismissed => ("dismissed", "white"),
                };
                self.colorize(&format!("🤖 suggestion {} {}", outcome.suggestion_id, verb), color)
            }
            EventPayload::Editor(editor) => {
                let lifecycle = event.event_type.starts_with("editor.document.")
                    && !event.event_type.ends_with(".changed");
                if !(self.shows(ConsoleVerbosity::Verbose)
                    || (lifecycle && self.shows(ConsoleVerbosity::Normal)))
                {
                    return None;
                }
                match editor.position {
                    Some(position) => {
                        format!("✏️  {} {}:{}", event.event_type, editor.uri, position)
                    }
                    None => format!("✏️  {} {}", event.event_type, editor.uri),
                }
            }
            _ if self.shows(ConsoleVerbosity::Verbose) => format!("• {}", event.event_type),
            _ => return None,
        };

        if self.shows(ConsoleVerbosity::Debug) {
            let metadata = serde_json::to_string(&event.metadata).unwrap_or_default();
            Some(format!(
                "{} (id={}, source={}, ts={}, metadata={})",
                line, event.id, event.source, event.timestamp, metadata
            ))
        } else {
            Some(line)
        }
    }

    fn shows(&self, level: ConsoleVerbosity) -> bool {
        self.verbosity >= level
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        let color_code = match color {
            "red" => "\x1b[31m",
            "green" => "\x1b[32m",
            "yellow" => "\x1b[33m",
            "blue" => "\x1b[34m",
            "cyan" => "\x1b[36m",
            "white" => "\x1b[37m",
            _ => "\x1b[0m",
        };

        format!("{}{}\x1b[0m", color_code, text)
    }

    /// Write output to the configured destination
    fn write_output(&self, content: String) {
        match &self.writer {
            ConsoleWriter::Stderr => eprintln!("{}", content),
            ConsoleWriter::Stdout => println!("{}", content),
            ConsoleWriter::Capture(lines) => lines.lock().push(content),
        }
    }
}

impl Default for ConsoleSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for ConsoleSubscriber {
    async fn handle(&self, event: Arc<Event>) -> Result<(), HandlerError> {
        if let Some(formatted) = self.format_event(&event) {
            self.write_output(formatted);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
