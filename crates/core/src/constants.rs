/// Constants used throughout the pulse codebase
// File system events
pub const FS_FILE_CREATED: &str = "fs.file.created";
pub const FS_FILE_CHANGED: &str = "fs.file.changed";
pub const FS_FILE_DELETED: &str = "fs.file.deleted";
pub const FS_FILE_RENAMED: &str = "fs.file.renamed";

// Editor events
pub const EDITOR_DOCUMENT_OPENED: &str = "editor.document.opened";
pub const EDITOR_DOCUMENT_CHANGED: &str = "editor.document.changed";
pub const EDITOR_DOCUMENT_SAVED: &str = "editor.document.saved";
pub const EDITOR_CURSOR_MOVED: &str = "editor.cursor.moved";
pub const EDITOR_SELECTION_CHANGED: &str = "editor.selection.changed";
pub const EDITOR_POINTER_MOVED: &str = "editor.pointer.moved";

// Diagnostics, terminal and AI suggestion events
pub const DIAGNOSTICS_UPDATED: &str = "diagnostics.updated";
pub const TERMINAL_COMMAND_STARTED: &str = "terminal.command.started";
pub const TERMINAL_COMMAND_FINISHED: &str = "terminal.command.finished";
pub const AI_SUGGESTION_SHOWN: &str = "ai.suggestion.shown";
pub const AI_SUGGESTION_ACCEPTED: &str = "ai.suggestion.accepted";
pub const AI_SUGGESTION_REJECTED: &str = "ai.suggestion.rejected";

// Metadata keys added during normalization
pub const META_NORMALIZED_AT: &str = "normalized_at";
pub const META_PLATFORM: &str = "platform";
pub const META_ENVIRONMENT: &str = "environment";

// Environment variable names
pub const PULSE_LOG_VAR: &str = "PULSE_LOG";
pub const PULSE_LOG_LEVEL_VAR: &str = "PULSE_LOG_LEVEL";
pub const PULSE_MAX_BUFFER_SIZE_VAR: &str = "PULSE_MAX_BUFFER_SIZE";
pub const PULSE_DEDUP_WINDOW_MS_VAR: &str = "PULSE_DEDUP_WINDOW_MS";
pub const PULSE_BATCH_SIZE_VAR: &str = "PULSE_BATCH_SIZE";
pub const PULSE_BATCH_DELAY_MS_VAR: &str = "PULSE_BATCH_DELAY_MS";
pub const PULSE_ENVIRONMENT_VAR: &str = "PULSE_ENVIRONMENT";

// Defaults
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1000;
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 100;
pub const DEFAULT_DEDUP_GC_THRESHOLD: usize = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 100;
pub const DEFAULT_SOURCE: &str = "unknown";
pub const DEFAULT_ENVIRONMENT: &str = "ide";
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Entries older than this many dedup windows are collected
pub const DEDUP_GC_AGE_FACTOR: u64 = 10;
