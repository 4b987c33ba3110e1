//! Utility functions for common event patterns

use crate::constants::*;
use crate::events::types::{EditorActivity, FileChange, TerminalActivity};
use crate::events::Event;

/// Create a file created event
pub fn file_created(uri: &str) -> Event {
    Event::new(FS_FILE_CREATED, FileChange::new(uri))
}

/// Create a file deleted event
pub fn file_deleted(uri: &str) -> Event {
    Event::new(FS_FILE_DELETED, FileChange::new(uri))
}

/// Create a document changed event
pub fn document_changed(uri: &str, version: u32) -> Event {
    let mut activity = EditorActivity::new(uri);
    activity.version = Some(version);
    Event::new(EDITOR_DOCUMENT_CHANGED, activity)
}

/// Create a cursor moved event
pub fn cursor_moved(uri: &str, line: u32, character: u32) -> Event {
    Event::new(EDITOR_CURSOR_MOVED, EditorActivity::new(uri).at(line, character))
}

/// Create a pointer moved event
pub fn pointer_moved(uri: &str, line: u32, character: u32) -> Event {
    Event::new(EDITOR_POINTER_MOVED, EditorActivity::new(uri).at(line, character))
}

/// Create a terminal command finished event
pub fn terminal_command_finished(terminal_id: &str, command: &str, exit_code: i32) -> Event {
    Event::new(
        TERMINAL_COMMAND_FINISHED,
        TerminalActivity {
            terminal_id: terminal_id.to_string(),
            command: Some(command.to_string()),
            cwd: None,
            exit_code: Some(exit_code),
        },
    )
}
