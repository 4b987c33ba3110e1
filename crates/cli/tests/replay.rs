//! End-to-end replay of JSON Lines event logs

use pulse_cli::commands::replay::{render_summary, replay, replay_path};
use pulse_cli::{ConsoleSubscriber, ConsoleVerbosity, SummaryFormat};
use pulse_config::Config;
use std::io::Write;

const LOG: &str = r#"{"type":"fs.file.created","timestamp":1000,"source":"watcher","payload":{"kind":"file","uri":"file:///src/lib.rs"}}
{"type":"editor.pointer.moved","timestamp":1001,"payload":{"kind":"editor","uri":"file:///src/lib.rs","position":{"line":1,"character":1}}}
{"type":"editor.cursor.moved","timestamp":1002,"payload":{"kind":"editor","uri":"file:///src/lib.rs","position":{"line":4,"character":2}}}
{"type":"editor.cursor.moved","timestamp":1010,"payload":{"kind":"editor","uri":"file:///src/lib.rs","position":{"line":4,"character":2}}}
not json at all
{"type":"terminal.command.finished","timestamp":1200,"payload":{"kind":"terminal","terminal_id":"t1","command":"cargo test","exit_code":101}}
"#;

#[tokio::test]
async fn test_replay_counts_every_stage() {
    let (console, lines) = ConsoleSubscriber::capturing(ConsoleVerbosity::Normal);
    let summary = replay(&Config::default(), LOG.as_bytes(), console)
        .await
        .unwrap();

    assert_eq!(summary.lines_read, 6);
    assert_eq!(summary.parse_failures, 1);
    assert_eq!(summary.normalizer.seen, 5);
    assert_eq!(summary.normalizer.normalized, 3);
    assert_eq!(summary.normalizer.noise_dropped, 1);
    assert_eq!(summary.normalizer.duplicates_dropped, 1);
    assert_eq!(summary.bus.dispatched, 3);
    assert_eq!(summary.buffer.size, 3);
    assert_eq!(summary.buffer.oldest_timestamp, Some(1000));
    assert_eq!(summary.buffer.newest_timestamp, Some(1200));
    assert_eq!(summary.per_type.get("editor.cursor.moved"), Some(&1));

    // Cursor moves are hidden at normal verbosity
    let printed = lines.lock().clone();
    assert_eq!(
        printed,
        vec![
            "📁 created: file:///src/lib.rs",
            "🚨 [t1] `cargo test` exited with 101",
        ]
    );
}

#[tokio::test]
async fn test_replay_respects_configured_buffer() {
    let mut config = Config::default();
    config.bus.max_buffer_size = 2;
    let (console, _) = ConsoleSubscriber::capturing(ConsoleVerbosity::Quiet);

    let summary = replay(&config, LOG.as_bytes(), console).await.unwrap();

    assert_eq!(summary.buffer.size, 2);
    assert_eq!(summary.buffer.max_size, 2);
    assert_eq!(summary.bus.evicted, 1);
}

#[tokio::test]
async fn test_replay_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LOG.as_bytes()).unwrap();
    let (console, _) = ConsoleSubscriber::capturing(ConsoleVerbosity::Quiet);

    let summary = replay_path(&Config::default(), Some(file.path()), console)
        .await
        .unwrap();
    assert_eq!(summary.bus.dispatched, 3);

    let json = render_summary(&summary, SummaryFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["lines_read"], 6);
    assert_eq!(value["per_type"]["fs.file.created"], 1);
}

#[tokio::test]
async fn test_missing_input_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.jsonl");
    let (console, _) = ConsoleSubscriber::capturing(ConsoleVerbosity::Quiet);

    let err = replay_path(&Config::default(), Some(&missing), console)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to open event log"));
}
