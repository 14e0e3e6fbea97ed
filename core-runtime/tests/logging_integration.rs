//! Integration tests for logging configuration

use bridge_traits::logging::{ConsoleLogger, LogLevel};
use core_runtime::logging::{strip_path, LogFormat, LoggingConfig};
use std::sync::Arc;

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_target(false)
        .with_thread_info(true)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
    assert!(config.logger_sink.is_some());
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_filter_configuration() {
    let config = LoggingConfig::default().with_filter("core_playback=trace,core_service=debug");

    assert_eq!(
        config.filter.as_deref(),
        Some("core_playback=trace,core_service=debug")
    );
}

#[test]
fn test_media_paths_are_stripped() {
    // Sandboxed app storage
    assert_eq!(
        strip_path("/data/storage/el2/base/haps/entry/files/voice.m4a"),
        "voice.m4a"
    );
    // File manager URIs
    assert_eq!(strip_path("file://docs/storage/Users/currentUser/a.mp3"), "a.mp3");
    // Windows
    assert_eq!(strip_path("D:\\recordings\\take1.m4a"), "take1.m4a");
    // Remote URLs keep only the last segment
    assert_eq!(strip_path("https://cdn.example.com/tracks/loop.mp3"), "loop.mp3");

    assert_eq!(strip_path(""), "");
}

#[test]
fn test_debug_hides_sink() {
    let config = LoggingConfig::default().with_logger_sink(Arc::new(ConsoleLogger::default()));
    let rendered = format!("{:?}", config);

    assert!(rendered.contains("LoggerSink { ... }"));
}
