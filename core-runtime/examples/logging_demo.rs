//! Logging system demonstration
//!
//! Shows the output formats and host sink mirroring with the kind of records
//! player and recorder sessions produce.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example logging_demo
//!
//! # JSON format, mirrored into the console sink
//! cargo run --example logging_demo -- json sink
//!
//! # Compact format
//! cargo run --example logging_demo -- compact
//! ```

use bridge_traits::logging::{ConsoleLogger, LogLevel};
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};
use std::env;
use std::sync::Arc;
use tracing::{debug, info, instrument, span, warn, Level};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug)
        .with_filter("logging_demo=debug,core_runtime=debug");

    if args.get(2).map(String::as_str) == Some("sink") {
        config = config.with_logger_sink(Arc::new(ConsoleLogger::default()));
    }

    init_logging(config)?;
    info!(format = ?format, "Logging initialized");

    player_session(1, "/data/storage/el2/base/haps/entry/files/intro.mp3").await;
    recorder_session(2);

    info!("Demo complete");
    Ok(())
}

#[instrument(skip(path))]
async fn player_session(session: i64, path: &str) {
    debug!(source = strip_path(path), "Attaching source");
    debug!(from = "idle", to = "initialized", "Player state transition");
    debug!(from = "initialized", to = "prepared", "Player state transition");
    tokio::task::yield_now().await;
    warn!(error = "seek rejected", "Rewind after completion failed");
}

fn recorder_session(session: i64) {
    let span = span!(Level::INFO, "recorder", session);
    let _enter = span.enter();

    debug!(bitrate = 48_000, channels = 2, sample_rate = 48_000, "Preparing recorder");
    info!("Destroyed recorder");
}
