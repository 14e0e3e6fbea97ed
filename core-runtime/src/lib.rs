//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio toolkit core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Per-session event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the player and recorder modules
//! depend on. It establishes the logging conventions and the event stream the
//! application layer subscribes to (`RCTAudioPlayerEvent:<id>` and
//! `RCTAudioRecorderEvent:<id>`).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
