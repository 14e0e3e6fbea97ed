//! Workspace umbrella crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-playback`). Host applications can
//! depend on `audio-toolkit-workspace` and enable the documented features
//! without wiring each crate individually:
//!
//! - `desktop-shims` (default): the [`AudioToolkit`] façade with desktop
//!   defaults for storage and lifecycle.
//! - `core-only`: the bare player and recorder modules, for hosts that run
//!   their own dispatch loop.

#[cfg(feature = "desktop-shims")]
pub use core_service::{AudioToolkit, CoreError};

#[cfg(feature = "core-only")]
pub use core_playback::{PlayerModule, RecorderModule};
