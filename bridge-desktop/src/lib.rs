//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `DesktopLifecycleObserver` reports foreground until the host says otherwise
//! - `default_app_storage_dir` resolves a per-user data folder using `dirs`
//! - `SimulatedEngine` stands in for a native media stack during development
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopLifecycleObserver, SimulatedEngine};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(SimulatedEngine::new());
//! let lifecycle = Arc::new(DesktopLifecycleObserver::new());
//! // Use in toolkit configuration
//! ```

mod engine;
mod lifecycle;

pub use engine::{SimulatedEngine, SimulatedPlayerControl, SOURCE_UNAVAILABLE};
pub use lifecycle::{default_app_storage_dir, DesktopLifecycleObserver};
