//! # Player State Machine
//!
//! Pure dispatch from `(state, notification, config)` to the next state and
//! the ordered side effects the player module must perform.
//!
//! ```text
//! idle → initialized → prepared → {playing ⇄ paused} → completed → stopped → released
//!                                                                  ↑
//!                        error ── reset ──> idle ── release ───────┘
//! ```
//!
//! The machine never assumes an engine call took effect; it only reacts to
//! notifications. Once `released`, every notification is ignored.

use crate::config::PlayConfig;
use crate::error::PlaybackError;
use crate::normalizer::PlayerEvent;
use bridge_traits::{EngineNotification, EngineState, SessionId};

/// Side effect requested by a transition, executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the engine to prepare the attached source.
    Prepare,
    /// Push latched loop, speed and volume settings to the handle.
    ApplyConfig,
    /// Resolve the `prepare` continuation.
    ResolveReady,
    /// Rewind to position zero.
    SeekToStart,
    Emit(PlayerEvent),
    /// Return the handle to `idle`.
    Reset,
    /// Release the handle, at most once.
    Release,
    /// The engine released the handle on its own; forget it without calling it.
    DropHandle,
    /// Fail the ready and seek continuations.
    FailContinuations(FailureCause),
    /// Resolve the pending seek with current info.
    ResolveSeek,
    SetPosition(u64),
    SetDuration(u64),
    /// Destroy the session and purge it from the registry.
    Teardown,
}

/// Why outstanding continuations are failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Engine { code: i32, message: String },
    Released,
}

impl FailureCause {
    pub fn to_error(&self, session: SessionId) -> PlaybackError {
        match self {
            FailureCause::Engine { code, message } => PlaybackError::Engine {
                code: *code,
                message: message.clone(),
            },
            FailureCause::Released => PlaybackError::HandleReleased(session),
        }
    }
}

/// Result of dispatching one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: EngineState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: EngineState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn stay(state: EngineState, effects: Vec<Effect>) -> Self {
        Self {
            next: state,
            effects,
        }
    }
}

/// States in which the handle accepts volume, speed and loop settings.
pub fn accepts_config(state: EngineState) -> bool {
    matches!(
        state,
        EngineState::Prepared
            | EngineState::Playing
            | EngineState::Paused
            | EngineState::Completed
            | EngineState::Stopped
    )
}

/// Dispatch a notification.
pub fn step(
    state: EngineState,
    notification: &EngineNotification,
    config: &PlayConfig,
) -> Transition {
    if state == EngineState::Released {
        return Transition::stay(state, Vec::new());
    }

    match notification {
        EngineNotification::StateChange { state: next, .. } => on_state_change(*next, config),
        EngineNotification::Error { code, message } => Transition::to(
            EngineState::Error,
            vec![
                Effect::Emit(PlayerEvent::EngineError {
                    message: message.clone(),
                }),
                Effect::FailContinuations(FailureCause::Engine {
                    code: *code,
                    message: message.clone(),
                }),
                Effect::Reset,
            ],
        ),
        EngineNotification::SeekDone { time_ms } => Transition::stay(
            state,
            vec![
                Effect::SetPosition(*time_ms),
                Effect::ResolveSeek,
                Effect::Emit(PlayerEvent::Seeked),
            ],
        ),
        EngineNotification::DurationUpdate { duration_ms } => {
            Transition::stay(state, vec![Effect::SetDuration(*duration_ms)])
        }
        EngineNotification::TimeUpdate { time_ms } => {
            Transition::stay(state, vec![Effect::SetPosition(*time_ms)])
        }
        EngineNotification::AudioInterrupt { .. } => {
            Transition::stay(state, vec![Effect::Emit(PlayerEvent::ForcePause)])
        }
        EngineNotification::EndOfStream => {
            let effects = if config.is_looping() {
                vec![Effect::Emit(PlayerEvent::Looped)]
            } else {
                Vec::new()
            };
            Transition::stay(state, effects)
        }
    }
}

fn on_state_change(next: EngineState, config: &PlayConfig) -> Transition {
    let effects = match next {
        EngineState::Idle => vec![Effect::Release],
        EngineState::Initialized => vec![Effect::Prepare],
        EngineState::Prepared => vec![Effect::ApplyConfig, Effect::ResolveReady],
        EngineState::Playing | EngineState::Paused | EngineState::Error => Vec::new(),
        EngineState::Completed => {
            let mut effects = vec![Effect::SeekToStart, Effect::Emit(PlayerEvent::Ended)];
            if config.is_auto_destroy() {
                effects.push(Effect::Teardown);
            }
            effects
        }
        EngineState::Stopped => vec![Effect::Reset],
        EngineState::Released => vec![
            Effect::DropHandle,
            Effect::FailContinuations(FailureCause::Released),
        ],
    };
    Transition::to(next, effects)
}
