//! Event type definitions for the event bus.
//!
//! This module defines all pendant events organized by category.
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::data::{JogDirection, JogMode, RobotState};

/// Root event enum for all pendant events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Jog session lifecycle
    Session(SessionEvent),
    /// Outcome of requests sent to the pendant backend
    Transport(TransportEvent),
    /// Robot state reports
    Robot(RobotEvent),
    /// Live jog settings changes
    Settings(SettingsEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Session(_) => EventCategory::Session,
            AppEvent::Transport(_) => EventCategory::Transport,
            AppEvent::Robot(_) => EventCategory::Robot,
            AppEvent::Settings(_) => EventCategory::Settings,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Session(e) => e.description(),
            AppEvent::Transport(e) => e.description(),
            AppEvent::Robot(e) => e.description(),
            AppEvent::Settings(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Jog session lifecycle events.
    Session,
    /// Transport outcome events.
    Transport,
    /// Robot state events.
    Robot,
    /// Settings change events.
    Settings,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Session => write!(f, "Session"),
            EventCategory::Transport => write!(f, "Transport"),
            EventCategory::Robot => write!(f, "Robot"),
            EventCategory::Settings => write!(f, "Settings"),
        }
    }
}

/// Jog session lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A session went active and sent its first request.
    Started {
        /// Direction of the session.
        direction: JogDirection,
        /// Axis used for the first request.
        axis: String,
        /// Mode used for the first request.
        mode: JogMode,
    },
    /// A repeat tick sent a request.
    Tick {
        /// Requests sent so far in this session, including the first.
        count: u64,
    },
    /// The session went idle and its stop request was submitted.
    Stopped {
        /// Time between start and stop.
        duration: Duration,
        /// Requests sent during the session.
        count: u64,
    },
    /// A start was refused, or a tick found invalid settings.
    Rejected {
        /// Why the request was refused.
        reason: String,
    },
}

impl SessionEvent {
    fn description(&self) -> String {
        match self {
            SessionEvent::Started {
                direction,
                axis,
                mode,
            } => format!("Jog started: {} {} ({} mode)", axis, direction, mode),
            SessionEvent::Tick { count } => format!("Jog tick #{}", count),
            SessionEvent::Stopped { duration, count } => format!(
                "Jog stopped after {} ms, {} requests",
                duration.as_millis(),
                count
            ),
            SessionEvent::Rejected { reason } => format!("Jog rejected: {}", reason),
        }
    }
}

/// Kind of request a transport event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// A jog move.
    Jog,
    /// A jog stop.
    Stop,
}

/// Transport outcome events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// The backend accepted a request.
    Delivered {
        /// Request kind.
        kind: RequestKind,
        /// Backend message.
        message: String,
    },
    /// A jog request failed.
    JogFailed {
        /// Axis of the failed request.
        axis: String,
        /// Error text.
        error: String,
    },
    /// A stop request failed.
    StopFailed {
        /// Axis of the failed request.
        axis: String,
        /// Error text.
        error: String,
    },
}

impl TransportEvent {
    fn description(&self) -> String {
        match self {
            TransportEvent::Delivered { kind, message } => {
                format!("{:?} delivered: {}", kind, message)
            }
            TransportEvent::JogFailed { axis, error } => {
                format!("Jog on {} failed: {}", axis, error)
            }
            TransportEvent::StopFailed { axis, error } => {
                format!("Stop on {} failed: {}", axis, error)
            }
        }
    }
}

/// Robot state events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RobotEvent {
    /// A state report differing from the previous one.
    StateChanged(RobotState),
    /// Polling the backend failed.
    PollFailed {
        /// Error text.
        error: String,
    },
}

impl RobotEvent {
    fn description(&self) -> String {
        match self {
            RobotEvent::StateChanged(state) => format!(
                "Robot state: J=({:.1}, {:.1}, {:.1}) XYZ=({:.1}, {:.1}, {:.1}) mode={}",
                state.joint_value(0),
                state.joint_value(1),
                state.joint_value(2),
                state.cartesian_value(0),
                state.cartesian_value(1),
                state.cartesian_value(2),
                state.status.jog_mode_text
            ),
            RobotEvent::PollFailed { error } => format!("State poll failed: {}", error),
        }
    }
}

/// Live jog settings changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingsEvent {
    /// Jog mode changed.
    ModeChanged {
        /// The new mode.
        mode: JogMode,
    },
    /// Selected axis changed.
    AxisChanged {
        /// The new axis name.
        axis: String,
    },
    /// Step size changed.
    StepChanged {
        /// The new step value (not necessarily valid).
        step: f64,
    },
}

impl SettingsEvent {
    fn description(&self) -> String {
        match self {
            SettingsEvent::ModeChanged { mode } => format!("Mode changed to {}", mode),
            SettingsEvent::AxisChanged { axis } => format!("Axis changed to {}", axis),
            SettingsEvent::StepChanged { step } => format!("Step changed to {}", step),
        }
    }
}
