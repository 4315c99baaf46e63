//! # vpendant Core
//!
//! Core types and the continuous-jog engine for the virtual pendant.
//! Provides the jog data model, the error taxonomy, the event bus, the jog
//! session controller, input mapping, and SCARA kinematics.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod input;
pub mod jog;
pub mod kinematics;

pub use data::{
    AxisInfo, JogDirection, JogMode, JogRequest, JogResponse, JogStopRequest, RobotState,
    RobotStatus, StepSize, MAX_STEP, MIN_STEP,
};

pub use error::{Error, Result, TransportError, ValidationError};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, RequestKind, RobotEvent,
    SessionEvent, SettingsEvent, SubscriptionId, TransportEvent,
};

pub use input::{Key, KeyBinding, KeyJogRouter, Modifiers, PendantAction, WheelCoalescer};

pub use jog::{
    JogSessionConfig, JogSessionController, JogSettingsProvider, JogTransport, LiveJogSettings,
    SessionState, SessionStatus, TransportResult,
};

pub use kinematics::{JointPosition, ScaraGeometry, ScaraPose};
