//! Input mapping
//!
//! Translates keyboard and mouse-wheel input into jog session calls. The
//! session controller itself never looks at input devices.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::data::JogDirection;
use crate::error::ValidationError;
use crate::jog::{JogSessionController, LiveJogSettings};

/// Idle time after the last wheel event before the wheel session stops
pub const DEFAULT_WHEEL_IDLE: Duration = Duration::from_millis(150);

/// A key as reported by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// A printable character.
    Char(char),
}

/// Modifier and focus state accompanying a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Control held.
    pub ctrl: bool,
    /// Alt held.
    pub alt: bool,
    /// Shift held.
    pub shift: bool,
    /// A text field has keyboard focus.
    pub text_focus: bool,
}

impl Modifiers {
    /// No modifiers, no text focus
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        text_focus: false,
    };
}

/// What a key maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendantAction {
    /// Hold-to-jog in a direction.
    Jog(JogDirection),
    /// Select the joint with this 1-based number.
    SelectJoint(u8),
}

/// Keyboard binding table
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBinding;

impl KeyBinding {
    /// Map a key press to a pendant action
    ///
    /// Control-modified keys and keys typed into a text field map to nothing.
    pub fn map(key: Key, modifiers: Modifiers) -> Option<PendantAction> {
        if modifiers.ctrl || modifiers.text_focus {
            return None;
        }

        match key {
            Key::ArrowLeft | Key::Char('-') => Some(PendantAction::Jog(JogDirection::Negative)),
            Key::ArrowRight | Key::Char('+') | Key::Char('=') => {
                Some(PendantAction::Jog(JogDirection::Positive))
            }
            Key::Char(c @ '1'..='6') => c
                .to_digit(10)
                .map(|digit| PendantAction::SelectJoint(digit as u8)),
            Key::Char(_) => None,
        }
    }
}

/// Routes key-down and key-up events to a jog session
///
/// Auto-repeat key-downs of the held key are coalesced into the running
/// session. Key-up of the key that started the session stops it; key-up of
/// any other key is ignored.
pub struct KeyJogRouter {
    controller: Arc<JogSessionController>,
    settings: Arc<LiveJogSettings>,
    held: Option<Key>,
}

impl KeyJogRouter {
    pub fn new(controller: Arc<JogSessionController>, settings: Arc<LiveJogSettings>) -> Self {
        Self {
            controller,
            settings,
            held: None,
        }
    }

    /// Key that owns the running session
    pub fn held_key(&self) -> Option<Key> {
        self.held
    }

    /// Handle a key-down; returns the action it mapped to
    pub fn key_down(
        &mut self,
        key: Key,
        modifiers: Modifiers,
    ) -> Result<Option<PendantAction>, ValidationError> {
        let Some(action) = KeyBinding::map(key, modifiers) else {
            return Ok(None);
        };

        match action {
            PendantAction::Jog(direction) => {
                if self.held.is_some() && self.controller.active_direction() == Some(direction) {
                    return Ok(Some(action));
                }
                self.controller.start(direction)?;
                self.held = Some(key);
            }
            PendantAction::SelectJoint(number) => {
                self.settings.select_axis_number(number)?;
            }
        }

        Ok(Some(action))
    }

    /// Handle a key-up
    pub fn key_up(&mut self, key: Key) {
        if self.held == Some(key) {
            self.held = None;
            self.controller.stop();
        }
    }

    /// Stop any key-driven session, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        if self.held.take().is_some() {
            self.controller.stop();
        }
    }
}

/// Turns a stream of wheel events into one jog session
///
/// Each event starts a session in its direction unless one is already
/// running that way, and pushes the idle deadline out. The session stops
/// once no wheel event has arrived for the idle period.
pub struct WheelCoalescer {
    controller: Arc<JogSessionController>,
    idle: Duration,
    deadline: Mutex<Option<JoinHandle<()>>>,
}

impl WheelCoalescer {
    pub fn new(controller: Arc<JogSessionController>) -> Self {
        Self::with_idle(controller, DEFAULT_WHEEL_IDLE)
    }

    pub fn with_idle(controller: Arc<JogSessionController>, idle: Duration) -> Self {
        Self {
            controller,
            idle,
            deadline: Mutex::new(None),
        }
    }

    /// Direction for a vertical wheel delta: scrolling down jogs negative
    pub fn direction_for(delta_y: f64) -> JogDirection {
        if delta_y > 0.0 {
            JogDirection::Negative
        } else {
            JogDirection::Positive
        }
    }

    /// Handle one wheel event; must run inside a tokio runtime
    pub fn on_wheel(&self, delta_y: f64) -> Result<JogDirection, ValidationError> {
        let direction = Self::direction_for(delta_y);
        if self.controller.active_direction() != Some(direction) {
            self.controller.start(direction)?;
        }
        self.arm(Arc::downgrade(&self.controller));
        Ok(direction)
    }

    /// Whether an idle deadline is pending
    pub fn is_armed(&self) -> bool {
        self.deadline
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Drop the pending deadline without stopping the session
    pub fn disarm(&self) {
        if let Some(task) = self.deadline.lock().take() {
            task.abort();
        }
    }

    fn arm(&self, controller: Weak<JogSessionController>) {
        let idle = self.idle;
        let task = tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            if let Some(controller) = controller.upgrade() {
                tracing::debug!("Wheel idle for {:?}, stopping jog", idle);
                controller.stop();
            }
        });

        if let Some(previous) = self.deadline.lock().replace(task) {
            previous.abort();
        }
    }
}

impl Drop for WheelCoalescer {
    fn drop(&mut self) {
        self.disarm();
    }
}
