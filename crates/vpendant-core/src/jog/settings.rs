//! Thread-safe live jog selection
//!
//! Holds the operator's current mode, axis, and step and serves them to the
//! session controller through [`JogSettingsProvider`].

use parking_lot::RwLock;
use std::sync::Arc;

use super::traits::JogSettingsProvider;
use crate::data::{AxisInfo, JogMode};
use crate::error::ValidationError;
use crate::event_bus::{AppEvent, EventBus, SettingsEvent};

/// Snapshot of the live selection
#[derive(Debug, Clone, PartialEq)]
pub struct JogSelection {
    /// Jog mode.
    pub mode: JogMode,
    /// Canonical axis name.
    pub axis: String,
    /// Step value as entered.
    pub step: f64,
}

impl Default for JogSelection {
    fn default() -> Self {
        Self {
            mode: JogMode::Joint,
            axis: JogMode::Joint.default_axis().to_string(),
            step: 1.0,
        }
    }
}

/// Live, shareable jog settings
#[derive(Debug, Default)]
pub struct LiveJogSettings {
    selection: RwLock<JogSelection>,
    events: Option<Arc<EventBus>>,
}

impl LiveJogSettings {
    /// Create settings with an initial selection
    ///
    /// The axis is resolved against the mode; an unknown axis falls back to
    /// the mode's first axis.
    pub fn new(mode: JogMode, axis: &str, step: f64) -> Self {
        let axis = AxisInfo::lookup(mode, axis)
            .map(|info| info.name)
            .unwrap_or_else(|_| mode.default_axis());
        Self {
            selection: RwLock::new(JogSelection {
                mode,
                axis: axis.to_string(),
                step,
            }),
            events: None,
        }
    }

    /// Publish settings changes on `events`
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Copy of the current selection
    pub fn selection(&self) -> JogSelection {
        self.selection.read().clone()
    }

    /// Change the jog mode
    ///
    /// Keeps the axis when it exists in the new mode, otherwise selects the
    /// mode's first axis.
    pub fn set_mode(&self, mode: JogMode) {
        let mut published = vec![AppEvent::Settings(SettingsEvent::ModeChanged { mode })];
        {
            let mut selection = self.selection.write();
            selection.mode = mode;
            if AxisInfo::lookup(mode, &selection.axis).is_err() {
                selection.axis = mode.default_axis().to_string();
                published.push(AppEvent::Settings(SettingsEvent::AxisChanged {
                    axis: selection.axis.clone(),
                }));
            }
        }
        self.publish(published);
    }

    /// Select an axis by name or alias within the current mode
    pub fn select_axis(&self, name: &str) -> Result<&'static AxisInfo, ValidationError> {
        let info = {
            let mut selection = self.selection.write();
            let info = AxisInfo::lookup(selection.mode, name)?;
            selection.axis = info.name.to_string();
            info
        };
        self.publish(vec![AppEvent::Settings(SettingsEvent::AxisChanged {
            axis: info.name.to_string(),
        })]);
        Ok(info)
    }

    /// Select an axis by its 1-based number within the current mode
    pub fn select_axis_number(&self, number: u8) -> Result<&'static AxisInfo, ValidationError> {
        let mode = self.selection.read().mode;
        let info = AxisInfo::by_number(mode, number).ok_or_else(|| ValidationError::UnknownAxis {
            axis: number.to_string(),
            mode: mode.to_string(),
        })?;
        self.select_axis(info.name)
    }

    /// Update the step value
    ///
    /// Not validated here; the controller checks it on every send.
    pub fn set_step(&self, step: f64) {
        self.selection.write().step = step;
        self.publish(vec![AppEvent::Settings(SettingsEvent::StepChanged { step })]);
    }

    fn publish(&self, events: Vec<AppEvent>) {
        if let Some(bus) = &self.events {
            for event in events {
                let _ = bus.publish(event);
            }
        }
    }
}

impl JogSettingsProvider for LiveJogSettings {
    fn axis(&self) -> String {
        self.selection.read().axis.clone()
    }

    fn mode(&self) -> JogMode {
        self.selection.read().mode
    }

    fn step(&self) -> f64 {
        self.selection.read().step
    }
}
