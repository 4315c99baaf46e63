//! Jog command types
//!
//! Direction, mode, step size, and the request/response values exchanged
//! with the pendant backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::axis::{AxisInfo, CARTESIAN_AXES, JOINT_AXES};
use crate::error::ValidationError;

/// Smallest accepted step size
pub const MIN_STEP: f64 = 0.1;
/// Largest accepted step size
pub const MAX_STEP: f64 = 10.0;

/// Direction of a jog move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JogDirection {
    /// Move towards increasing axis values.
    Positive,
    /// Move towards decreasing axis values.
    Negative,
}

impl JogDirection {
    /// Sign multiplier for this direction
    pub fn sign(self) -> f64 {
        match self {
            JogDirection::Positive => 1.0,
            JogDirection::Negative => -1.0,
        }
    }

    /// The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            JogDirection::Positive => JogDirection::Negative,
            JogDirection::Negative => JogDirection::Positive,
        }
    }

    /// Wire string used by the pendant API
    pub fn as_str(self) -> &'static str {
        match self {
            JogDirection::Positive => "positive",
            JogDirection::Negative => "negative",
        }
    }
}

impl fmt::Display for JogDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JogDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "+" => Ok(JogDirection::Positive),
            "negative" | "neg" | "-" => Ok(JogDirection::Negative),
            other => Err(ValidationError::UnknownDirection {
                direction: other.to_string(),
            }),
        }
    }
}

/// Coordinate frame in which jog axes are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JogMode {
    /// Joint space, one rotary or linear joint per axis.
    #[default]
    Joint,
    /// World (Cartesian) frame.
    World,
    /// Tool frame.
    Tool,
}

impl JogMode {
    /// All selectable modes
    pub const ALL: [JogMode; 3] = [JogMode::Joint, JogMode::World, JogMode::Tool];

    /// Wire string used by the pendant API
    pub fn as_str(self) -> &'static str {
        match self {
            JogMode::Joint => "joint",
            JogMode::World => "world",
            JogMode::Tool => "tool",
        }
    }

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            JogMode::Joint => "Joint",
            JogMode::World => "World",
            JogMode::Tool => "Tool",
        }
    }

    /// Mode number reported by the robot controller
    pub fn mode_number(self) -> i32 {
        match self {
            JogMode::Joint => 1,
            JogMode::World => 2,
            JogMode::Tool => 3,
        }
    }

    /// Map a controller mode number back to a mode
    pub fn from_mode_number(number: i32) -> Option<Self> {
        JogMode::ALL.into_iter().find(|m| m.mode_number() == number)
    }

    /// Axis table used in this mode
    pub fn axes(self) -> &'static [AxisInfo] {
        match self {
            JogMode::Joint => &JOINT_AXES,
            JogMode::World | JogMode::Tool => &CARTESIAN_AXES,
        }
    }

    /// First axis of this mode's table
    pub fn default_axis(self) -> &'static str {
        self.axes()[0].name
    }
}

impl fmt::Display for JogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JogMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "joint" => Ok(JogMode::Joint),
            "world" | "cartesian" => Ok(JogMode::World),
            "tool" => Ok(JogMode::Tool),
            other => Err(ValidationError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// A step size known to lie within [`MIN_STEP`, `MAX_STEP`]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct StepSize(f64);

impl StepSize {
    /// Validate a raw step value
    pub fn new(step: f64) -> Result<Self, ValidationError> {
        if step.is_finite() && (MIN_STEP..=MAX_STEP).contains(&step) {
            Ok(Self(step))
        } else {
            Err(ValidationError::step_out_of_range(step))
        }
    }

    /// The raw value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for StepSize {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for StepSize {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        StepSize::new(value)
    }
}

/// One incremental jog command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JogRequest {
    /// Axis name, e.g. `joint1` or `x`.
    pub axis: String,
    /// Direction of motion.
    #[serde(rename = "dir")]
    pub direction: JogDirection,
    /// Step distance or angle.
    pub step: f64,
    /// Coordinate frame.
    pub mode: JogMode,
}

impl JogRequest {
    /// Create a new jog request
    pub fn new(
        axis: impl Into<String>,
        direction: JogDirection,
        step: StepSize,
        mode: JogMode,
    ) -> Self {
        Self {
            axis: axis.into(),
            direction,
            step: step.value(),
            mode,
        }
    }

    /// Step with the direction sign applied
    pub fn signed_step(&self) -> f64 {
        self.step * self.direction.sign()
    }
}

/// Request that ends jogging on an axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JogStopRequest {
    /// Axis name.
    pub axis: String,
    /// Coordinate frame.
    pub mode: JogMode,
}

impl JogStopRequest {
    /// Create a new stop request
    pub fn new(axis: impl Into<String>, mode: JogMode) -> Self {
        Self {
            axis: axis.into(),
            mode,
        }
    }

    /// Body sent to the pendant API (`dir` is `stop`, `step` is zero)
    pub fn wire_body(&self) -> StopWireBody<'_> {
        StopWireBody {
            axis: &self.axis,
            dir: "stop",
            step: 0.0,
            mode: self.mode,
        }
    }
}

/// Serialized form of a [`JogStopRequest`]
#[derive(Debug, Serialize)]
pub struct StopWireBody<'a> {
    axis: &'a str,
    dir: &'static str,
    step: f64,
    mode: JogMode,
}

/// Reply from the pendant backend to a jog, mode or axis command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JogResponse {
    /// Whether the backend accepted the command.
    pub success: bool,
    /// Status text for display.
    #[serde(default)]
    pub message: String,
    /// Encoded command forwarded to the robot, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_sent: Option<String>,
}
