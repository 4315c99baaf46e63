//! Data models for vpendant
//!
//! Jog commands, the axis catalog, and robot state reports.

pub mod axis;
pub mod jog;
pub mod robot;

pub use axis::{axis_text, AxisInfo, CARTESIAN_AXES, JOINT_AXES};
pub use jog::{
    JogDirection, JogMode, JogRequest, JogResponse, JogStopRequest, StepSize, MAX_STEP, MIN_STEP,
};
pub use robot::{RobotState, RobotStatus, POSITION_CHANGE_THRESHOLD};
