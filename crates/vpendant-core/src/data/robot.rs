//! Robot state as reported by the pendant backend

use serde::{Deserialize, Serialize};

use super::axis::axis_text;
use super::jog::JogMode;

/// Joint and Cartesian values smaller than this are treated as noise
pub const POSITION_CHANGE_THRESHOLD: f64 = 0.1;

/// Status block of a robot state report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotStatus {
    /// Number of axes on the robot.
    pub axis_count: i32,
    /// Whether the controller currently allows jogging.
    pub allow_jog: bool,
    /// Controller jog mode number.
    pub jog_mode: i32,
    /// Controller jog mode name.
    pub jog_mode_text: String,
    /// Selected axis number (1-based).
    pub selected_axis: i32,
    /// Selected axis name.
    pub selected_axis_text: String,
    /// Power state code.
    pub power_state: i32,
    /// Error description, empty when healthy.
    pub error_desc: String,
}

impl RobotStatus {
    /// Jog mode, if the controller reports one this pendant knows
    pub fn mode(&self) -> Option<JogMode> {
        JogMode::from_mode_number(self.jog_mode)
    }

    /// Display name for the selected axis, derived when the backend omits it
    pub fn selected_axis_label(&self) -> String {
        if !self.selected_axis_text.is_empty() {
            return self.selected_axis_text.clone();
        }
        let mode = self.mode().unwrap_or(JogMode::Joint);
        axis_text(mode, u8::try_from(self.selected_axis).unwrap_or(0))
    }

    /// Whether the controller reports an error
    pub fn has_error(&self) -> bool {
        !self.error_desc.trim().is_empty()
    }
}

/// Full robot state snapshot from `/api/jog/state`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotState {
    /// X, Y, Z, Rx, Ry, Rz.
    pub cartesian: Vec<f64>,
    /// Joint values J1..J12.
    pub joint: Vec<f64>,
    /// Tool data.
    pub tool: Vec<f64>,
    /// Status block.
    pub status: RobotStatus,
}

impl RobotState {
    /// Joint value at `index`, zero when missing
    pub fn joint_value(&self, index: usize) -> f64 {
        self.joint.get(index).copied().unwrap_or(0.0)
    }

    /// Cartesian value at `index`, zero when missing
    pub fn cartesian_value(&self, index: usize) -> f64 {
        self.cartesian.get(index).copied().unwrap_or(0.0)
    }

    /// Whether `other` differs enough from `self` to be worth reporting
    ///
    /// Only the first three joints and XYZ are compared, plus mode and
    /// error text.
    pub fn has_changed(&self, other: &RobotState) -> bool {
        let moved = |a: &[f64], b: &[f64]| {
            a.iter()
                .zip(b.iter())
                .take(3)
                .any(|(x, y)| (x - y).abs() > POSITION_CHANGE_THRESHOLD)
        };

        moved(&self.joint, &other.joint)
            || moved(&self.cartesian, &other.cartesian)
            || self.status.jog_mode != other.status.jog_mode
            || self.status.error_desc != other.status.error_desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RobotState {
        RobotState {
            cartesian: vec![200.0, 0.0, 50.0, 0.0, 0.0, 0.0],
            joint: vec![0.0, 0.0, 50.0, 0.0],
            tool: vec![],
            status: RobotStatus {
                axis_count: 4,
                allow_jog: true,
                jog_mode: 1,
                jog_mode_text: "Joint".to_string(),
                selected_axis: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_small_moves_ignored() {
        let a = sample();
        let mut b = sample();
        b.joint[0] += 0.05;
        b.cartesian[5] += 30.0;
        assert!(!a.has_changed(&b));
    }

    #[test]
    fn test_changes_detected() {
        let a = sample();

        let mut b = sample();
        b.joint[1] += 0.5;
        assert!(a.has_changed(&b));

        let mut c = sample();
        c.status.jog_mode = 2;
        assert!(a.has_changed(&c));

        let mut d = sample();
        d.status.error_desc = "E-stop".to_string();
        assert!(a.has_changed(&d));
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "cartesian": [1,2,3,4,5,6],
            "joint": [10,20,30],
            "tool": [0,0,0,0,0,0],
            "status": {"axis_count": 4, "allow_jog": true, "jog_mode": 2,
                       "jog_mode_text": "World", "selected_axis": 4,
                       "selected_axis_text": "", "power_state": 1, "error_desc": ""}
        }"#;
        let state: RobotState = serde_json::from_str(json).unwrap();
        assert_eq!(state.status.mode(), Some(JogMode::World));
        assert_eq!(state.status.selected_axis_label(), "Rx");
        assert_eq!(state.joint_value(5), 0.0);
        assert!(!state.status.has_error());
    }
}
