//! Axis catalog
//!
//! Joint axes are used in joint mode, Cartesian axes in world and tool mode.

use super::jog::JogMode;
use crate::error::ValidationError;

/// Static description of one jog axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisInfo {
    /// Canonical wire name, e.g. `joint1` or `rx`.
    pub name: &'static str,
    /// Short display name, e.g. `J1` or `Rx`.
    pub display_name: &'static str,
    /// Additional accepted spellings.
    pub aliases: &'static [&'static str],
    /// 1-based axis number as used by the axis-select endpoint.
    pub number: u8,
}

/// Joint axes J1..J6
#[rustfmt::skip]
pub const JOINT_AXES: [AxisInfo; 6] = [
    AxisInfo { name: "joint1", display_name: "J1", aliases: &["j1"], number: 1 },
    AxisInfo { name: "joint2", display_name: "J2", aliases: &["j2"], number: 2 },
    AxisInfo { name: "joint3", display_name: "J3", aliases: &["j3"], number: 3 },
    AxisInfo { name: "joint4", display_name: "J4", aliases: &["j4"], number: 4 },
    AxisInfo { name: "joint5", display_name: "J5", aliases: &["j5"], number: 5 },
    AxisInfo { name: "joint6", display_name: "J6", aliases: &["j6"], number: 6 },
];

/// Cartesian axes X, Y, Z and rotations Rx, Ry, Rz
#[rustfmt::skip]
pub const CARTESIAN_AXES: [AxisInfo; 6] = [
    AxisInfo { name: "x", display_name: "X", aliases: &[], number: 1 },
    AxisInfo { name: "y", display_name: "Y", aliases: &[], number: 2 },
    AxisInfo { name: "z", display_name: "Z", aliases: &[], number: 3 },
    AxisInfo { name: "rx", display_name: "Rx", aliases: &[], number: 4 },
    AxisInfo { name: "ry", display_name: "Ry", aliases: &[], number: 5 },
    AxisInfo { name: "rz", display_name: "Rz", aliases: &[], number: 6 },
];

impl AxisInfo {
    /// Whether `name` refers to this axis (case-insensitive)
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.display_name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Resolve an axis name or alias within a mode
    pub fn lookup(mode: JogMode, name: &str) -> Result<&'static AxisInfo, ValidationError> {
        let name = name.trim();
        mode.axes()
            .iter()
            .find(|axis| axis.matches(name))
            .ok_or_else(|| ValidationError::UnknownAxis {
                axis: name.to_string(),
                mode: mode.to_string(),
            })
    }

    /// Axis with the given 1-based number in a mode
    pub fn by_number(mode: JogMode, number: u8) -> Option<&'static AxisInfo> {
        mode.axes().iter().find(|axis| axis.number == number)
    }
}

/// Display text for an axis number as reported by the controller
pub fn axis_text(mode: JogMode, number: u8) -> String {
    match AxisInfo::by_number(mode, number) {
        Some(axis) => axis.display_name.to_string(),
        None if mode == JogMode::Joint => format!("J{}", number),
        None => format!("Axis{}", number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        let axis = AxisInfo::lookup(JogMode::Joint, "J3").unwrap();
        assert_eq!(axis.name, "joint3");
        assert_eq!(axis.number, 3);
    }

    #[test]
    fn test_lookup_wrong_mode() {
        let err = AxisInfo::lookup(JogMode::World, "joint1").unwrap_err();
        assert_eq!(err.to_string(), "Unknown axis 'joint1' for world mode");
        assert!(AxisInfo::lookup(JogMode::Tool, "rz").is_ok());
    }

    #[test]
    fn test_axis_text_fallbacks() {
        assert_eq!(axis_text(JogMode::Joint, 2), "J2");
        assert_eq!(axis_text(JogMode::Joint, 9), "J9");
        assert_eq!(axis_text(JogMode::World, 4), "Rx");
        assert_eq!(axis_text(JogMode::Tool, 7), "Axis7");
    }
}
