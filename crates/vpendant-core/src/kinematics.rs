//! SCARA forward kinematics
//!
//! Computes where the elbow and tool of a two-link SCARA arm sit for a set
//! of joint values, for consumers that draw or sanity-check the arm.
//! Angles are in degrees, lengths in the same unit as the link lengths.

use serde::{Deserialize, Serialize};

/// Slack allowed when checking a pose against the arm's reach
const REACH_TOLERANCE: f64 = 1e-9;

/// Link lengths of a two-link SCARA arm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaraGeometry {
    pub link1_length: f64,
    pub link2_length: f64,
}

impl Default for ScaraGeometry {
    fn default() -> Self {
        Self {
            link1_length: 100.0,
            link2_length: 100.0,
        }
    }
}

/// Joint values J1..J4
///
/// J1 and J2 are rotary (degrees), J3 is the linear Z axis, J4 the tool
/// rotation (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPosition {
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
}

impl JointPosition {
    pub fn new(j1: f64, j2: f64, j3: f64, j4: f64) -> Self {
        Self { j1, j2, j3, j4 }
    }

    /// Build from the robot's joint array; missing values read as zero
    pub fn from_slice(values: &[f64]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2), at(3))
    }
}

/// A point in the arm's XY plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn distance_from_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Result of forward kinematics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaraPose {
    /// End of link 1.
    pub elbow: PlanarPoint,
    /// End of link 2.
    pub tool: PlanarPoint,
    /// Height from J3.
    pub z: f64,
    /// Tool rotation from J4, degrees.
    pub tool_rotation: f64,
}

impl ScaraPose {
    /// Whether the tool lies inside the arm's reachable annulus
    pub fn within_reach(&self, geometry: &ScaraGeometry) -> bool {
        let distance = self.tool.distance_from_origin();
        let inner = (geometry.link1_length - geometry.link2_length).abs();
        distance <= geometry.reach() + REACH_TOLERANCE && distance + REACH_TOLERANCE >= inner
    }
}

impl ScaraGeometry {
    pub fn new(link1_length: f64, link2_length: f64) -> Self {
        Self {
            link1_length,
            link2_length,
        }
    }

    /// Maximum distance from the base to the tool
    pub fn reach(&self) -> f64 {
        self.link1_length + self.link2_length
    }

    /// Elbow and tool position for `joints`
    pub fn forward(&self, joints: &JointPosition) -> ScaraPose {
        let theta1 = joints.j1.to_radians();
        let theta12 = theta1 + joints.j2.to_radians();

        let elbow = PlanarPoint {
            x: self.link1_length * theta1.cos(),
            y: self.link1_length * theta1.sin(),
        };
        let tool = PlanarPoint {
            x: elbow.x + self.link2_length * theta12.cos(),
            y: elbow.y + self.link2_length * theta12.sin(),
        };

        ScaraPose {
            elbow,
            tool,
            z: joints.j3,
            tool_rotation: joints.j4,
        }
    }
}
