//! Pose value types.
//!
//! [`Pose`] and [`BonePose`] are plain copyable values with structural
//! equality. They are what hosts persist and what the skeleton hands out in
//! bulk pose queries.

use rigkit_core::math::{self, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and rotation, without scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position (local or world depending on where the pose came from).
    pub position: Vec3,
    /// Rotation quaternion.
    pub rotation: Quat,
}

impl Pose {
    /// Zero position, identity rotation.
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// `TRS(position, rotation, 1)`.
    pub fn matrix(&self) -> Mat4 {
        math::mat4_from_rotation_translation(self.rotation, self.position)
    }

    /// Component-wise comparison within `epsilon`.
    ///
    /// Rotations are compared as rotations, so `q` and `-q` match.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.position - other.position).norm() <= epsilon
            && math::quat_approx_eq(self.rotation, other.rotation, epsilon)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// A [`Pose`] plus a bone length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonePose {
    pub pose: Pose,
    pub length: f32,
}

impl BonePose {
    pub fn new(pose: Pose, length: f32) -> Self {
        Self { pose, length }
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.pose.approx_eq(&other.pose, epsilon) && (self.length - other.length).abs() <= epsilon
    }
}

impl Default for BonePose {
    fn default() -> Self {
        Self::new(Pose::identity(), 0.0)
    }
}

/// Which space a bulk pose snapshot is taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoseSpace {
    /// Relative to each bone's parent.
    #[default]
    Local,
    /// World space; restoring keeps each bone's children in place.
    World,
}
