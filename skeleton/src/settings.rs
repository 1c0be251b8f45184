//! Per-skeleton tunables for chaining and default-pose checks.

use serde::{Deserialize, Serialize};

/// Tunables for bone behaviour, injected into a [`Skeleton`](crate::Skeleton).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigSettings {
    /// When a bone is reparented onto a bone without a chained child and
    /// lands within this squared distance of the new parent's tip, it is
    /// adopted as that parent's chained child.
    pub chain_snap_epsilon_sq: f32,
    /// Enables the adoption rule above.
    pub auto_chain_on_reparent: bool,
    /// `None` compares the default pose exactly. `Some(eps)` compares
    /// position, rotation and length within `eps`.
    pub default_pose_tolerance: Option<f32>,
    /// Number of hues cycled through when colouring new bones.
    pub bone_color_palette: u32,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            chain_snap_epsilon_sq: 0.001,
            auto_chain_on_reparent: true,
            default_pose_tolerance: None,
            bone_color_palette: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: RigSettings = ron::from_str("(auto_chain_on_reparent: false)").unwrap();
        assert!(!settings.auto_chain_on_reparent);
        assert_eq!(settings.chain_snap_epsilon_sq, 0.001);
        assert_eq!(settings.default_pose_tolerance, None);
        assert_eq!(settings.bone_color_palette, 6);
    }
}
