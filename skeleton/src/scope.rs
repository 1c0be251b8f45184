//! Temporary return to the default pose.

use std::ops::{Deref, DerefMut};

use crate::pose::{BonePose, PoseSpace};
use crate::skeleton::Skeleton;

/// Shows a previewing skeleton in its default pose for the guard's lifetime.
///
/// If the skeleton is previewing a pose when the guard is created, that
/// pose is captured in the chosen space and the default pose is restored.
/// Dropping the guard (including during unwinding) puts the captured pose
/// back and marks the skeleton as previewing again. A skeleton that was not
/// previewing is left untouched on both ends.
///
/// ```
/// use rigkit_skeleton::{DefaultPoseScope, PoseSpace, Skeleton};
///
/// let mut skeleton = Skeleton::new("rig");
/// skeleton.set_pose_preview();
/// {
///     let scope = DefaultPoseScope::new(&mut skeleton, PoseSpace::Local);
///     assert!(!scope.is_pose_preview());
/// }
/// assert!(skeleton.is_pose_preview());
/// ```
pub struct DefaultPoseScope<'a> {
    skeleton: &'a mut Skeleton,
    space: PoseSpace,
    saved: Option<Vec<BonePose>>,
}

impl<'a> DefaultPoseScope<'a> {
    pub fn new(skeleton: &'a mut Skeleton, space: PoseSpace) -> Self {
        let saved = skeleton.is_pose_preview().then(|| {
            let pose = skeleton.pose(space);
            skeleton.restore_default_pose();
            pose
        });
        Self {
            skeleton,
            space,
            saved,
        }
    }

    /// Whether a preview pose was captured and will be restored.
    pub fn restores_pose(&self) -> bool {
        self.saved.is_some()
    }
}

impl Deref for DefaultPoseScope<'_> {
    type Target = Skeleton;

    fn deref(&self) -> &Skeleton {
        &*self.skeleton
    }
}

impl DerefMut for DefaultPoseScope<'_> {
    fn deref_mut(&mut self) -> &mut Skeleton {
        &mut *self.skeleton
    }
}

impl Drop for DefaultPoseScope<'_> {
    fn drop(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        if saved.len() != self.skeleton.bone_count() {
            log::warn!(
                "bone count changed from {} to {} inside a default pose scope, preview pose dropped",
                saved.len(),
                self.skeleton.bone_count()
            );
            return;
        }
        self.skeleton.set_pose(self.space, &saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigkit_core::math::{Vec3, quat_from_rotation_z};

    fn posed_skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new("rig");
        let a = skeleton.create_bone(None, Vec3::zeros(), Vec3::x(), false, "a");
        skeleton.create_bone(Some(a), Vec3::x(), Vec3::x() * 2.0, true, "b");
        skeleton.set_default_pose().unwrap();
        skeleton.rotate_bones(&[a], 0.7);
        skeleton.set_pose_preview();
        skeleton
    }

    #[test]
    fn scope_shows_default_then_restores_preview() {
        for space in [PoseSpace::Local, PoseSpace::World] {
            let mut skeleton = posed_skeleton();
            let a = skeleton.bone_at(0);
            let preview = skeleton.local_pose();
            {
                let scope = DefaultPoseScope::new(&mut skeleton, space);
                assert!(scope.restores_pose());
                assert!(!scope.is_pose_preview());
                assert!(!scope.bone(a).not_in_default_pose());
            }
            assert!(skeleton.is_pose_preview());
            assert!(
                skeleton
                    .local_pose()
                    .iter()
                    .zip(&preview)
                    .all(|(x, y)| x.approx_eq(y, 1e-5))
            );
        }
    }

    #[test]
    fn scope_without_preview_is_inert() {
        let mut skeleton = posed_skeleton();
        skeleton.restore_default_pose();
        let a = skeleton.bone_at(0);
        {
            let mut scope = DefaultPoseScope::new(&mut skeleton, PoseSpace::Local);
            assert!(!scope.restores_pose());
            scope.bone_mut(a).set_local_rotation(quat_from_rotation_z(0.2));
        }
        assert!(!skeleton.is_pose_preview());
        assert!(skeleton.bone(a).not_in_default_pose());
    }

    #[test]
    fn scope_restores_during_unwind() {
        let mut skeleton = posed_skeleton();
        let preview = skeleton.local_pose();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = DefaultPoseScope::new(&mut skeleton, PoseSpace::Local);
            panic!("tool failed");
        }));
        assert!(result.is_err());
        assert!(skeleton.is_pose_preview());
        assert!(
            skeleton
                .local_pose()
                .iter()
                .zip(&preview)
                .all(|(x, y)| x.approx_eq(y, 1e-5))
        );
    }
}
