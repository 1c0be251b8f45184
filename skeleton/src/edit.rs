//! Batch edit helpers used by interactive rigging tools.
//!
//! Each helper works on a caller-chosen subset of bones and keeps chain
//! links consistent while it moves them. All of them panic if a bone is not
//! in the skeleton.

use log::debug;
use rigkit_core::math::{self, Vec3};
use rigkit_core::profile_scope;

use crate::bone::BoneId;
use crate::events::SkeletonEvent;
use crate::skeleton::Skeleton;

impl Skeleton {
    fn assert_listed(&self, bone: BoneId) {
        assert!(self.contains(bone), "{bone} is not in the skeleton");
    }

    /// Rotates each bone about its local Z axis by `delta` radians.
    pub fn rotate_bones(&mut self, bones: &[BoneId], delta: f32) {
        profile_scope!("skeleton: rotate bones");
        let turn = math::quat_from_rotation_z(delta);
        for &bone in bones {
            self.assert_listed(bone);
            let rotation = self.bone(bone).local_rotation() * turn;
            self.bone_mut(bone).set_local_rotation(rotation);
        }
    }

    /// Translates each bone by `delta` in world space.
    ///
    /// Children move along. A parent bone chained to a moved bone is
    /// re-aimed at it.
    pub fn move_bones(&mut self, bones: &[BoneId], delta: Vec3) {
        profile_scope!("skeleton: move bones");
        for &bone in bones {
            self.assert_listed(bone);
            let position = self.bone(bone).position() + delta;
            self.bone_mut(bone).set_position(position);

            if let Some(parent) = self.chaining_parent(bone) {
                self.bone_mut(parent).orient_to_chained_child(false);
            }
        }
    }

    /// Translates each bone by `delta` without dragging anything else.
    ///
    /// Children keep their world pose. Chain links to bones outside `bones`
    /// are broken first so unselected neighbours stay put.
    pub fn free_move_bones(&mut self, bones: &[BoneId], delta: Vec3) {
        profile_scope!("skeleton: free move bones");
        for &bone in bones {
            self.assert_listed(bone);
            let children_pose = self.bone(bone).children_world_pose();

            if let Some(child) = self.bone(bone).chained_child()
                && !bones.contains(&child)
            {
                self.bone_mut(bone).set_chained_child(None);
            }

            if let Some(parent) = self.chaining_parent(bone)
                && !bones.contains(&parent)
            {
                self.bone_mut(parent).set_chained_child(None);
            }

            let position = self.bone(bone).position() + delta;
            let mut bone = self.bone_mut(bone);
            bone.set_position(position);
            bone.set_children_world_pose(&children_pose);
        }
    }

    /// Moves each bone's joint by `delta`, keeping the rest of the chain
    /// connected.
    ///
    /// The bone's tip stays where it was (when it has length), a chained
    /// parent is re-aimed at the new joint, children keep their world pose
    /// and a chained child pulls the bone back into line.
    pub fn move_joints(&mut self, bones: &[BoneId], delta: Vec3) {
        profile_scope!("skeleton: move joints");
        for &bone in bones {
            self.assert_listed(bone);
            let view = self.bone(bone);
            let children_pose = view.children_world_pose();
            let end_position = view.end_position();
            let position = view.position() + delta;

            self.bone_mut(bone).set_position(position);

            if self.bone(bone).local_length() > 0.0 {
                self.bone_mut(bone).set_end_position(end_position);
            }

            if let Some(parent) = self.chaining_parent(bone) {
                self.bone_mut(parent).orient_to_chained_child(true);
            }

            self.bone_mut(bone).set_children_world_pose(&children_pose);

            if self.bone(bone).chained_child().is_some() {
                self.bone_mut(bone).orient_to_chained_child(true);
            }
        }
    }

    /// Moves the tip of `bone` to `end`, leaving its children where they are.
    ///
    /// Like [`BoneMut::set_end_position`](crate::BoneMut::set_end_position),
    /// this does nothing while the bone has a chained child.
    pub fn set_end_position(&mut self, bone: BoneId, end: Vec3) {
        self.assert_listed(bone);
        let children_pose = self.bone(bone).children_world_pose();
        let mut bone = self.bone_mut(bone);
        bone.set_end_position(end);
        bone.set_children_world_pose(&children_pose);
    }

    /// Creates a bone from `position` to `end` and adds it to the skeleton.
    ///
    /// With `is_chained` the new bone becomes `parent`'s chained child,
    /// which re-aims `parent` at it.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in the skeleton.
    pub fn create_bone(
        &mut self,
        parent: Option<BoneId>,
        position: Vec3,
        end: Vec3,
        is_chained: bool,
        name: impl Into<String>,
    ) -> BoneId {
        let bone = self.insert_bone(parent, position, end, is_chained, name.into());
        self.emit(SkeletonEvent::TopologyChanged);
        bone
    }

    fn insert_bone(
        &mut self,
        parent: Option<BoneId>,
        position: Vec3,
        end: Vec3,
        is_chained: bool,
        name: String,
    ) -> BoneId {
        if let Some(parent) = parent {
            self.assert_listed(parent);
        }

        let bone = self.spawn_bone(name);
        let mut view = self.bone_mut(bone);
        view.set_parent(parent.map(|p| p.node()), true);
        view.set_position(position);
        view.set_end_position(end);

        if is_chained && let Some(parent) = parent {
            self.bone_mut(parent).set_chained_child(Some(bone));
        }

        self.add_bone(bone, true);
        debug!(
            "created {bone} ({}) under {parent:?}",
            self.bone(bone).name()
        );
        bone
    }

    /// Splits `bone` at `split_length` along its axis.
    ///
    /// `bone` is shortened and a new bone, chained to it, covers the rest up
    /// to the old tip. A chained child of `bone` moves over to the new bone.
    /// Returns the new bone.
    ///
    /// # Panics
    ///
    /// Panics if `bone` is not in the skeleton or `split_length` is not
    /// shorter than its world length.
    pub fn split_bone(
        &mut self,
        bone: BoneId,
        split_length: f32,
        name: impl Into<String>,
    ) -> BoneId {
        profile_scope!("skeleton: split bone");
        self.assert_listed(bone);
        let view = self.bone(bone);
        assert!(
            view.length() > split_length,
            "{bone}: split length {split_length} is not shorter than bone length {}",
            view.length()
        );

        let end_position = view.end_position();
        let chained_child = view.chained_child();
        let split_position = view.position() + view.right() * split_length;

        self.bone_mut(bone).set_length(split_length);

        let tail = self.insert_bone(
            Some(bone),
            split_position,
            end_position,
            true,
            name.into(),
        );

        if let Some(child) = chained_child {
            self.bone_mut(child).set_parent(Some(tail.node()), true);
            self.bone_mut(tail).set_chained_child(Some(child));
        }

        debug!("split {bone} at {split_length} into {tail}");
        self.emit(SkeletonEvent::TopologyChanged);
        tail
    }

    /// The parent bone of `bone`, if it holds `bone` as its chained child.
    fn chaining_parent(&self, bone: BoneId) -> Option<BoneId> {
        let parent = self.bone(bone).parent_bone()?;
        (self.bone(parent).chained_child() == Some(bone)).then_some(parent)
    }
}
