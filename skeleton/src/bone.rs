//! Bones: transform nodes with a length, rest poses and an optional chain
//! link to one child.
//!
//! Bone data lives in the [`Skeleton`] next to its transform node. Access
//! goes through short-lived views: [`BoneRef`] for reads and [`BoneMut`]
//! for edits.
//!
//! A bone points along its local +X axis. Its tip is
//! `local_to_world * (+X * local_length)`.
//!
//! # Chained child
//!
//! A bone may designate one of its child bones as its *chained child*. The
//! link is stored as a plain handle and re-validated on every read: if the
//! designated bone has since been reparented or destroyed, the bone simply
//! reports no chained child.

use std::fmt;

use rigkit_core::math::{self, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::BindPoseError;
use crate::hierarchy::TransformTree;
use crate::node::NodeId;
use crate::pose::{BonePose, Pose};
use crate::skeleton::Skeleton;

/// Handle of a node that carries bone data.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(NodeId);

impl BoneId {
    pub(crate) fn from_node(node: NodeId) -> Self {
        Self(node)
    }

    /// The transform node backing this bone.
    pub fn node(&self) -> NodeId {
        self.0
    }
}

impl From<BoneId> for NodeId {
    fn from(bone: BoneId) -> Self {
        bone.0
    }
}

impl fmt::Debug for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bone({}v{})", self.0.index(), self.0.generation())
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bone({}v{})", self.0.index(), self.0.generation())
    }
}

/// Linear RGB display colour of a bone's bind pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BoneColor {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Fully saturated, full value colour for `hue` in `[0, 1)`.
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let (q, t) = (1.0 - f, f);
        match sector as u32 {
            0 => Self::new(1.0, t, 0.0),
            1 => Self::new(q, 1.0, 0.0),
            2 => Self::new(0.0, 1.0, t),
            3 => Self::new(0.0, q, 1.0),
            4 => Self::new(t, 0.0, 1.0),
            _ => Self::new(1.0, 0.0, q),
        }
    }

    /// Colour for the `index`-th bone when cycling through `palette` hues.
    ///
    /// Each full cycle is shifted by half a hue step so consecutive cycles
    /// do not repeat exactly.
    pub fn nice(index: u32, palette: u32) -> Self {
        let palette = palette.max(1);
        let loops = index / palette;
        let index = index % 360;
        let step = 360 / palette;
        let loop_offset = step as f32 * 0.5;
        let hue = (index * step) as f32 + loops as f32 * loop_offset;
        Self::from_hue(hue.rem_euclid(360.0) / 360.0)
    }
}

impl Default for BoneColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Per-bone state stored by the skeleton.
#[derive(Debug, Clone)]
pub(crate) struct Bone {
    pub local_length: f32,
    pub bind_pose: Pose,
    pub default_pose: BonePose,
    pub chained_child: Option<BoneId>,
    pub depth: f32,
    pub is_visible: bool,
    pub bind_pose_color: BoneColor,
}

impl Bone {
    pub fn new(color: BoneColor) -> Self {
        Self {
            local_length: 1.0,
            bind_pose: Pose::identity(),
            default_pose: BonePose::new(Pose::identity(), 1.0),
            chained_child: None,
            depth: 0.0,
            is_visible: true,
            bind_pose_color: color,
        }
    }
}

/// Read-only view of one bone.
#[derive(Clone, Copy)]
pub struct BoneRef<'a> {
    skeleton: &'a Skeleton,
    id: BoneId,
}

impl<'a> BoneRef<'a> {
    pub(crate) fn new(skeleton: &'a Skeleton, id: BoneId) -> Self {
        Self { skeleton, id }
    }

    fn tree(&self) -> &'a TransformTree {
        self.skeleton.tree()
    }

    fn data(&self) -> &'a Bone {
        self.skeleton.bone_data(self.id)
    }

    pub fn id(&self) -> BoneId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.id.node()
    }

    pub fn name(&self) -> &'a str {
        self.tree().name(self.node())
    }

    // ---- Transform ----

    pub fn local_position(&self) -> Vec3 {
        self.tree().local_position(self.node())
    }

    pub fn local_rotation(&self) -> Quat {
        self.tree().local_rotation(self.node())
    }

    pub fn local_scale(&self) -> Vec3 {
        self.tree().local_scale(self.node())
    }

    pub fn position(&self) -> Vec3 {
        self.tree().position(self.node())
    }

    pub fn rotation(&self) -> Quat {
        self.tree().rotation(self.node())
    }

    /// Direction the bone points in, world space.
    pub fn right(&self) -> Vec3 {
        self.tree().right(self.node())
    }

    pub fn local_to_world(&self) -> Mat4 {
        self.tree().local_to_world(self.node())
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.tree().parent(self.node())
    }

    /// The parent node, if it is a bone.
    pub fn parent_bone(&self) -> Option<BoneId> {
        self.skeleton.parent_bone_of(self.node())
    }

    pub fn children(&self) -> &'a [NodeId] {
        self.tree().children(self.node())
    }

    /// Topmost ancestor node. For a bone added to a skeleton this is the
    /// skeleton's root.
    pub fn skeleton_root(&self) -> NodeId {
        self.tree()
            .self_and_ancestors(self.node())
            .last()
            .unwrap_or(self.node())
    }

    // ---- Length and tip ----

    /// Length in the bone's own frame, never negative.
    pub fn local_length(&self) -> f32 {
        self.data().local_length
    }

    /// Length after the world matrix is applied.
    pub fn length(&self) -> f32 {
        math::transform_vector3(&self.local_to_world(), self.local_end_position()).norm()
    }

    /// Tip in the bone's own frame.
    pub fn local_end_position(&self) -> Vec3 {
        Vec3::x() * self.local_length()
    }

    /// Tip in world space.
    pub fn end_position(&self) -> Vec3 {
        math::transform_point3(&self.local_to_world(), self.local_end_position())
    }

    // ---- Poses ----

    pub fn local_pose(&self) -> BonePose {
        BonePose::new(
            Pose::new(self.local_position(), self.local_rotation()),
            self.local_length(),
        )
    }

    pub fn world_pose(&self) -> BonePose {
        BonePose::new(Pose::new(self.position(), self.rotation()), self.length())
    }

    /// World pose captured by the last successful
    /// [`set_default_pose`](BoneMut::set_default_pose).
    pub fn bind_pose(&self) -> Pose {
        self.data().bind_pose
    }

    /// Local rest pose and length.
    pub fn default_pose(&self) -> BonePose {
        self.data().default_pose
    }

    /// Whether the local pose or length differs from the default pose.
    ///
    /// Compares exactly unless the skeleton's settings carry a
    /// `default_pose_tolerance`.
    pub fn not_in_default_pose(&self) -> bool {
        let current = self.local_pose();
        let default = self.default_pose();
        match self.skeleton.settings().default_pose_tolerance {
            Some(epsilon) => !current.approx_eq(&default, epsilon),
            None => current != default,
        }
    }

    /// World position and rotation of every direct child, in sibling order.
    pub fn children_world_pose(&self) -> Vec<Pose> {
        let tree = self.tree();
        self.children()
            .iter()
            .map(|&c| Pose::new(tree.position(c), tree.rotation(c)))
            .collect()
    }

    /// Whether this bone and every ancestor have unit local scale.
    pub fn is_unscaled(&self) -> bool {
        let tree = self.tree();
        tree.self_and_ancestors(self.node())
            .all(|n| math::is_unit_scale(tree.local_scale(n)))
    }

    // ---- Chain and attributes ----

    /// The designated chained child, if it is still a child of this bone.
    pub fn chained_child(&self) -> Option<BoneId> {
        let child = self.data().chained_child?;
        (self.skeleton.parent_bone_of(child.node()) == Some(self.id)).then_some(child)
    }

    pub fn depth(&self) -> f32 {
        self.data().depth
    }

    pub fn is_visible(&self) -> bool {
        self.data().is_visible
    }

    pub fn bind_pose_color(&self) -> BoneColor {
        self.data().bind_pose_color
    }
}

impl fmt::Debug for BoneRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoneRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Mutable view of one bone.
///
/// Every setter propagates world matrices before returning.
pub struct BoneMut<'a> {
    skeleton: &'a mut Skeleton,
    id: BoneId,
}

impl<'a> BoneMut<'a> {
    pub(crate) fn new(skeleton: &'a mut Skeleton, id: BoneId) -> Self {
        Self { skeleton, id }
    }

    /// Read access to the same bone.
    pub fn get(&self) -> BoneRef<'_> {
        BoneRef::new(self.skeleton, self.id)
    }

    pub fn id(&self) -> BoneId {
        self.id
    }

    fn node(&self) -> NodeId {
        self.id.node()
    }

    fn tree(&mut self) -> &mut TransformTree {
        self.skeleton.tree_mut()
    }

    fn data(&mut self) -> &mut Bone {
        self.skeleton.bone_data_mut(self.id)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let node = self.node();
        self.tree().set_name(node, name);
    }

    // ---- Transform ----

    pub fn set_local_position(&mut self, position: Vec3) {
        let node = self.node();
        self.tree().set_local_position(node, position);
    }

    pub fn set_local_rotation(&mut self, rotation: Quat) {
        let node = self.node();
        self.tree().set_local_rotation(node, rotation);
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        let node = self.node();
        self.tree().set_local_scale(node, scale);
    }

    pub fn set_position(&mut self, position: Vec3) {
        let node = self.node();
        self.tree().set_position(node, position);
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        let node = self.node();
        self.tree().set_rotation(node, rotation);
    }

    /// Aims the bone along `direction` (world space).
    pub fn set_right(&mut self, direction: Vec3) {
        let node = self.node();
        self.tree().set_right(node, direction);
    }

    // ---- Length and tip ----

    /// Sets the local length, clamped to zero.
    pub fn set_local_length(&mut self, length: f32) {
        self.data().local_length = length.max(0.0);
    }

    /// Sets the world-space length, solving it back through the world
    /// matrix. Negative lengths clamp to zero.
    pub fn set_length(&mut self, length: f32) {
        let bone = self.get();
        let world = bone.right() * length.max(0.0);
        let local = math::transform_vector3(&bone.tree().world_to_local(bone.node()), world);
        self.data().local_length = local.norm();
    }

    /// Moves the tip to `end`, re-aiming the bone and solving its length.
    ///
    /// Ignored while the bone has a chained child, whose position owns the
    /// tip.
    pub fn set_end_position(&mut self, end: Vec3) {
        if self.get().chained_child().is_some() {
            log::trace!("{}: end position ignored, tip follows chained child", self.id);
            return;
        }
        let direction = end - self.get().position();
        self.set_right(direction);
        self.set_length(direction.norm());
    }

    // ---- Poses ----

    pub fn set_local_pose(&mut self, pose: BonePose) {
        let node = self.node();
        let tree = self.tree();
        tree.set_local_position(node, pose.pose.position);
        tree.set_local_rotation(node, pose.pose.rotation);
        self.set_local_length(pose.length);
    }

    pub fn set_world_pose(&mut self, pose: BonePose) {
        let node = self.node();
        let tree = self.tree();
        tree.set_position(node, pose.pose.position);
        tree.set_rotation(node, pose.pose.rotation);
        self.set_length(pose.length);
    }

    pub fn set_bind_pose(&mut self, pose: Pose) {
        self.data().bind_pose = pose;
    }

    /// Captures the current local pose as the default pose and the current
    /// world pose as the bind pose.
    ///
    /// Fails without changing either if this bone or any ancestor has a
    /// non-unit local scale.
    pub fn set_default_pose(&mut self) -> Result<(), BindPoseError> {
        let bone = self.get();
        if !bone.is_unscaled() {
            return Err(BindPoseError::ScaledHierarchy { bone: self.id });
        }
        let local = bone.local_pose();
        let bind = bone.world_pose().pose;
        let data = self.data();
        data.default_pose = local;
        data.bind_pose = bind;
        Ok(())
    }

    /// Puts the local pose back to the default pose. The bind pose is left
    /// alone.
    pub fn restore_default_pose(&mut self) {
        let pose = self.get().default_pose();
        self.set_local_pose(pose);
    }

    /// Restores world position and rotation of the direct children, matched
    /// by sibling index.
    ///
    /// # Panics
    ///
    /// Panics if `poses` does not have one entry per child.
    pub fn set_children_world_pose(&mut self, poses: &[Pose]) {
        let children = self.get().children().to_vec();
        assert_eq!(
            children.len(),
            poses.len(),
            "{}: {} child poses given for {} children",
            self.id,
            poses.len(),
            children.len()
        );
        let tree = self.tree();
        for (child, pose) in children.into_iter().zip(poses) {
            tree.set_position(child, pose.position);
            tree.set_rotation(child, pose.rotation);
        }
    }

    // ---- Chain ----

    /// Designates `child` as the chained child, or clears the link.
    ///
    /// A bone that is not a direct child of this bone is silently ignored.
    /// A valid new link immediately re-aims this bone at the child.
    pub fn set_chained_child(&mut self, child: Option<BoneId>) {
        if self.skeleton.bone_data(self.id).chained_child == child {
            return;
        }
        if let Some(candidate) = child
            && self.skeleton.parent_bone_of(candidate.node()) != Some(self.id)
        {
            log::trace!("{}: {candidate} is not a child, chain link ignored", self.id);
            return;
        }
        self.data().chained_child = child;
        if child.is_some() {
            self.orient_to_chained_child(false);
        }
    }

    /// Re-aims this bone at its chained child and stretches it to reach.
    ///
    /// With `freeze_children` every direct child keeps its world pose.
    /// Otherwise only the chained child is held in place and other children
    /// turn with the bone.
    ///
    /// # Panics
    ///
    /// Panics if the bone has no chained child.
    pub fn orient_to_chained_child(&mut self, freeze_children: bool) {
        let bone = self.get();
        let child = bone
            .chained_child()
            .unwrap_or_else(|| panic!("{}: no chained child to orient to", self.id));
        let tree = bone.tree();
        let child_position = tree.position(child.node());
        let child_rotation = tree.rotation(child.node());
        let position = bone.position();
        let children_pose = freeze_children.then(|| bone.children_world_pose());

        self.set_right(child_position - position);

        match children_pose {
            Some(poses) => self.set_children_world_pose(&poses),
            None => {
                let tree = self.tree();
                tree.set_position(child.node(), child_position);
                tree.set_rotation(child.node(), child_rotation);
            }
        }

        self.set_length((child_position - position).norm());
    }

    /// Reparents the bone.
    ///
    /// Any chain link from the old parent bone to this bone is dropped
    /// first. Afterwards, if the new parent is a bone without a chained
    /// child and this bone sits on its tip, this bone becomes the new
    /// parent's chained child. Reparenting to the current parent does
    /// nothing.
    pub fn set_parent(&mut self, parent: Option<NodeId>, world_position_stays: bool) {
        if self.get().parent() == parent {
            log::trace!("{}: already under {parent:?}", self.id);
            return;
        }

        if let Some(old_parent) = self.get().parent_bone()
            && self.skeleton.bone(old_parent).chained_child() == Some(self.id)
        {
            self.skeleton.bone_mut(old_parent).set_chained_child(None);
        }

        let node = self.node();
        self.tree().set_parent(node, parent, world_position_stays);

        let settings = self.skeleton.settings();
        if !settings.auto_chain_on_reparent {
            return;
        }
        let epsilon_sq = settings.chain_snap_epsilon_sq;
        if let Some(new_parent) = self.get().parent_bone() {
            let parent = self.skeleton.bone(new_parent);
            let gap = parent.end_position() - self.get().position();
            if parent.chained_child().is_none() && gap.norm_squared() < epsilon_sq {
                self.skeleton
                    .bone_mut(new_parent)
                    .set_chained_child(Some(self.id));
            }
        }
    }

    // ---- Attributes ----

    pub fn set_depth(&mut self, depth: f32) {
        self.data().depth = depth;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.data().is_visible = visible;
    }

    pub fn set_bind_pose_color(&mut self, color: BoneColor) {
        self.data().bind_pose_color = color;
    }
}
