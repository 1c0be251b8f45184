//! The skeleton: a root transform plus an ordered list of bones.
//!
//! The skeleton owns the [`TransformTree`] holding its root node, every
//! bone node, and any other transforms a host parents into it. It is also
//! the factory for bones: [`Skeleton::spawn_bone`] allocates one and
//! [`Skeleton::destroy_bone`] frees it, after repairing the hierarchy.
//!
//! The bone list order is the host's order (for serialization and UI) and
//! need not put parents before children. Bulk pose arrays are aligned with
//! it.

use std::collections::HashMap;

use log::debug;
use rigkit_core::profile_scope;

use crate::bone::{Bone, BoneColor, BoneId, BoneMut, BoneRef};
use crate::error::BindPoseError;
use crate::events::{SkeletonEvent, SkeletonObserver};
use crate::hierarchy::TransformTree;
use crate::node::NodeId;
use crate::pose::{BonePose, PoseSpace};
use crate::settings::RigSettings;

/// A rigged skeleton.
pub struct Skeleton {
    tree: TransformTree,
    root: NodeId,
    bones: Vec<BoneId>,
    data: HashMap<BoneId, Bone>,
    is_pose_preview: bool,
    settings: RigSettings,
    observer: Option<Box<dyn SkeletonObserver>>,
}

impl Skeleton {
    /// Creates an empty skeleton whose root node is named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let mut tree = TransformTree::new();
        let root = tree.spawn(name);
        Self {
            tree,
            root,
            bones: Vec::new(),
            data: HashMap::new(),
            is_pose_preview: false,
            settings: RigSettings::default(),
            observer: None,
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: RigSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Installs the observer that receives [`SkeletonEvent`]s.
    #[must_use]
    pub fn with_observer(mut self, observer: impl SkeletonObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn settings(&self) -> &RigSettings {
        &self.settings
    }

    pub(crate) fn emit(&mut self, event: SkeletonEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }

    // ---- Transform access ----

    /// The skeleton's own transform node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn name(&self) -> &str {
        self.tree.name(self.root)
    }

    pub fn tree(&self) -> &TransformTree {
        &self.tree
    }

    /// Direct tree access.
    ///
    /// Reparenting bones through the tree bypasses chain-link maintenance;
    /// use [`BoneMut::set_parent`] for bones.
    pub fn tree_mut(&mut self) -> &mut TransformTree {
        &mut self.tree
    }

    // ---- Bone storage ----

    /// Allocates a detached bone node named `name`.
    ///
    /// The bone is not yet part of the bone list; see
    /// [`add_bone`](Self::add_bone). Its default pose is the identity pose
    /// with length one.
    pub fn spawn_bone(&mut self, name: impl Into<String>) -> BoneId {
        let node = self.tree.spawn(name);
        let id = BoneId::from_node(node);
        let color = BoneColor::nice(self.bones.len() as u32, self.settings.bone_color_palette);
        self.data.insert(id, Bone::new(color));
        id
    }

    /// Whether `bone` refers to a live bone node of this skeleton, listed
    /// or not.
    pub fn is_bone(&self, bone: BoneId) -> bool {
        self.tree.is_alive(bone.node()) && self.data.contains_key(&bone)
    }

    /// Read view of a bone.
    ///
    /// # Panics
    ///
    /// Panics if `bone` is not a live bone of this skeleton.
    pub fn bone(&self, bone: BoneId) -> BoneRef<'_> {
        assert!(self.is_bone(bone), "Unknown bone: {bone}");
        BoneRef::new(self, bone)
    }

    /// Mutable view of a bone.
    ///
    /// # Panics
    ///
    /// Panics if `bone` is not a live bone of this skeleton.
    pub fn bone_mut(&mut self, bone: BoneId) -> BoneMut<'_> {
        assert!(self.is_bone(bone), "Unknown bone: {bone}");
        BoneMut::new(self, bone)
    }

    pub(crate) fn bone_data(&self, bone: BoneId) -> &Bone {
        self.data
            .get(&bone)
            .unwrap_or_else(|| panic!("Unknown bone: {bone}"))
    }

    pub(crate) fn bone_data_mut(&mut self, bone: BoneId) -> &mut Bone {
        self.data
            .get_mut(&bone)
            .unwrap_or_else(|| panic!("Unknown bone: {bone}"))
    }

    /// The parent of `node`, if it is a bone.
    pub(crate) fn parent_bone_of(&self, node: NodeId) -> Option<BoneId> {
        if !self.tree.is_alive(node) {
            return None;
        }
        let parent = BoneId::from_node(self.tree.parent(node)?);
        self.data.contains_key(&parent).then_some(parent)
    }

    // ---- Bone list ----

    pub fn bones(&self) -> &[BoneId] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn bone_at(&self, index: usize) -> BoneId {
        self.bones[index]
    }

    pub fn index_of(&self, bone: BoneId) -> Option<usize> {
        self.bones.iter().position(|&b| b == bone)
    }

    pub fn contains(&self, bone: BoneId) -> bool {
        self.bones.contains(&bone)
    }

    /// Appends a spawned bone to the bone list, parenting it to the
    /// skeleton first if it has no parent.
    ///
    /// # Panics
    ///
    /// Panics if `bone` is unknown or already listed.
    pub fn add_bone(&mut self, bone: BoneId, world_position_stays: bool) {
        assert!(self.is_bone(bone), "Unknown bone: {bone}");
        assert!(!self.contains(bone), "{bone} is already in the skeleton");

        if self.tree.parent(bone.node()).is_none() {
            let root = self.root;
            self.bone_mut(bone)
                .set_parent(Some(root), world_position_stays);
        }

        self.bones.push(bone);
    }

    pub fn add_bones(&mut self, bones: &[BoneId], world_position_stays: bool) {
        for &bone in bones {
            self.add_bone(bone, world_position_stays);
        }
    }

    /// Replaces the bone list with `bones` and captures their default pose.
    ///
    /// Existing bones are destroyed first.
    pub fn set_bones(
        &mut self,
        bones: &[BoneId],
        world_position_stays: bool,
    ) -> Result<(), BindPoseError> {
        self.clear();
        self.add_bones(bones, world_position_stays);
        self.set_default_pose()
    }

    /// Reorders the bone list.
    ///
    /// Applied only if `order` is a permutation of the current bones;
    /// returns whether it was.
    pub fn reorder_bones(&mut self, order: &[BoneId]) -> bool {
        if order.len() != self.bones.len() || !self.bones.iter().all(|b| order.contains(b)) {
            return false;
        }
        self.bones = order.to_vec();
        self.emit(SkeletonEvent::TopologyChanged);
        true
    }

    /// Removes `bone` from the list and destroys it.
    ///
    /// The bone's children are reparented to the bone's own parent, keeping
    /// their world pose.
    ///
    /// # Panics
    ///
    /// Panics if `bone` is not listed.
    pub fn destroy_bone(&mut self, bone: BoneId) {
        assert!(self.contains(bone), "{bone} is not in the skeleton");
        debug!("destroying {bone} ({})", self.tree.name(bone.node()));

        self.bones.retain(|&b| b != bone);

        let parent = self.tree.parent(bone.node());
        let children = self.tree.children(bone.node()).to_vec();
        for child in children {
            self.tree.set_parent(child, parent, true);
        }

        self.release_bone(bone);
        self.emit(SkeletonEvent::TopologyChanged);
    }

    pub fn destroy_bones(&mut self, bones: &[BoneId]) {
        for &bone in bones {
            self.destroy_bone(bone);
        }
    }

    /// Destroys every subtree under the skeleton root and empties the bone
    /// list.
    pub fn clear(&mut self) {
        let roots = self.tree.children(self.root).to_vec();
        for root in roots {
            self.destroy_hierarchy(root);
        }
        let stray = std::mem::take(&mut self.bones);
        for bone in stray {
            if self.is_bone(bone) {
                self.release_bone(bone);
            }
        }
        debug!("cleared skeleton {}", self.name());
        self.emit(SkeletonEvent::TopologyChanged);
    }

    fn destroy_hierarchy(&mut self, node: NodeId) {
        let children = self.tree.children(node).to_vec();
        for child in children {
            self.destroy_hierarchy(child);
        }
        let bone = BoneId::from_node(node);
        if self.data.contains_key(&bone) {
            self.release_bone(bone);
        } else {
            self.tree.destroy(node);
        }
    }

    /// Frees the node and bone data of `bone` and notifies the observer.
    fn release_bone(&mut self, bone: BoneId) {
        self.data.remove(&bone);
        self.tree.destroy(bone.node());
        self.emit(SkeletonEvent::BoneDestroyed(bone));
    }

    // ---- Poses ----

    /// Whether a non-default pose is being previewed.
    pub fn is_pose_preview(&self) -> bool {
        self.is_pose_preview
    }

    pub fn set_pose_preview(&mut self) {
        self.is_pose_preview = true;
    }

    /// Captures default and bind poses for every listed bone.
    ///
    /// Every bone is checked before any is changed, so on error no pose is
    /// modified.
    pub fn set_default_pose(&mut self) -> Result<(), BindPoseError> {
        if let Some(&bone) = self.bones.iter().find(|&&b| !self.bone(b).is_unscaled()) {
            return Err(BindPoseError::ScaledHierarchy { bone });
        }
        for i in 0..self.bones.len() {
            let bone = self.bones[i];
            self.bone_mut(bone).set_default_pose()?;
        }
        self.is_pose_preview = false;
        self.emit(SkeletonEvent::BindPoseChanged);
        Ok(())
    }

    /// Puts every listed bone back into its default pose.
    pub fn restore_default_pose(&mut self) {
        profile_scope!("skeleton: restore default pose");
        for i in 0..self.bones.len() {
            let bone = self.bones[i];
            self.bone_mut(bone).restore_default_pose();
        }
        self.is_pose_preview = false;
        self.emit(SkeletonEvent::PreviewPoseChanged);
    }

    /// Local pose of every bone, in list order.
    pub fn local_pose(&self) -> Vec<BonePose> {
        self.bones.iter().map(|&b| self.bone(b).local_pose()).collect()
    }

    /// Applies local poses in list order and marks the skeleton as
    /// previewing.
    ///
    /// # Panics
    ///
    /// Panics if `poses.len()` differs from the bone count.
    pub fn set_local_pose(&mut self, poses: &[BonePose]) {
        assert_eq!(
            self.bones.len(),
            poses.len(),
            "pose count does not match bone count"
        );
        profile_scope!("skeleton: set local pose");
        for (i, pose) in poses.iter().enumerate() {
            let bone = self.bones[i];
            self.bone_mut(bone).set_local_pose(*pose);
        }
        self.is_pose_preview = true;
    }

    /// World pose of every bone, in list order.
    pub fn world_pose(&self) -> Vec<BonePose> {
        self.bones.iter().map(|&b| self.bone(b).world_pose()).collect()
    }

    /// Applies world poses in list order and marks the skeleton as
    /// previewing.
    ///
    /// Each bone's children keep their world pose while that bone moves.
    ///
    /// # Panics
    ///
    /// Panics if `poses.len()` differs from the bone count.
    pub fn set_world_pose(&mut self, poses: &[BonePose]) {
        assert_eq!(
            self.bones.len(),
            poses.len(),
            "pose count does not match bone count"
        );
        profile_scope!("skeleton: set world pose");
        for (i, pose) in poses.iter().enumerate() {
            let bone = self.bones[i];
            let children_pose = self.bone(bone).children_world_pose();
            let mut bone = self.bone_mut(bone);
            bone.set_world_pose(*pose);
            bone.set_children_world_pose(&children_pose);
        }
        self.is_pose_preview = true;
    }

    /// Pose of every bone in `space`, in list order.
    pub fn pose(&self, space: PoseSpace) -> Vec<BonePose> {
        match space {
            PoseSpace::Local => self.local_pose(),
            PoseSpace::World => self.world_pose(),
        }
    }

    /// Applies poses in `space`, in list order.
    pub fn set_pose(&mut self, space: PoseSpace, poses: &[BonePose]) {
        match space {
            PoseSpace::Local => self.set_local_pose(poses),
            PoseSpace::World => self.set_world_pose(poses),
        }
    }
}

impl std::fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skeleton")
            .field("name", &self.name())
            .field("bones", &self.bones)
            .field("is_pose_preview", &self.is_pose_preview)
            .finish_non_exhaustive()
    }
}
