//! Transform hierarchy with eagerly propagated world matrices.
//!
//! [`TransformTree`] is an arena of [`TransformNode`]s addressed by
//! [`NodeId`]. Parent and children are stored as ids on both sides, and
//! every operation keeps the two in agreement: a node is listed in its
//! parent's children iff its `parent` is that node.
//!
//! Any local mutation recomputes `local_to_world` for the node and its whole
//! subtree before returning, so `local_to_world == parent * TRS(local)` holds
//! between calls. Callers that change several local values at once should
//! use [`TransformTree::set_local_trs`] to pay for one propagation.
//!
//! # Usage
//!
//! ```
//! use rigkit_skeleton::TransformTree;
//! use rigkit_core::math::Vec3;
//!
//! let mut tree = TransformTree::new();
//! let parent = tree.spawn("parent");
//! let child = tree.spawn("child");
//! tree.set_local_position(parent, Vec3::new(10.0, 0.0, 0.0));
//! tree.set_parent(child, Some(parent), false);
//! assert_eq!(tree.position(child), Vec3::new(10.0, 0.0, 0.0));
//! ```

use rigkit_core::math::{self, Mat4, Quat, Vec3};
use rigkit_core::profile_function;

use crate::node::{NodeAllocator, NodeId};

/// A node's local transform, cached world matrix and links.
#[derive(Debug, Clone)]
pub struct TransformNode {
    name: String,
    local_position: Vec3,
    local_rotation: Quat,
    local_scale: Vec3,
    local_to_world: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TransformNode {
    fn new(name: String) -> Self {
        Self {
            name,
            local_position: Vec3::zeros(),
            local_rotation: Quat::identity(),
            local_scale: Vec3::new(1.0, 1.0, 1.0),
            local_to_world: Mat4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    /// Always normalized.
    pub fn local_rotation(&self) -> Quat {
        self.local_rotation
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    /// Cached world matrix.
    pub fn local_to_world(&self) -> Mat4 {
        self.local_to_world
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion (sibling) order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `TRS(local_position, local_rotation, local_scale)`.
    pub fn local_matrix(&self) -> Mat4 {
        math::mat4_from_scale_rotation_translation(
            self.local_scale,
            self.local_rotation,
            self.local_position,
        )
    }
}

/// Arena of transform nodes.
#[derive(Debug, Default)]
pub struct TransformTree {
    allocator: NodeAllocator,
    nodes: Vec<Option<TransformNode>>,
}

impl TransformTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Node lifetime ----

    /// Spawns a detached node with identity transform.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.allocator.allocate();
        let idx = id.index() as usize;
        let node = TransformNode::new(name.into());
        if idx == self.nodes.len() {
            self.nodes.push(Some(node));
        } else {
            self.nodes[idx] = Some(node);
        }
        id
    }

    /// Destroys a node.
    ///
    /// The node is removed from its parent's children. Its own children are
    /// not destroyed: they become roots and their world matrices are
    /// recomputed from their unchanged local values. Callers that want to
    /// keep them elsewhere must reparent them first.
    ///
    /// Returns false if `id` is not alive.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
            self.update(child);
        }
        self.nodes[id.index() as usize] = None;
        self.allocator.deallocate(id)
    }

    /// Whether `id` refers to a live node of this tree.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    /// Whether the tree has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the node, or `None` if `id` is stale.
    pub fn get(&self, id: NodeId) -> Option<&TransformNode> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes[id.index() as usize].as_ref()
    }

    /// Returns the node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn node(&self, id: NodeId) -> &TransformNode {
        self.get(id)
            .unwrap_or_else(|| panic!("Stale or foreign node handle: {id}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TransformNode {
        assert!(self.is_alive(id), "Stale or foreign node handle: {id}");
        self.nodes[id.index() as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("Stale or foreign node handle: {id}"))
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.node_mut(id).name = name.into();
    }

    // ---- Links ----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    /// Iterates `id`, then its parent, and so on up to the root.
    pub fn self_and_ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Whether `ancestor` is `node` or lies above it.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.self_and_ancestors(node).any(|n| n == ancestor)
    }

    /// Position of `id` among its parent's children, `None` for roots.
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        self.node(parent).children.iter().position(|&c| c == id)
    }

    /// Moves `id` to `index` among its siblings. No-op for roots.
    ///
    /// `index` is the final position after the move, clamped to the last
    /// slot. World matrices are unaffected.
    pub fn set_sibling_index(&mut self, id: NodeId, index: usize) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let siblings = &mut self.node_mut(parent).children;
        if let Some(current) = siblings.iter().position(|&c| c == id) {
            siblings.remove(current);
            let index = index.min(siblings.len());
            siblings.insert(index, id);
        }
    }

    /// Reparents `id` under `new_parent` (`None` detaches it).
    ///
    /// Reparenting to the current parent does nothing. The node is appended
    /// to the end of the new parent's children. With `world_position_stays`
    /// the local position and rotation are re-solved so the world position
    /// and rotation are unchanged; otherwise the local values are kept and
    /// the world pose follows the new parent.
    ///
    /// # Panics
    ///
    /// Panics if `new_parent` is `id` or one of its descendants.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>, world_position_stays: bool) {
        if self.node(id).parent == new_parent {
            return;
        }
        if let Some(parent) = new_parent {
            assert_ne!(id, parent, "Cannot set node as its own parent: {id}");
            assert!(
                !self.is_ancestor(id, parent),
                "Cannot parent {id} under its own descendant {parent}"
            );
        }

        let old_position = self.position(id);
        let old_rotation = self.rotation(id);

        if let Some(old_parent) = self.node(id).parent {
            self.node_mut(old_parent).children.retain(|&c| c != id);
        }

        self.node_mut(id).parent = new_parent;

        if let Some(parent) = new_parent {
            self.node_mut(parent).children.push(id);
        }

        if world_position_stays {
            self.set_position(id, old_position);
            self.set_rotation(id, old_rotation);
        } else {
            self.update(id);
        }
    }

    // ---- Local transform ----

    pub fn local_position(&self, id: NodeId) -> Vec3 {
        self.node(id).local_position
    }

    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) {
        self.node_mut(id).local_position = position;
        self.update(id);
    }

    pub fn local_rotation(&self, id: NodeId) -> Quat {
        self.node(id).local_rotation
    }

    /// Sets the local rotation, normalizing it first.
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.node_mut(id).local_rotation = math::normalize_quat(rotation);
        self.update(id);
    }

    pub fn local_scale(&self, id: NodeId) -> Vec3 {
        self.node(id).local_scale
    }

    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec3) {
        self.node_mut(id).local_scale = scale;
        self.update(id);
    }

    /// Sets all three local components with a single propagation.
    pub fn set_local_trs(&mut self, id: NodeId, position: Vec3, rotation: Quat, scale: Vec3) {
        let node = self.node_mut(id);
        node.local_position = position;
        node.local_rotation = math::normalize_quat(rotation);
        node.local_scale = scale;
        self.update(id);
    }

    // ---- World transform ----

    pub fn local_to_world(&self, id: NodeId) -> Mat4 {
        self.node(id).local_to_world
    }

    /// Inverse of [`local_to_world`](Self::local_to_world).
    pub fn world_to_local(&self, id: NodeId) -> Mat4 {
        math::inverse_or_identity(&self.node(id).local_to_world)
    }

    /// World position: the parent matrix applied to the local position.
    pub fn position(&self, id: NodeId) -> Vec3 {
        let node = self.node(id);
        math::transform_point3(&self.parent_matrix(id), node.local_position)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        let inverse = math::inverse_or_identity(&self.parent_matrix(id));
        self.set_local_position(id, math::transform_point3(&inverse, position));
    }

    /// World rotation, accumulated top-down through every ancestor with
    /// scale-sign correction at each level.
    pub fn rotation(&self, id: NodeId) -> Quat {
        let node = self.node(id);
        let mut rotation = node.local_rotation;
        let mut current = node.parent;
        while let Some(parent) = current {
            let parent = self.node(parent);
            rotation = math::scale_mul_quat(parent.local_scale, rotation);
            rotation = parent.local_rotation * rotation;
            current = parent.parent;
        }
        rotation
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        let local = match self.node(id).parent {
            Some(parent) => self.inverse_transform_rotation(parent, rotation),
            None => rotation,
        };
        self.set_local_rotation(id, local);
    }

    /// World +X axis, normalized.
    pub fn right(&self, id: NodeId) -> Vec3 {
        self.world_axis(id, Vec3::x())
    }

    /// Rotates `id` so its local +X points along `direction`.
    pub fn set_right(&mut self, id: NodeId, direction: Vec3) {
        self.match_direction(id, Vec3::x(), direction);
    }

    /// World +Y axis, normalized.
    pub fn up(&self, id: NodeId) -> Vec3 {
        self.world_axis(id, Vec3::y())
    }

    pub fn set_up(&mut self, id: NodeId, direction: Vec3) {
        self.match_direction(id, Vec3::y(), direction);
    }

    /// World +Z axis, normalized.
    pub fn forward(&self, id: NodeId) -> Vec3 {
        self.world_axis(id, Vec3::z())
    }

    pub fn set_forward(&mut self, id: NodeId, direction: Vec3) {
        self.match_direction(id, Vec3::z(), direction);
    }

    // ---- Internals ----

    fn parent_matrix(&self, id: NodeId) -> Mat4 {
        match self.node(id).parent {
            Some(parent) => self.node(parent).local_to_world,
            None => Mat4::identity(),
        }
    }

    fn world_axis(&self, id: NodeId, axis: Vec3) -> Vec3 {
        math::normalize_or_zero(math::transform_vector3(&self.node(id).local_to_world, axis))
    }

    /// Solves `rotation` (world) into the local frame below `id`.
    fn inverse_transform_rotation(&self, id: NodeId, rotation: Quat) -> Quat {
        let node = self.node(id);
        let mut rotation = rotation;
        if let Some(parent) = node.parent {
            rotation = self.inverse_transform_rotation(parent, rotation);
        }
        rotation = math::quat_inverse(node.local_rotation) * rotation;
        math::scale_mul_quat(node.local_scale, rotation)
    }

    /// Replaces the local rotation with the one that turns the scaled
    /// `local_axis` toward `world_direction`. A zero scaled axis yields
    /// identity.
    fn match_direction(&mut self, id: NodeId, local_axis: Vec3, world_direction: Vec3) {
        let node = self.node(id);
        let to_local = math::inverse_or_identity(&node.local_to_world);
        let direction = math::transform_vector3(&to_local, world_direction);
        let rotate_scale = math::mat4_from_scale_rotation_translation(
            node.local_scale,
            node.local_rotation,
            Vec3::zeros(),
        );
        let direction = math::transform_vector3(&rotate_scale, direction);
        let scaled_axis = local_axis.component_mul(&node.local_scale);
        let delta = math::rotation_between(scaled_axis, direction);
        self.set_local_rotation(id, delta);
    }

    /// Recomputes the world matrix of `id` and every descendant.
    fn update(&mut self, id: NodeId) {
        profile_function!();
        let parent_matrix = self.parent_matrix(id);
        let node = self.node_mut(id);
        node.local_to_world = parent_matrix * node.local_matrix();
        for i in 0..self.node(id).children.len() {
            let child = self.node(id).children[i];
            self.update(child);
        }
    }
}

/// Iterator returned by [`TransformTree::self_and_ancestors`].
pub struct Ancestors<'a> {
    tree: &'a TransformTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigkit_core::math::{quat_approx_eq, quat_from_rotation_z};
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).norm() < 1e-4
    }

    fn assert_consistent(tree: &TransformTree, id: NodeId) {
        let node = tree.node(id);
        let parent = match node.parent() {
            Some(p) => tree.local_to_world(p),
            None => Mat4::identity(),
        };
        let expected = parent * node.local_matrix();
        assert!((expected - node.local_to_world()).norm() < 1e-4);
        for &child in node.children() {
            assert_eq!(tree.parent(child), Some(id));
            assert_consistent(tree, child);
        }
    }

    #[test]
    fn spawn_creates_detached_identity_node() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        assert_eq!(tree.name(a), "a");
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.local_to_world(a), Mat4::identity());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn set_parent_links_both_sides() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        let child = tree.spawn("child");
        tree.set_parent(child, Some(parent), true);
        assert_eq!(tree.parent(child), Some(parent));
        assert_eq!(tree.children(parent), &[child]);
    }

    #[test]
    fn set_parent_same_parent_is_noop() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        let child = tree.spawn("child");
        tree.set_parent(child, Some(parent), true);
        tree.set_parent(child, Some(parent), true);
        assert_eq!(tree.child_count(parent), 1);
    }

    #[test]
    fn reparent_moves_between_children_lists() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        let b = tree.spawn("b");
        let child = tree.spawn("child");
        tree.set_parent(child, Some(a), true);
        tree.set_parent(child, Some(b), true);
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[child]);
    }

    #[test]
    #[should_panic(expected = "Cannot set node as its own parent")]
    fn set_parent_self_panics() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        tree.set_parent(a, Some(a), true);
    }

    #[test]
    #[should_panic(expected = "under its own descendant")]
    fn set_parent_cycle_panics() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        let b = tree.spawn("b");
        tree.set_parent(b, Some(a), true);
        tree.set_parent(a, Some(b), true);
    }

    #[test]
    fn world_position_stays_preserves_world_pose() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        tree.set_local_trs(
            parent,
            Vec3::new(3.0, -1.0, 0.0),
            quat_from_rotation_z(0.7),
            Vec3::new(2.0, 0.5, 1.0),
        );
        let child = tree.spawn("child");
        tree.set_local_position(child, Vec3::new(1.0, 2.0, 0.0));
        tree.set_local_rotation(child, quat_from_rotation_z(-0.3));

        let before_position = tree.position(child);
        let before_rotation = tree.rotation(child);
        tree.set_parent(child, Some(parent), true);

        assert!(close(tree.position(child), before_position));
        assert!(quat_approx_eq(tree.rotation(child), before_rotation, 1e-5));
        assert_consistent(&tree, parent);
    }

    #[test]
    fn world_position_stays_under_negative_scale() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        tree.set_local_trs(
            parent,
            Vec3::new(1.0, 1.0, 0.0),
            quat_from_rotation_z(0.4),
            Vec3::new(-1.0, 1.0, 1.0),
        );
        let child = tree.spawn("child");
        tree.set_local_position(child, Vec3::new(2.0, 0.0, 0.0));
        tree.set_local_rotation(child, quat_from_rotation_z(0.9));

        let before_position = tree.position(child);
        let before_rotation = tree.rotation(child);
        tree.set_parent(child, Some(parent), true);

        assert!(close(tree.position(child), before_position));
        assert!(quat_approx_eq(tree.rotation(child), before_rotation, 1e-5));
    }

    #[test]
    fn without_world_position_stays_local_is_kept() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        tree.set_local_position(parent, Vec3::new(5.0, 0.0, 0.0));
        let child = tree.spawn("child");
        tree.set_local_position(child, Vec3::new(1.0, 0.0, 0.0));
        tree.set_parent(child, Some(parent), false);
        assert_eq!(tree.local_position(child), Vec3::new(1.0, 0.0, 0.0));
        assert!(close(tree.position(child), Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn local_mutation_propagates_to_descendants() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        let b = tree.spawn("b");
        let c = tree.spawn("c");
        tree.set_parent(b, Some(a), false);
        tree.set_parent(c, Some(b), false);
        tree.set_local_position(b, Vec3::new(1.0, 0.0, 0.0));
        tree.set_local_position(c, Vec3::new(1.0, 0.0, 0.0));

        tree.set_local_rotation(a, quat_from_rotation_z(FRAC_PI_2));
        assert!(close(tree.position(c), Vec3::new(0.0, 2.0, 0.0)));

        tree.set_local_scale(a, Vec3::new(3.0, 3.0, 1.0));
        assert!(close(tree.position(c), Vec3::new(0.0, 6.0, 0.0)));
        assert_consistent(&tree, a);
    }

    #[test]
    fn set_local_rotation_normalizes() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        tree.set_local_rotation(a, quat_from_rotation_z(0.5) * 3.0);
        assert!((tree.local_rotation(a).norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn position_setter_solves_local() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        tree.set_local_trs(
            parent,
            Vec3::new(1.0, 0.0, 0.0),
            quat_from_rotation_z(FRAC_PI_2),
            Vec3::new(2.0, 2.0, 1.0),
        );
        let child = tree.spawn("child");
        tree.set_parent(child, Some(parent), false);
        tree.set_position(child, Vec3::new(1.0, 4.0, 0.0));
        assert!(close(tree.local_position(child), Vec3::new(2.0, 0.0, 0.0)));
        assert!(close(tree.position(child), Vec3::new(1.0, 4.0, 0.0)));
    }

    #[test]
    fn rotation_setter_round_trips() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        tree.set_local_rotation(parent, quat_from_rotation_z(0.3));
        let child = tree.spawn("child");
        tree.set_parent(child, Some(parent), false);
        let target = quat_from_rotation_z(1.2);
        tree.set_rotation(child, target);
        assert!(quat_approx_eq(tree.rotation(child), target, 1e-5));
        assert!(quat_approx_eq(tree.local_rotation(child), quat_from_rotation_z(0.9), 1e-5));
    }

    #[test]
    fn set_right_points_axis_at_direction() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        tree.set_local_rotation(parent, quat_from_rotation_z(0.5));
        let child = tree.spawn("child");
        tree.set_parent(child, Some(parent), false);
        tree.set_right(child, Vec3::new(0.0, 3.0, 0.0));
        assert!(close(tree.right(child), Vec3::y()));
    }

    #[test]
    fn set_up_and_forward() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        tree.set_up(a, Vec3::new(-1.0, 0.0, 0.0));
        assert!(close(tree.up(a), Vec3::new(-1.0, 0.0, 0.0)));
        tree.set_forward(a, Vec3::new(0.0, 1.0, 0.0));
        assert!(close(tree.forward(a), Vec3::y()));
    }

    #[test]
    fn set_right_with_zero_scaled_axis_is_identity() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        tree.set_local_rotation(a, quat_from_rotation_z(1.0));
        tree.set_local_scale(a, Vec3::new(0.0, 1.0, 1.0));
        tree.set_right(a, Vec3::y());
        assert_eq!(tree.local_rotation(a), Quat::identity());
    }

    #[test]
    fn sibling_index_reorders_children() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        let a = tree.spawn("a");
        let b = tree.spawn("b");
        let c = tree.spawn("c");
        for n in [a, b, c] {
            tree.set_parent(n, Some(parent), true);
        }
        assert_eq!(tree.sibling_index(c), Some(2));
        tree.set_sibling_index(c, 0);
        assert_eq!(tree.children(parent), &[c, a, b]);
        tree.set_sibling_index(c, 10);
        assert_eq!(tree.children(parent), &[a, b, c]);
        assert_eq!(tree.sibling_index(parent), None);
    }

    #[test]
    fn set_sibling_index_moves_to_final_position() {
        let mut tree = TransformTree::new();
        let parent = tree.spawn("parent");
        let a = tree.spawn("a");
        let b = tree.spawn("b");
        let c = tree.spawn("c");
        for n in [a, b, c] {
            tree.set_parent(n, Some(parent), true);
        }
        tree.set_sibling_index(a, 2);
        assert_eq!(tree.children(parent), &[b, c, a]);
        assert_eq!(tree.sibling_index(a), Some(2));
        tree.set_sibling_index(a, 1);
        assert_eq!(tree.children(parent), &[b, a, c]);
    }

    #[test]
    fn destroy_detaches_and_orphans_children() {
        let mut tree = TransformTree::new();
        let root = tree.spawn("root");
        let mid = tree.spawn("mid");
        let leaf = tree.spawn("leaf");
        tree.set_parent(mid, Some(root), false);
        tree.set_parent(leaf, Some(mid), false);
        tree.set_local_position(mid, Vec3::new(2.0, 0.0, 0.0));
        tree.set_local_position(leaf, Vec3::new(1.0, 0.0, 0.0));

        assert!(tree.destroy(mid));
        assert!(!tree.is_alive(mid));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.parent(leaf), None);
        assert!(close(tree.position(leaf), Vec3::new(1.0, 0.0, 0.0)));
        assert!(!tree.destroy(mid));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        let b = tree.spawn("b");
        let c = tree.spawn("c");
        tree.set_parent(b, Some(a), false);
        tree.set_parent(c, Some(b), false);
        let chain: Vec<_> = tree.self_and_ancestors(c).collect();
        assert_eq!(chain, vec![c, b, a]);
        assert!(tree.is_ancestor(a, c));
        assert!(!tree.is_ancestor(c, a));
    }

    #[test]
    #[should_panic(expected = "Stale or foreign node handle")]
    fn stale_handle_panics() {
        let mut tree = TransformTree::new();
        let a = tree.spawn("a");
        tree.destroy(a);
        let _ = tree.position(a);
    }
}
