use std::fmt;

use serde::{Deserialize, Serialize};

/// A 64-bit node handle: slot index plus generation.
///
/// - **index**: slot in the owning [`TransformTree`](crate::TransformTree)
/// - **generation**: bumped whenever the slot is freed, so a handle to a
///   destroyed node never aliases a node later spawned into the same slot
///
/// Two handles are equal only if both fields match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index of this node.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the generation of this node.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

/// Allocates and recycles node slots with generation tracking.
///
/// When a node is freed its slot goes on a free list and its generation is
/// incremented. The next allocation reuses the slot under the new
/// generation, invalidating any old handles.
#[derive(Debug, Default)]
pub(crate) struct NodeAllocator {
    /// Current generation for each slot. Index = node index.
    generations: Vec<u32>,
    /// Alive flag per slot.
    alive: Vec<bool>,
    /// Free list of recyclable indices (LIFO stack).
    free_list: Vec<u32>,
    /// Total number of currently alive nodes.
    count: u32,
}

impl NodeAllocator {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a node handle, reusing a recycled slot if available.
    pub fn allocate(&mut self) -> NodeId {
        self.count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            NodeId::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            NodeId::new(index, 0)
        }
    }

    /// Frees a handle. Returns false if it is already dead or stale.
    pub fn deallocate(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(id.index());
        self.count -= 1;
        true
    }

    /// Returns whether the handle refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        let idx = id.index() as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == id.generation()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Number of slots ever allocated (live or free).
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }
}
