//! Document model: blocks, their relations, and the in-memory arena.
//!
//! This module defines what is on the canvas (`Block`, `BlockKind`), the store
//! that owns all live blocks (`DocStore`), and the structural checks applied
//! to externally supplied block sets (`DocError`).
//!
//! Relations between blocks are plain ids: `next` links a block to the one
//! that follows it at the same nesting level, and a container's `child` points
//! at the first block of its nested sequence. Nothing owns anything else, so
//! the arena stays trivially serializable and cycle-checkable. Ids that do not
//! resolve are read as "not found" everywhere.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Unique identifier for a block. Ascending id order is the store's iteration order.
pub type BlockId = u64;

/// Shape of a block, with the fields only that shape carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    /// A single statement.
    Stackable,
    /// A compound statement holding a nested sequence.
    Container {
        /// First block of the nested sequence, if any.
        #[serde(default)]
        child: Option<BlockId>,
    },
}

/// A block as stored in the document and in seed files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier.
    pub id: BlockId,
    /// Stackable or container, with kind-specific fields.
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Statement source text shown on the block.
    pub text: String,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Block that follows this one in its chain.
    #[serde(default)]
    pub next: Option<BlockId>,
}

impl Block {
    /// A free-floating stackable block.
    #[must_use]
    pub fn stackable(id: BlockId, text: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id, kind: BlockKind::Stackable, text: text.into(), x, y, next: None }
    }

    /// An empty, free-floating container block.
    #[must_use]
    pub fn container(id: BlockId, text: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id, kind: BlockKind::Container { child: None }, text: text.into(), x, y, next: None }
    }

    /// Builder: set the successor.
    #[must_use]
    pub fn with_next(mut self, next: BlockId) -> Self {
        self.next = Some(next);
        self
    }

    /// Builder: set the first nested block. Ignored for stackables.
    #[must_use]
    pub fn with_child(mut self, first: BlockId) -> Self {
        self.set_child(Some(first));
        self
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.kind, BlockKind::Container { .. })
    }

    /// First nested block; always `None` for stackables.
    #[must_use]
    pub fn child(&self) -> Option<BlockId> {
        match self.kind {
            BlockKind::Container { child } => child,
            BlockKind::Stackable => None,
        }
    }

    /// Replace the first nested block. Returns false for stackables.
    pub fn set_child(&mut self, first: Option<BlockId>) -> bool {
        match &mut self.kind {
            BlockKind::Container { child } => {
                *child = first;
                true
            }
            BlockKind::Stackable => false,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, pos: Point) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn translate(&mut self, delta: Point) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

/// Structural problems in a supplied block set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    #[error("block id {0} appears more than once")]
    DuplicateId(BlockId),
    #[error("block {0} is referenced by more than one `next`/`child` relation")]
    MultipleParents(BlockId),
    #[error("block {0} is part of a `next`/`child` cycle")]
    Cycle(BlockId),
}

/// In-memory arena of blocks keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Block>", try_from = "Vec<Block>")]
pub struct DocStore {
    blocks: BTreeMap<BlockId, Block>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: BTreeMap::new() }
    }

    /// Build a store from a block list, rejecting duplicate ids and broken structure.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] when ids repeat or the relations are not a forest.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, DocError> {
        let mut store = Self::new();
        for block in blocks {
            if store.blocks.contains_key(&block.id) {
                return Err(DocError::DuplicateId(block.id));
            }
            store.blocks.insert(block.id, block);
        }
        store.check_invariants()?;
        Ok(store)
    }

    /// Insert or replace a block. If a block with the same `id` already
    /// exists it is overwritten.
    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.id, block);
    }

    /// Remove a block by id, returning it if it was present. Relations that
    /// point at it are left dangling; see [`crate::engine::EngineCore::remove_block`].
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        self.blocks.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    /// Move every listed block by `delta`. Unknown ids are skipped.
    pub fn translate(&mut self, ids: &[BlockId], delta: Point) {
        for id in ids {
            if let Some(block) = self.blocks.get_mut(id) {
                block.translate(delta);
            }
        }
    }

    /// All blocks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// All ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.keys().copied().collect()
    }

    /// Number of blocks currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the store contains no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The block whose `next` is `id`, lowest id first.
    #[must_use]
    pub fn predecessor_of(&self, id: BlockId) -> Option<BlockId> {
        self.iter().find(|b| b.next == Some(id)).map(|b| b.id)
    }

    /// The container whose `child` is `id`, lowest id first.
    #[must_use]
    pub fn container_of(&self, id: BlockId) -> Option<BlockId> {
        self.iter().find(|b| b.child() == Some(id)).map(|b| b.id)
    }

    /// Map from each referenced block to the block whose `next` or `child`
    /// points at it. When several do, the lowest id wins.
    #[must_use]
    pub fn parents(&self) -> BTreeMap<BlockId, BlockId> {
        let mut map = BTreeMap::new();
        for block in self.iter() {
            for target in [block.next, block.child()].into_iter().flatten() {
                map.entry(target).or_insert(block.id);
            }
        }
        map
    }

    /// The container whose nested chain contains `id`, if any.
    #[must_use]
    pub fn enclosing_container(&self, id: BlockId) -> Option<BlockId> {
        self.enclosing_container_in(&self.parents(), id)
    }

    /// [`Self::enclosing_container`] against a prebuilt [`Self::parents`] map.
    #[must_use]
    pub fn enclosing_container_in(&self, parents: &BTreeMap<BlockId, BlockId>, id: BlockId) -> Option<BlockId> {
        let mut cur = id;
        for _ in 0..self.len() {
            let up = *parents.get(&cur)?;
            if up == id {
                return None;
            }
            if self.get(up).is_some_and(|b| b.child() == Some(cur)) {
                return Some(up);
            }
            cur = up;
        }
        None
    }

    /// Check that every block has at most one parent and that the
    /// `next`/`child` relations contain no cycle.
    ///
    /// # Errors
    ///
    /// Returns the first violation found in ascending id order.
    pub fn check_invariants(&self) -> Result<(), DocError> {
        let mut parent: BTreeMap<BlockId, BlockId> = BTreeMap::new();
        for block in self.iter() {
            for target in [block.next, block.child()].into_iter().flatten() {
                if target == block.id {
                    return Err(DocError::Cycle(block.id));
                }
                if parent.insert(target, block.id).is_some() {
                    return Err(DocError::MultipleParents(target));
                }
            }
        }

        // Each block has at most one parent, so walking parents from a block
        // that sits on a cycle leads back to it.
        for &start in self.blocks.keys() {
            let mut cur = start;
            for _ in 0..self.len() {
                let Some(&up) = parent.get(&cur) else {
                    break;
                };
                if up == start {
                    return Err(DocError::Cycle(start));
                }
                cur = up;
            }
        }
        Ok(())
    }
}

impl From<DocStore> for Vec<Block> {
    fn from(store: DocStore) -> Self {
        store.blocks.into_values().collect()
    }
}

impl TryFrom<Vec<Block>> for DocStore {
    type Error = DocError;

    fn try_from(blocks: Vec<Block>) -> Result<Self, Self::Error> {
        Self::from_blocks(blocks)
    }
}

/// The starter blocks shown when the editor first opens.
#[must_use]
pub fn default_seed() -> Vec<Block> {
    vec![
        Block::stackable(1, "addVoxel(0, 1, 0, 1, 0, 0)", 50.0, 50.0),
        Block::stackable(2, "addVoxel(0, 2, 0, 0, 1, 0)", 50.0, 120.0),
        Block::stackable(3, "removeVoxel(0, 1, 0)", 50.0, 190.0),
        Block::container(4, "function myFunction()", 300.0, 50.0),
    ]
}
