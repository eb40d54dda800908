//! Walking the `next`/`child` relations.
//!
//! Every walk stops at the first id that does not resolve and never visits a
//! block twice, so malformed input cannot hang the editor.

#[cfg(test)]
#[path = "graph_test.rs"]
mod graph_test;

use std::collections::{BTreeMap, BTreeSet};

use crate::doc::{BlockId, DocStore};

/// Blocks following `id` along its `next` chain, nearest first, excluding `id`.
#[must_use]
pub fn sequential_descendants(doc: &DocStore, id: BlockId) -> Vec<BlockId> {
    let start = doc.get(id).and_then(|b| b.next);
    walk_chain(doc, start, id)
}

/// Blocks nested in container `id`: its `child`, then that child's `next` chain.
#[must_use]
pub fn nested_descendants(doc: &DocStore, id: BlockId) -> Vec<BlockId> {
    let start = doc.get(id).and_then(crate::doc::Block::child);
    walk_chain(doc, start, id)
}

fn walk_chain(doc: &DocStore, start: Option<BlockId>, origin: BlockId) -> Vec<BlockId> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::from([origin]);
    let mut cur = start;
    while let Some(id) = cur {
        if !doc.contains(id) || !seen.insert(id) {
            break;
        }
        out.push(id);
        cur = doc.get(id).and_then(|b| b.next);
    }
    out
}

/// Everything that moves rigidly with `id`: its `next` chain and, for every
/// container reached, that container's nested chain, recursively.
///
/// `id` itself is excluded and each block appears once.
#[must_use]
pub fn carried_blocks(doc: &DocStore, id: BlockId) -> Vec<BlockId> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::from([id]);
    let mut stack = vec![id];
    while let Some(cur) = stack.pop() {
        let Some(block) = doc.get(cur) else {
            continue;
        };
        for rel in [block.next, block.child()].into_iter().flatten() {
            if doc.contains(rel) && seen.insert(rel) {
                out.push(rel);
                stack.push(rel);
            }
        }
    }
    out
}

/// Last block of the `next` chain that starts at `id` (possibly `id` itself).
#[must_use]
pub fn chain_tail(doc: &DocStore, id: BlockId) -> BlockId {
    sequential_descendants(doc, id).last().copied().unwrap_or(id)
}

/// Number of containers enclosing `id`.
#[must_use]
pub fn nesting_depth(doc: &DocStore, id: BlockId) -> usize {
    nesting_depth_in(doc, &doc.parents(), id)
}

/// [`nesting_depth`] against a prebuilt [`DocStore::parents`] map, for callers
/// that ask about many blocks at once.
#[must_use]
pub fn nesting_depth_in(doc: &DocStore, parents: &BTreeMap<BlockId, BlockId>, id: BlockId) -> usize {
    let mut depth = 0;
    let mut cur = id;
    while let Some(outer) = doc.enclosing_container_in(parents, cur) {
        depth += 1;
        if depth > doc.len() {
            break;
        }
        cur = outer;
    }
    depth
}

/// Unlink `id` from whatever it is attached to.
///
/// Clears every `next` pointing at `id`. If `id` is the first nested block of
/// a container, the container's `child` advances to `id`'s successor and
/// `id`'s own `next` is cleared, leaving the rest of the nested chain in place.
/// Returns whether anything changed; a second call is a no-op.
pub fn detach(doc: &mut DocStore, id: BlockId) -> bool {
    let Some(own_next) = doc.get(id).map(|b| b.next) else {
        return false;
    };
    let mut changed = false;

    for other in doc.ids() {
        if other == id {
            continue;
        }
        if let Some(block) = doc.get_mut(other) {
            if block.next == Some(id) {
                block.next = None;
                changed = true;
            }
        }
    }

    if let Some(container) = doc.container_of(id) {
        if let Some(block) = doc.get_mut(container) {
            block.set_child(own_next);
        }
        if let Some(block) = doc.get_mut(id) {
            block.next = None;
        }
        changed = true;
    }

    changed
}
