//! Snap-candidate search while dragging, and committing a snap on drop.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{BlockId, DocStore};
use crate::geometry;
use crate::graph;
use crate::layout::Layout;

/// Which edge of the dragged group lines up with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapEdge {
    /// The dragged group's bottom meets the target's top: the group goes above the target.
    Bottom,
    /// The dragged block's top meets the target's bottom: the group goes below the target.
    Top,
}

/// A block the dragged block would attach to if released now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapCandidate {
    pub target: BlockId,
    pub edge: SnapEdge,
}

/// Find the first block (ascending id) the dragged block can snap to.
///
/// `carried` is the group moving with the dragged block; neither it nor the
/// dragged block itself is considered. A target above the group must have no
/// successor, and a target below it must have no predecessor, so a committed
/// snap never gives a block two parents.
#[must_use]
pub fn find_snap_candidate(
    doc: &DocStore,
    layout: &Layout,
    dragged: BlockId,
    carried: &[BlockId],
) -> Option<SnapCandidate> {
    let block = doc.get(dragged)?;
    let threshold = layout.snap_threshold;
    let group_bottom = doc
        .get(graph::chain_tail(doc, dragged))
        .map_or(block.y + layout.block_height, |tail| geometry::block_rect(doc, tail, layout).bottom());

    for other in doc.iter() {
        if other.id == dragged || carried.contains(&other.id) {
            continue;
        }
        if (block.x - other.x).abs() >= threshold {
            continue;
        }

        if (group_bottom - other.y).abs() < threshold && doc.predecessor_of(other.id).is_none() {
            return Some(SnapCandidate { target: other.id, edge: SnapEdge::Bottom });
        }

        let other_bottom = geometry::block_rect(doc, other, layout).bottom();
        if (block.y - other_bottom).abs() < threshold && other.next.is_none() {
            return Some(SnapCandidate { target: other.id, edge: SnapEdge::Top });
        }
    }
    None
}

/// Wire the dragged block to its snap target and align it.
///
/// The target is looked up again, so a candidate that went stale since it was
/// recorded (target removed, or no longer free on the relevant side) leaves
/// the block where it is and returns false.
pub fn apply_snap(doc: &mut DocStore, layout: &Layout, dragged: BlockId, candidate: SnapCandidate) -> bool {
    let carried = graph::carried_blocks(doc, dragged);
    let (Some(block), Some(target)) = (doc.get(dragged), doc.get(candidate.target)) else {
        tracing::debug!(block = dragged, target = candidate.target, "snap target no longer exists");
        return false;
    };
    if target.id == dragged || carried.contains(&target.id) {
        return false;
    }
    let target_id = target.id;
    let target_rect = geometry::block_rect(doc, target, layout);
    let origin = block.position();

    let delta = match candidate.edge {
        SnapEdge::Top => {
            if target.next.is_some() {
                tracing::debug!(block = dragged, target = target_id, "snap target gained a successor");
                return false;
            }
            if let Some(t) = doc.get_mut(target_id) {
                t.next = Some(dragged);
            }
            Point::new(target_rect.x, target_rect.bottom()).minus(origin)
        }
        SnapEdge::Bottom => {
            if doc.predecessor_of(target_id).is_some() {
                tracing::debug!(block = dragged, target = target_id, "snap target gained a predecessor");
                return false;
            }
            let tail_id = graph::chain_tail(doc, dragged);
            let Some(tail) = doc.get(tail_id) else {
                return false;
            };
            let tail_rect = geometry::block_rect(doc, tail, layout);
            let delta = Point::new(target_rect.x - origin.x, target_rect.y - tail_rect.bottom());

            let enclosing = doc.container_of(target_id);
            if let Some(t) = doc.get_mut(tail_id) {
                t.next = Some(target_id);
            }
            if let Some(container) = enclosing {
                if let Some(c) = doc.get_mut(container) {
                    c.set_child(Some(dragged));
                }
            }
            delta
        }
    };

    doc.translate(&[dragged], delta);
    doc.translate(&carried, delta);
    tracing::debug!(block = dragged, target = target_id, edge = ?candidate.edge, "snapped");
    true
}
