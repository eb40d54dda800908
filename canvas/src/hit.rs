#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::doc::{BlockId, DocStore};
use crate::geometry::{self, Rect};
use crate::layout::Layout;
use crate::scene;

/// Find the topmost block whose grab area contains `world_pt`.
///
/// Stackables are grabbed anywhere on their body. Containers are grabbed only
/// by their header band; a press on a container's body falls through to
/// whatever lies beneath. See [`container_body_at`] for what such a press
/// lands on when nothing grabbable lies beneath.
#[must_use]
pub fn hit_test(doc: &DocStore, layout: &Layout, world_pt: Point) -> Option<BlockId> {
    scene::draw_order(doc).into_iter().rev().find(|id| {
        doc.get(*id).is_some_and(|block| {
            let rect = geometry::block_rect(doc, block, layout);
            let grab = if block.is_container() { Rect { height: layout.header_height, ..rect } } else { rect };
            grab.contains(world_pt)
        })
    })
}

/// Topmost container whose full box contains `world_pt`.
#[must_use]
pub fn container_body_at(doc: &DocStore, layout: &Layout, world_pt: Point) -> Option<BlockId> {
    scene::draw_order(doc).into_iter().rev().find(|id| {
        doc.get(*id)
            .is_some_and(|block| block.is_container() && geometry::block_rect(doc, block, layout).contains(world_pt))
    })
}
