//! Read-only projection of editor state into drawable shapes.
//!
//! The scene is what the painter in [`crate::render`] consumes. Building it
//! never mutates state; everything here is derived from the block arena, the
//! current gesture, and the layout.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use crate::camera::Point;
use crate::consts::CONNECTOR_X_OFFSET;
use crate::doc::{BlockId, BlockKind, DocStore};
use crate::engine::EditorState;
use crate::geometry::{self, Rect};
use crate::graph;
use crate::label::{self, LabelPart};
use crate::layout::Layout;

/// Kind-specific content of a shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeBody {
    /// A stackable block's label, split for rendering.
    Statement { parts: Vec<LabelPart> },
    /// A container's header caption and band height.
    Container { header: String, header_height: f64 },
}

/// One block, positioned and sized in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: BlockId,
    pub rect: Rect,
    pub body: ShapeBody,
    /// This block is the one under the pointer.
    pub dragged: bool,
    /// The dragged block would attach to this block if released now.
    pub snap_target: bool,
}

/// A line from a block to its successor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: Point,
    pub to: Point,
}

/// Everything the painter needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    pub connectors: Vec<Connector>,
}

/// Block ids bottom-most first: containers (outer before inner), then
/// stackables, each group in ascending id order.
#[must_use]
pub fn draw_order(doc: &DocStore) -> Vec<BlockId> {
    let parents = doc.parents();
    let mut ids: Vec<(u8, usize, BlockId)> = doc
        .iter()
        .map(|b| match b.kind {
            BlockKind::Container { .. } => (0, graph::nesting_depth_in(doc, &parents, b.id), b.id),
            BlockKind::Stackable => (1, 0, b.id),
        })
        .collect();
    ids.sort_unstable();
    ids.into_iter().map(|(_, _, id)| id).collect()
}

/// Project the current state into a scene.
#[must_use]
pub fn build_scene(state: &EditorState, layout: &Layout) -> Scene {
    let doc = &state.doc;
    let dragged = state.input.dragged_block();
    let snap_target = state.input.snap_candidate().map(|c| c.target);

    let shapes = draw_order(doc)
        .into_iter()
        .filter_map(|id| doc.get(id))
        .map(|block| {
            let rect = geometry::block_rect(doc, block, layout);
            let body = match block.kind {
                BlockKind::Stackable => ShapeBody::Statement { parts: label::parse_label(&block.text) },
                BlockKind::Container { .. } => {
                    let count = geometry::container_size(doc, block, layout).child_count;
                    ShapeBody::Container {
                        header: format!("{} [{count} blocks]", block.text),
                        header_height: layout.header_height,
                    }
                }
            };
            Shape {
                id: block.id,
                rect,
                body,
                dragged: dragged == Some(block.id),
                snap_target: snap_target == Some(block.id),
            }
        })
        .collect();

    let connectors = doc
        .iter()
        .filter_map(|block| {
            let next = doc.get(block.next?)?;
            let from = geometry::block_rect(doc, block, layout);
            Some(Connector {
                from: Point::new(from.x + CONNECTOR_X_OFFSET, from.bottom()),
                to: Point::new(next.x + CONNECTOR_X_OFFSET, next.y),
            })
        })
        .collect();

    Scene { shapes, connectors }
}
