//! Block sizes, container sizing, and interior overlap tests.
//!
//! Container dimensions are never stored on the block. They are a pure
//! function of the container's current nested chain and are recomputed on
//! every call.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;
use crate::doc::{Block, BlockKind, DocStore};
use crate::graph;
use crate::layout::Layout;

/// Width and height in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(origin: Point, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x && self.y < other.bottom() && self.bottom() > other.y
    }

    /// Whether `pt` lies inside, edges included.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }
}

/// Derived dimensions of a container block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
    /// Number of blocks on the container's nested chain.
    pub child_count: usize,
}

/// Estimated rendered width of a stackable block with label `text`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimated_width(text: &str, layout: &Layout) -> f64 {
    let chars = text.chars().count() as f64;
    layout.min_block_width.max(chars.mul_add(layout.char_width, layout.label_padding))
}

/// Size of a container from its current nested chain.
///
/// Height always reserves at least one slot, so an empty container is never
/// collapsed. Stackables report the size of an empty container.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn container_size(doc: &DocStore, container: &Block, layout: &Layout) -> ContainerSize {
    let nested = graph::nested_descendants(doc, container.id);
    let widest = nested
        .iter()
        .filter_map(|id| doc.get(*id))
        .map(|b| estimated_width(&b.text, layout))
        .fold(0.0_f64, f64::max);

    let slots = nested.len().max(1) as f64;
    let height = slots.mul_add(layout.block_height, layout.header_height + 2.0 * layout.block_padding);
    let width = layout
        .min_container_width
        .max(layout.block_padding + widest + layout.container_right_padding);

    ContainerSize { width, height, child_count: nested.len() }
}

/// Size of any block.
#[must_use]
pub fn block_size(doc: &DocStore, block: &Block, layout: &Layout) -> Size {
    match block.kind {
        BlockKind::Stackable => Size { width: estimated_width(&block.text, layout), height: layout.block_height },
        BlockKind::Container { .. } => {
            let size = container_size(doc, block, layout);
            Size { width: size.width, height: size.height }
        }
    }
}

/// Bounding box of a block at its stored position.
#[must_use]
pub fn block_rect(doc: &DocStore, block: &Block, layout: &Layout) -> Rect {
    Rect::new(block.position(), block_size(doc, block, layout))
}

/// The region of a container that accepts dropped blocks: its box minus the
/// header band and the padding on every side.
#[must_use]
pub fn interior_rect(doc: &DocStore, container: &Block, layout: &Layout) -> Rect {
    let size = container_size(doc, container, layout);
    let pad = layout.block_padding;
    Rect {
        x: container.x + pad,
        y: container.y + layout.header_height + pad,
        width: (size.width - 2.0 * pad).max(0.0),
        height: (size.height - layout.header_height - 2.0 * pad).max(0.0),
    }
}

/// Whether a box at `position` with `size` intersects the interior of `container`.
#[must_use]
pub fn overlaps(position: Point, size: Size, doc: &DocStore, container: &Block, layout: &Layout) -> bool {
    Rect::new(position, size).intersects(&interior_rect(doc, container, layout))
}

/// Top-left of the first nested slot of a container.
#[must_use]
pub fn first_slot(container: &Block, layout: &Layout) -> Point {
    Point::new(
        container.x + layout.block_padding,
        container.y + layout.header_height + layout.block_padding,
    )
}
