//! Input model: pointer events and the gesture state machine.
//!
//! `PointerEvent` is what the host forwards from the DOM. `InputState` is the
//! gesture being tracked between pointer-down and pointer-up, carrying all
//! context needed to move the dragged group and commit its final placement on
//! release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::BlockId;
use crate::snap::SnapCandidate;

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    /// Empty canvas background.
    Canvas,
    /// A block's grab area.
    Block(BlockId),
    /// A container's body below its header. Neither pans nor drags.
    ContainerBody(BlockId),
}

/// A pointer event in screen coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { at: Point, target: PointerTarget },
    Move { at: Point },
    Up,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the canvas by dragging the background.
    Panning {
        /// Pointer position minus the pan offset at pointer-down.
        anchor: Point,
    },
    /// The user is moving a block (and everything it carries).
    DraggingBlock {
        /// Id of the block being dragged.
        id: BlockId,
        /// Pointer position relative to the block's top-left, in world units.
        grab_offset: Point,
        /// Where the block would attach if released now.
        snap: Option<SnapCandidate>,
    },
}

impl InputState {
    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    #[must_use]
    pub fn pan_anchor(&self) -> Option<Point> {
        match self {
            Self::Panning { anchor } => Some(*anchor),
            _ => None,
        }
    }

    #[must_use]
    pub fn dragged_block(&self) -> Option<BlockId> {
        match self {
            Self::DraggingBlock { id, .. } => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn drag_anchor_offset(&self) -> Option<Point> {
        match self {
            Self::DraggingBlock { grab_offset, .. } => Some(*grab_offset),
            _ => None,
        }
    }

    #[must_use]
    pub fn snap_candidate(&self) -> Option<SnapCandidate> {
        match self {
            Self::DraggingBlock { snap, .. } => *snap,
            _ => None,
        }
    }
}
