//! Shared numeric constants for the canvas crate.
//!
//! These are the defaults behind [`crate::layout::Layout`]; code that needs a
//! tunable value reads it from the layout instead.

// ── Block geometry ──────────────────────────────────────────────

/// Height of one stackable block, and of one slot inside a container.
pub const BLOCK_HEIGHT: f64 = 50.0;

/// Inner padding of a container on every side, and the nested-block indent.
pub const BLOCK_PADDING: f64 = 15.0;

/// Height of the title band at the top of a container.
pub const HEADER_HEIGHT: f64 = 40.0;

/// Narrowest a stackable block is ever laid out.
pub const MIN_BLOCK_WIDTH: f64 = 200.0;

/// Narrowest a container is ever laid out.
pub const MIN_CONTAINER_WIDTH: f64 = 250.0;

/// Space between the widest nested block and the container's right edge.
pub const CONTAINER_RIGHT_PADDING: f64 = 25.0;

/// Estimated width of one label character, in world units.
pub const CHAR_WIDTH: f64 = 8.0;

/// Horizontal padding added around a label when estimating block width.
pub const LABEL_PADDING: f64 = 40.0;

// ── Snapping ────────────────────────────────────────────────────

/// Maximum edge distance (world units) at which two blocks snap together.
pub const SNAP_THRESHOLD: f64 = 30.0;

// ── Connectors ──────────────────────────────────────────────────

/// Horizontal offset of a connector line from the block's left edge.
pub const CONNECTOR_X_OFFSET: f64 = 100.0;

/// Radius of the dot drawn where a connector meets the next block.
pub const CONNECTOR_DOT_RADIUS: f64 = 4.0;
