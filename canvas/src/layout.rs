//! Tunable geometry settings shared by sizing, snapping, and rendering.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    BLOCK_HEIGHT, BLOCK_PADDING, CHAR_WIDTH, CONTAINER_RIGHT_PADDING, HEADER_HEIGHT, LABEL_PADDING, MIN_BLOCK_WIDTH,
    MIN_CONTAINER_WIDTH, SNAP_THRESHOLD,
};

/// Rejected layout value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout field `{field}` must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Geometry settings, in world units.
///
/// Missing fields deserialize to the defaults in [`crate::consts`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Maximum edge distance at which blocks snap together.
    pub snap_threshold: f64,
    /// Height of a stackable block and of one container slot.
    pub block_height: f64,
    /// Container inner padding and nested-block indent.
    pub block_padding: f64,
    /// Height of a container's title band.
    pub header_height: f64,
    /// Minimum stackable width.
    pub min_block_width: f64,
    /// Minimum container width.
    pub min_container_width: f64,
    /// Gap between the widest nested block and the container's right edge.
    pub container_right_padding: f64,
    /// Estimated width of one label character.
    pub char_width: f64,
    /// Padding added around a label when estimating width.
    pub label_padding: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            block_height: BLOCK_HEIGHT,
            block_padding: BLOCK_PADDING,
            header_height: HEADER_HEIGHT,
            min_block_width: MIN_BLOCK_WIDTH,
            min_container_width: MIN_CONTAINER_WIDTH,
            container_right_padding: CONTAINER_RIGHT_PADDING,
            char_width: CHAR_WIDTH,
            label_padding: LABEL_PADDING,
        }
    }
}

impl Layout {
    /// Check that every field is a positive, finite number.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let fields = [
            ("snap_threshold", self.snap_threshold),
            ("block_height", self.block_height),
            ("block_padding", self.block_padding),
            ("header_height", self.header_height),
            ("min_block_width", self.min_block_width),
            ("min_container_width", self.min_container_width),
            ("container_right_padding", self.container_right_padding),
            ("char_width", self.char_width),
            ("label_padding", self.label_padding),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
