//! Pointer-event scripts: one JSON object per line.
//!
//! ```text
//! # drag block 2 under block 1
//! {"event": "down", "x": 10, "y": 210, "target": {"block": 2}}
//! {"event": "move", "x": 15, "y": 65}
//! {"event": "up"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A `down` without a
//! `target` is hit-tested against the current blocks when it is replayed.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::io::BufRead;

use canvas::doc::{Block, BlockId};
use canvas::input::PointerTarget;
use serde::{Deserialize, Serialize};

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ScriptEvent {
    Down {
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<PointerTarget>,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up,
    Remove {
        id: BlockId,
    },
    Insert {
        block: Block,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read event script: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns [`ScriptError::Parse`] with the 1-based line number of the first
/// malformed line, or [`ScriptError::Io`] if reading fails.
pub fn parse_script(reader: impl BufRead) -> Result<Vec<ScriptEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| ScriptError::Parse { line: index + 1, source })?;
        events.push(event);
    }
    Ok(events)
}
