//! Layout configuration: optional JSON file, then environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::{Path, PathBuf};

use canvas::layout::{Layout, LayoutError};

pub const ENV_SNAP_THRESHOLD: &str = "JIGSAW_SNAP_THRESHOLD";
pub const ENV_BLOCK_HEIGHT: &str = "JIGSAW_BLOCK_HEIGHT";
pub const ENV_BLOCK_PADDING: &str = "JIGSAW_BLOCK_PADDING";
pub const ENV_HEADER_HEIGHT: &str = "JIGSAW_HEADER_HEIGHT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read layout file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid layout file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] LayoutError),
}

/// Build the layout for this run.
///
/// Starts from the defaults (or the JSON file at `path`, whose missing fields
/// keep their defaults), applies `JIGSAW_*` environment overrides, then
/// validates the result.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, or if the
/// final layout has a non-positive value.
pub fn load_layout(path: Option<&Path>) -> Result<Layout, ConfigError> {
    let layout = match path {
        Some(path) => read_layout_file(path)?,
        None => Layout::default(),
    };
    let layout = apply_overrides(layout, |key| std::env::var(key).ok());
    layout.validate()?;
    tracing::debug!(?layout, "layout loaded");
    Ok(layout)
}

fn read_layout_file(path: &Path) -> Result<Layout, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
}

/// Apply overrides from `lookup`. Values that do not parse as `f64` are ignored.
pub fn apply_overrides(mut layout: Layout, lookup: impl Fn(&str) -> Option<String>) -> Layout {
    let parse = |key: &str, default: f64| -> f64 {
        match lookup(key).map(|raw| raw.trim().parse::<f64>()) {
            Some(Ok(value)) => value,
            Some(Err(_)) => {
                tracing::warn!(key, "ignoring unparseable layout override");
                default
            }
            None => default,
        }
    };

    layout.snap_threshold = parse(ENV_SNAP_THRESHOLD, layout.snap_threshold);
    layout.block_height = parse(ENV_BLOCK_HEIGHT, layout.block_height);
    layout.block_padding = parse(ENV_BLOCK_PADDING, layout.block_padding);
    layout.header_height = parse(ENV_HEADER_HEIGHT, layout.header_height);
    layout
}
