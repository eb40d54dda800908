//! Loading seed block sets from JSON files.

#[cfg(test)]
#[path = "seed_test.rs"]
mod seed_test;

use std::path::{Path, PathBuf};

use canvas::doc::{self, Block, DocError, DocStore};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("inconsistent seed: {0}")]
    Invalid(#[from] DocError),
}

/// Read the block array at `path`, or the built-in starter set when `None`.
///
/// # Errors
///
/// Returns [`SeedError`] if the file cannot be read or is not a JSON array
/// of blocks. Relations are not checked here; see [`check_seed`].
pub fn load_seed(path: Option<&Path>) -> Result<Vec<Block>, SeedError> {
    let Some(path) = path else {
        return Ok(doc::default_seed());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Read { path: path.to_owned(), source })?;
    let blocks: Vec<Block> =
        serde_json::from_str(&raw).map_err(|source| SeedError::Parse { path: path.to_owned(), source })?;
    tracing::debug!(path = %path.display(), blocks = blocks.len(), "seed file read");
    Ok(blocks)
}

/// Build a store from `blocks`, checking ids and relations.
///
/// # Errors
///
/// Returns [`SeedError::Invalid`] on duplicate ids, shared successors, or cycles.
pub fn check_seed(blocks: Vec<Block>) -> Result<DocStore, SeedError> {
    Ok(DocStore::from_blocks(blocks)?)
}
