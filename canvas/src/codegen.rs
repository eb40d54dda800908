//! Program text emitted from the block list.

#[cfg(test)]
#[path = "codegen_test.rs"]
mod codegen_test;

use crate::doc::{Block, DocStore};

/// Statement terminator appended to every block's text.
pub const STATEMENT_TERMINATOR: char = ';';

/// Render every block as one `text;` line, ordered top to bottom by `y`.
///
/// Blocks at the same height keep ascending id order.
#[must_use]
pub fn generate_code(doc: &DocStore) -> String {
    let mut blocks: Vec<&Block> = doc.iter().collect();
    blocks.sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.id.cmp(&b.id)));
    blocks
        .iter()
        .map(|b| format!("{}{STATEMENT_TERMINATOR}", b.text))
        .collect::<Vec<_>>()
        .join("\n")
}
