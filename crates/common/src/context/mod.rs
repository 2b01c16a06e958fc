//! Context preparation
//!
//! Overlapping chunk windows and near-identical source passages would
//! otherwise flood the generation prompt with redundant text, so retrieved
//! chunks are deduplicated and then assembled into one cleaned context
//! block.

mod assembler;
mod dedupe;

pub use assembler::assemble_context;
pub use dedupe::{dedupe_chunks, jaccard_similarity};
