//! Text chunking
//!
//! Splits documents into overlapping character-budgeted pieces before
//! embedding. Splitting is separator-prioritized: a region is cut on
//! paragraph breaks first and only falls back to line breaks, sentence ends,
//! then single spaces when a piece still exceeds the budget. The overlap
//! copied from each chunk's tail into the next keeps statements that span a
//! boundary retrievable from at least one chunk.

use tracing::debug;

/// Separators tried in priority order
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

/// Configuration for text chunking
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Characters copied from each chunk's tail into the next chunk
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 400,
            overlap: 80,
        }
    }
}

/// Split text into ordered chunk texts.
///
/// Every returned chunk fits within `chunk_size` characters, counting the
/// overlap carried over from the previous chunk. Position in the returned
/// sequence is the chunk's permanent sequence index; callers dropping
/// empty-after-sanitize chunks must not renumber the survivors.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let pieces = split_by_separator(text, config.chunk_size, 0);
    let chunks = merge_pieces(pieces, config.chunk_size, config.overlap.min(config.chunk_size / 2));

    debug!(
        input_len = text.len(),
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        "Text chunked"
    );

    chunks
}

/// Recursively split oversized regions, falling back to the next separator
/// only when the current one cannot bring a piece within budget.
fn split_by_separator(text: &str, chunk_size: usize, separator_index: usize) -> Vec<String> {
    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    let Some(separator) = SEPARATORS.get(separator_index) else {
        return hard_cut(text, chunk_size);
    };

    if !text.contains(separator) {
        return split_by_separator(text, chunk_size, separator_index + 1);
    }

    let mut pieces = Vec::new();
    // separator stays attached to the preceding piece
    for part in text.split_inclusive(separator) {
        if part.chars().count() > chunk_size {
            pieces.extend(split_by_separator(part, chunk_size, separator_index + 1));
        } else {
            pieces.push(part.to_string());
        }
    }
    pieces
}

/// Cut an unsplittable region at fixed character offsets.
fn hard_cut(text: &str, chunk_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if current.chars().count() >= chunk_size {
            pieces.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedily merge pieces into chunks within the size budget, carrying
/// `overlap` trailing characters of each finished chunk into the next.
fn merge_pieces(pieces: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        let current_len = current.chars().count();
        let piece_len = piece.chars().count();

        if !current.is_empty() && current_len + piece_len > chunk_size {
            let tail = overlap_tail(&current, overlap);
            chunks.push(std::mem::take(&mut current));
            if tail.chars().count() + piece_len <= chunk_size {
                current = tail;
            }
        }
        current.push_str(&piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= overlap {
        return text.to_string();
    }
    text.chars().skip(count - overlap).collect()
}
