//! Context assembly for prompt construction

use crate::types::RetrievedChunk;
use regex_lite::Regex;
use std::sync::OnceLock;

use super::dedupe::dedupe_chunks;

fn paragraph_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").unwrap())
}

/// Deduplicate retrieved chunks and join them into a single context block.
///
/// Each surviving chunk is trimmed and its internal blank-line paragraph
/// breaks collapsed to single newlines, so the double newline between
/// chunks stays the only chunk boundary marker in the assembled text.
/// Returns an empty string for empty input.
pub fn assemble_context(chunks: Vec<RetrievedChunk>, dedupe_threshold: f32) -> String {
    let unique = dedupe_chunks(chunks, dedupe_threshold);

    let parts: Vec<String> = unique
        .iter()
        .map(|chunk| {
            paragraph_break_re()
                .replace_all(chunk.text.trim(), "\n")
                .into_owned()
        })
        .filter(|part| !part.is_empty())
        .collect();

    parts.join("\n\n")
}
