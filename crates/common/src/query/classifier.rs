//! Query classification heuristics

/// Keywords that mark a query as asking for a summary or overview.
const SUMMARY_KEYWORDS: &[&str] = &[
    "summary",
    "summarize",
    "summarise",
    "overview",
    "brief",
    "main points",
    "key points",
];

/// Pronouns that reference earlier conversation context.
const PRONOUNS: &[&str] = &["it", "this", "that", "these", "those", "them", "they", "its"];

/// Phrases typical of context-dependent follow-ups.
const VAGUE_PHRASES: &[&str] = &[
    "more",
    "explain",
    "elaborate",
    "detail",
    "tell me more",
    "what about",
    "how about",
    "and",
    "also",
    "continue",
    "go on",
    "keep going",
    "yes",
    "okay",
    "sure",
];

/// True if the query is asking for a summary/overview of the corpus.
pub fn is_summary_query(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    SUMMARY_KEYWORDS.iter().any(|k| query_lower.contains(k))
}

/// True if the query is a short, context-dependent follow-up.
///
/// Either fewer than 6 tokens with a referencing pronoun among them, or any
/// vague phrase appearing in the query. Substring matching on the phrases is
/// deliberately loose; the cost of a false positive is one extra expansion.
pub fn is_vague_query(query: &str) -> bool {
    let query_lower = query.trim().to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();

    if words.len() < 6 && words.iter().any(|w| PRONOUNS.contains(w)) {
        return true;
    }

    VAGUE_PHRASES.iter().any(|p| query_lower.contains(p))
}
