//! Query understanding
//!
//! Lightweight lexical heuristics that shape retrieval: summary detection
//! widens the fetch, vagueness detection triggers history-based expansion.
//! False positives and negatives are tolerated downstream; they only change
//! fetch volume and expansion, never the correctness of grounding.

mod classifier;
mod expander;

pub use classifier::{is_summary_query, is_vague_query};
pub use expander::expand_query;
