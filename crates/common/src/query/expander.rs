//! Conversational query expansion

use super::classifier::is_vague_query;
use crate::types::{ConversationTurn, Role};

/// Expand a vague follow-up with the antecedent topic from history.
///
/// If the query stands alone or there is no history, it is returned
/// unchanged. Otherwise the history is scanned in reverse for the most
/// recent user message, which is prepended so pronoun-laden follow-ups
/// ("tell me more about it") still retrieve on-topic chunks.
///
/// Expansion affects retrieval only; the original query is what gets
/// answered.
pub fn expand_query(query: &str, history: &[ConversationTurn]) -> String {
    if history.is_empty() || !is_vague_query(query) {
        return query.to_string();
    }

    let mut last_user: Option<&str> = None;
    let mut last_assistant: Option<&str> = None;

    for turn in history.iter().rev() {
        match turn.role {
            Role::User if last_user.is_none() => last_user = Some(&turn.content),
            Role::Assistant if last_assistant.is_none() => last_assistant = Some(&turn.content),
            _ => {}
        }
        if last_user.is_some() && last_assistant.is_some() {
            break;
        }
    }

    match last_user {
        Some(prior) => format!("{} {}", prior, query),
        None => query.to_string(),
    }
}
