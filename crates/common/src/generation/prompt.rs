//! Grounding prompt construction

use crate::types::{ConversationTurn, NOT_IN_CONTEXT_SENTINEL};

/// Build the strict grounding prompt for one question.
///
/// The instruction block forbids outside knowledge and mandates the exact
/// refusal sentence when the answer is absent from context. At most
/// `history_window` trailing turns of history are included, rendered as
/// `Role: content` lines. `query` is the user's original question, never the
/// expanded retrieval query.
pub fn build_prompt(
    query: &str,
    context: &str,
    history: &[ConversationTurn],
    history_window: usize,
) -> String {
    let mut prompt = format!(
        "You are a helpful assistant that answers questions ONLY from the provided context.\n\
         \n\
         RULES:\n\
         - Answer ONLY using the DOCUMENT CONTEXT below. Do NOT use external knowledge.\n\
         - If the answer is not in the context, say exactly: \"{}\"\n\
         - Do NOT guess or hallucinate.\n\
         - Give clear, detailed answers (3-6 sentences) when possible.\n\
         - Use bullet points for lists if appropriate.\n\
         - Consider the conversation history for follow-up questions.\n\
         \n\
         DOCUMENT CONTEXT:\n\
         {}\n",
        NOT_IN_CONTEXT_SENTINEL, context
    );

    if !history.is_empty() {
        let start = history.len().saturating_sub(history_window);
        let lines: Vec<String> = history[start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.role.as_label(), turn.content))
            .collect();
        prompt.push_str(&format!("\nCONVERSATION HISTORY:\n{}\n", lines.join("\n")));
    }

    prompt.push_str(&format!("\nCURRENT QUESTION: {}\n\nANSWER:", query));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_refusal_sentence() {
        let prompt = build_prompt("what is X?", "some context", &[], 6);
        assert!(prompt.contains(NOT_IN_CONTEXT_SENTINEL));
        assert!(prompt.contains("DOCUMENT CONTEXT:\nsome context"));
        assert!(prompt.contains("CURRENT QUESTION: what is X?"));
        assert!(prompt.ends_with("ANSWER:"));
    }

    #[test]
    fn test_history_omitted_when_empty() {
        let prompt = build_prompt("q", "ctx", &[], 6);
        assert!(!prompt.contains("CONVERSATION HISTORY"));
    }

    #[test]
    fn test_history_rendered_as_role_lines() {
        let history = vec![
            ConversationTurn::user("What is the refund policy?"),
            ConversationTurn::assistant("Refunds take 30 days."),
        ];
        let prompt = build_prompt("tell me more", "ctx", &history, 6);
        assert!(prompt.contains("User: What is the refund policy?"));
        assert!(prompt.contains("Assistant: Refunds take 30 days."));
    }

    #[test]
    fn test_history_window_trims_oldest() {
        let history: Vec<ConversationTurn> = (0..10)
            .map(|i| ConversationTurn::user(format!("question {}", i)))
            .collect();
        let prompt = build_prompt("q", "ctx", &history, 6);
        assert!(!prompt.contains("question 3"));
        assert!(prompt.contains("question 4"));
        assert!(prompt.contains("question 9"));
    }
}
