//! Assembles the message list sent to the completion provider.

use sourcechat_core::message::{ChatTurn, ModelMessage};

/// Convert a stored turn into the message the model sees.
///
/// Source framing is stripped so earlier questions are replayed as plain
/// questions; grounding content is only ever attached to the newest one.
pub fn format_for_model(turn: &ChatTurn) -> ModelMessage {
    ModelMessage {
        role: turn.role,
        content: turn.question_text().to_string(),
    }
}

/// The final user message, with grounding content when there is any.
pub fn grounded_question(question: &str, content: Option<&str>) -> String {
    match content {
        Some(content) => format!("Based on this content: {content}\n\nPlease answer: {question}"),
        None => question.to_string(),
    }
}

/// `[system] ++ prior turns ++ [question]`.
///
/// `prior` must not include the turn for `question` itself.
pub fn build_messages(
    system_prompt: &str,
    prior: &[ChatTurn],
    question: &str,
    content: Option<&str>,
) -> Vec<ModelMessage> {
    let mut messages = Vec::with_capacity(prior.len() + 2);
    messages.push(ModelMessage::system(system_prompt));
    messages.extend(prior.iter().map(format_for_model));
    messages.push(ModelMessage::user(grounded_question(question, content)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcechat_core::message::{Role, SourceRef};

    #[test]
    fn source_turn_formats_to_question() {
        let turn = ChatTurn::user_with_source("Summarize", SourceRef::url("https://example.com"));
        assert_eq!(format_for_model(&turn), ModelMessage::user("Summarize"));
    }

    #[test]
    fn framed_legacy_turn_formats_to_question_line() {
        let turn = ChatTurn::user("Source: URL - https://a.b\nQuestion: What is it?\n");
        assert_eq!(format_for_model(&turn).content, "What is it?");
    }

    #[test]
    fn formatting_is_idempotent() {
        let turn = ChatTurn::user("Source: PDF - x.pdf\nQuestion: Why?");
        let once = format_for_model(&turn);
        let twice = format_for_model(&ChatTurn::user(once.content.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn assistant_turn_passes_through() {
        let turn = ChatTurn::assistant("An answer.");
        let msg = format_for_model(&turn);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "An answer.");
    }

    #[test]
    fn no_history_no_content() {
        let messages = build_messages("sys", &[], "What is this about?", None);
        assert_eq!(
            messages,
            vec![
                ModelMessage::system("sys"),
                ModelMessage::user("What is this about?"),
            ]
        );
    }

    #[test]
    fn grounding_wraps_final_question_only() {
        let prior = vec![
            ChatTurn::user_with_source("First?", SourceRef::pdf("a.pdf")),
            ChatTurn::assistant("First answer"),
        ];
        let messages = build_messages("sys", &prior, "Second?", Some("PAGE TEXT"));
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1], ModelMessage::user("First?"));
        assert_eq!(messages[2], ModelMessage::assistant("First answer"));
        assert_eq!(
            messages[3].content,
            "Based on this content: PAGE TEXT\n\nPlease answer: Second?"
        );
    }
}
