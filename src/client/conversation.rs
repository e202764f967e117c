use crate::models::{ChatResponse, Message};

/// Start a conversation with an optional system prompt.
pub fn conversation(system_prompt: &str, user_message: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(Message::system(system_prompt));
    }
    messages.push(Message::user(user_message));
    messages
}

pub fn continue_chat(mut messages: Vec<Message>, user_message: &str) -> Vec<Message> {
    messages.push(Message::user(user_message));
    messages
}

/// Content of the first choice, empty when the response has none.
pub fn extract_content(response: &ChatResponse) -> String {
    response
        .choices
        .first()
        .and_then(|c| c.message.as_ref())
        .map(|m| m.content.clone())
        .unwrap_or_default()
}
