use chrono::NaiveDate;
use slackmate_core::types::ChatMessage;
use slackmate_core::Message;

/// Fixed instruction sent ahead of every conversation.
pub fn system_prompt(today: NaiveDate) -> String {
    format!(
        "You are a Slack bot assistant. Keep your responses concise and to the point.\n\
         - Do not tag users.\n\
         - Mention users by their name not their ID.\n\
         - Mention channels by their name not their ID.\n\
         - Current date is: {}",
        today.format("%Y-%m-%d")
    )
}

/// System prompt followed by the thread, in order.
pub fn build_messages(thread: &[Message], today: NaiveDate) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(thread.len() + 1);
    messages.push(ChatMessage::system(&system_prompt(today)));
    messages.extend(thread.iter().map(Message::to_chat_message));
    messages
}
