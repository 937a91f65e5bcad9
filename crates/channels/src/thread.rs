use slackmate_core::{Message, Result, Thread};
use tracing::debug;

use crate::slack::{SlackApi, SlackMessage};

/// Replies fetched per thread.
pub const THREAD_FETCH_LIMIT: u32 = 50;

/// Fetch a thread and turn it into the conversation the model should answer.
pub async fn reconstruct(
    slack: &dyn SlackApi,
    channel: &str,
    thread_ts: &str,
    bot_user_id: &str,
) -> Result<Thread> {
    let messages = slack
        .conversation_replies(channel, thread_ts, THREAD_FETCH_LIMIT)
        .await?;
    let thread = build_thread(&messages, bot_user_id);
    debug!(
        channel,
        thread_ts,
        fetched = messages.len(),
        kept = thread.len(),
        "Reconstructed thread"
    );
    Ok(thread)
}

/// Convert raw replies into role-tagged messages, ending on the last user turn.
///
/// Messages without text are dropped. Bot-authored messages become assistant
/// turns and are never rewritten. A leading `<@bot> ` mention is removed from
/// user turns, and a user turn left blank by that is dropped. Returns an empty
/// thread when no user message remains.
pub fn build_thread(messages: &[SlackMessage], bot_user_id: &str) -> Thread {
    let converted: Vec<Message> = messages
        .iter()
        .filter_map(|msg| {
            let text = msg.text.as_deref().filter(|t| !t.is_empty())?;
            if msg.is_from_bot() {
                return Some(Message::assistant(text));
            }
            let text = strip_mention(text, bot_user_id);
            (!text.trim().is_empty()).then(|| Message::user(text))
        })
        .collect();

    let Some(last_user) = converted
        .iter()
        .rposition(|m| m.role == slackmate_core::Role::User)
    else {
        return Vec::new();
    };

    let mut thread = converted;
    thread.truncate(last_user + 1);
    thread
}

/// Remove one leading `<@bot_user_id> ` token, if present.
pub fn strip_mention<'a>(text: &'a str, bot_user_id: &str) -> &'a str {
    let prefix = format!("<@{}> ", bot_user_id);
    text.strip_prefix(prefix.as_str()).unwrap_or(text)
}

/// True when `text` holds nothing beyond one leading `<@user>` mention.
pub fn is_mention_only(text: &str) -> bool {
    let rest = match text.trim_start().strip_prefix("<@") {
        Some(after) => after.split_once('>').map_or(after, |(_, rest)| rest),
        None => text,
    };
    rest.trim().is_empty()
}
