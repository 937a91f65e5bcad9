use serde::Deserialize;
use slackmate_core::{Error, Result};

/// Outer Events API payload.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: String,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub event: Option<SlackEvent>,
}

impl EventEnvelope {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::Validation(format!("invalid event envelope: {}", e)))
    }

    pub fn is_event_callback(&self) -> bool {
        self.envelope_type == "event_callback"
    }

    pub fn is_url_verification(&self) -> bool {
        self.envelope_type == "url_verification"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantThread {
    #[serde(default)]
    pub user_id: Option<String>,
    pub channel_id: String,
    pub thread_ts: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub bot_profile: Option<serde_json::Value>,
    #[serde(default)]
    pub assistant_thread: Option<AssistantThread>,
}

/// What the assistant should do with an inner event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    AppMention,
    AssistantMessage,
    AssistantThreadStarted,
    Ignored,
}

impl SlackEvent {
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some() || self.bot_profile.is_some()
    }

    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "app_mention" if !self.is_from_bot() => EventKind::AppMention,
            "message"
                if self.subtype.is_none()
                    && self.channel_type.as_deref() == Some("im")
                    && !self.is_from_bot()
                    && self.thread_ts.is_some() =>
            {
                EventKind::AssistantMessage
            }
            "assistant_thread_started" if self.assistant_thread.is_some() => {
                EventKind::AssistantThreadStarted
            }
            _ => EventKind::Ignored,
        }
    }
}
