use async_trait::async_trait;
use slackmate_channels::SlackApi;
use slackmate_tools::StatusSink;
use std::sync::Arc;
use tracing::warn;

/// Shows progress through `assistant.threads.setStatus`.
pub struct AssistantThreadStatus {
    slack: Arc<dyn SlackApi>,
    channel: String,
    thread_ts: String,
}

impl AssistantThreadStatus {
    pub fn new(slack: Arc<dyn SlackApi>, channel: &str, thread_ts: &str) -> Self {
        Self {
            slack,
            channel: channel.to_string(),
            thread_ts: thread_ts.to_string(),
        }
    }
}

#[async_trait]
impl StatusSink for AssistantThreadStatus {
    async fn set_status(&self, status: &str) {
        if let Err(e) = self
            .slack
            .set_assistant_status(&self.channel, &self.thread_ts, status)
            .await
        {
            warn!(error = %e, channel = %self.channel, "Failed to set assistant status");
        }
    }
}

/// Shows progress by editing a placeholder message in place.
pub struct MessageUpdateStatus {
    slack: Arc<dyn SlackApi>,
    channel: String,
    ts: String,
}

impl MessageUpdateStatus {
    pub fn new(slack: Arc<dyn SlackApi>, channel: &str, ts: &str) -> Self {
        Self {
            slack,
            channel: channel.to_string(),
            ts: ts.to_string(),
        }
    }
}

#[async_trait]
impl StatusSink for MessageUpdateStatus {
    async fn set_status(&self, status: &str) {
        if let Err(e) = self.slack.update_message(&self.channel, &self.ts, status).await {
            warn!(error = %e, channel = %self.channel, "Failed to update status message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSlack, SlackCall};

    #[tokio::test]
    async fn test_assistant_status_calls_set_status() {
        let slack = Arc::new(RecordingSlack::default());
        let sink = AssistantThreadStatus::new(slack.clone(), "D1", "1.5");
        sink.set_status("is searching the web for rust...").await;
        assert_eq!(
            slack.calls(),
            vec![SlackCall::Status {
                channel: "D1".into(),
                thread_ts: "1.5".into(),
                status: "is searching the web for rust...".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_message_status_edits_placeholder() {
        let slack = Arc::new(RecordingSlack::default());
        let sink = MessageUpdateStatus::new(slack.clone(), "C1", "9.9");
        sink.set_status("is getting weather for Oslo...").await;
        assert_eq!(
            slack.calls(),
            vec![SlackCall::Update {
                channel: "C1".into(),
                ts: "9.9".into(),
                text: "is getting weather for Oslo...".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_status_failure_is_swallowed() {
        let slack = Arc::new(RecordingSlack {
            fail_writes: true,
            ..Default::default()
        });
        let sink = AssistantThreadStatus::new(slack.clone(), "D1", "1.5");
        sink.set_status("is thinking...").await;
        assert!(slack.calls().is_empty());
    }
}
