use slackmate_channels::events::AssistantThread;
use slackmate_channels::slack::{PostMessage, SlackMessage, SuggestedPrompt};
use slackmate_channels::thread::{build_thread, is_mention_only, reconstruct};
use slackmate_channels::{EventKind, SlackApi, SlackClient, SlackEvent};
use slackmate_core::{Config, Error, Result};
use slackmate_providers::Provider;
use slackmate_tools::{
    ExaSearch, OpenMeteoClient, SearchProvider, StatusSink, ToolContext, WeatherProvider,
};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::generate::Generator;
use crate::status::{AssistantThreadStatus, MessageUpdateStatus};

pub const THINKING_STATUS: &str = "is thinking...";
pub const GREETING: &str = "Hi, how can I help?";
/// Posted in place of a reply when generation fails. Carries no internal detail.
pub const FAILURE_NOTICE: &str = "Sorry, something went wrong while answering. Please try again.";

fn suggested_prompts() -> [SuggestedPrompt; 2] {
    [
        SuggestedPrompt::new("Get the weather", "What is the weather in London?"),
        SuggestedPrompt::new("Get the news", "Get the latest Premier League news from the BBC"),
    ]
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value.ok_or_else(|| Error::Validation(format!("Event is missing {}", field)))
}

/// Routes authenticated Slack events to the generation loop and posts replies.
#[derive(Clone)]
pub struct EventHandler {
    slack: Arc<dyn SlackApi>,
    search: Arc<dyn SearchProvider>,
    weather: Arc<dyn WeatherProvider>,
    generator: Generator,
}

impl EventHandler {
    pub fn new(
        slack: Arc<dyn SlackApi>,
        search: Arc<dyn SearchProvider>,
        weather: Arc<dyn WeatherProvider>,
        generator: Generator,
    ) -> Self {
        Self {
            slack,
            search,
            weather,
            generator,
        }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        let search = &config.tools.search;
        Self::new(
            Arc::new(SlackClient::from_config(&config.slack)),
            Arc::new(ExaSearch::new(&search.api_key, &search.api_base, search.num_results)),
            Arc::new(OpenMeteoClient::new(&config.tools.weather.api_base)),
            Generator::from_config(config, provider),
        )
    }

    fn tool_context(&self, status: Arc<dyn StatusSink>) -> ToolContext {
        ToolContext::new(self.slack.clone(), self.search.clone(), self.weather.clone())
            .with_status(status)
    }

    /// Handle one inner event. Errors are logged, never returned.
    pub async fn dispatch(&self, event: &SlackEvent) {
        if let Err(e) = self.handle(event).await {
            error!(error = %e, event_type = %event.event_type, "Failed to handle Slack event");
        }
    }

    pub async fn handle(&self, event: &SlackEvent) -> Result<()> {
        match event.kind() {
            EventKind::AppMention => self.handle_app_mention(event).await,
            EventKind::AssistantMessage => self.handle_assistant_message(event).await,
            EventKind::AssistantThreadStarted => match &event.assistant_thread {
                Some(thread) => self.handle_thread_started(thread).await,
                None => Ok(()),
            },
            EventKind::Ignored => {
                debug!(event_type = %event.event_type, subtype = ?event.subtype, "Ignoring event");
                Ok(())
            }
        }
    }

    /// Replies in the mention's thread. A placeholder message doubles as the
    /// status line and is replaced by the answer.
    async fn handle_app_mention(&self, event: &SlackEvent) -> Result<()> {
        let channel = required(event.channel.as_deref(), "channel")?;
        let ts = required(event.ts.as_deref(), "ts")?;
        if event.thread_ts.is_none() && is_mention_only(event.text.as_deref().unwrap_or_default()) {
            debug!(channel, ts, "Mention carries no question");
            return Ok(());
        }
        let reply_thread = event.thread_ts.as_deref().unwrap_or(ts);
        info!(channel, thread_ts = reply_thread, "Handling app mention");

        let placeholder_ts = self
            .slack
            .post_message(&PostMessage::new(channel, THINKING_STATUS).in_thread(reply_thread))
            .await?;
        let status = Arc::new(MessageUpdateStatus::new(self.slack.clone(), channel, &placeholder_ts));

        let reply = async {
            let bot_user_id = self.slack.bot_user_id().await?;
            let thread = match event.thread_ts.as_deref() {
                Some(thread_ts) => {
                    reconstruct(self.slack.as_ref(), channel, thread_ts, &bot_user_id).await?
                }
                None => {
                    let mention = SlackMessage {
                        user: event.user.clone(),
                        text: event.text.clone(),
                        ..Default::default()
                    };
                    build_thread(&[mention], &bot_user_id)
                }
            };
            self.generator.generate(&thread, self.tool_context(status)).await
        }
        .await;

        let text = reply.unwrap_or_else(|e| {
            error!(error = %e, channel, "Generation failed for app mention");
            FAILURE_NOTICE.to_string()
        });
        if text.is_empty() {
            debug!(channel, "Empty reply, leaving placeholder untouched");
            return Ok(());
        }
        self.slack.update_message(channel, &placeholder_ts, &text).await
    }

    /// Replies inside an assistant DM thread, using the native status line.
    /// The status is cleared whether or not a reply gets posted.
    async fn handle_assistant_message(&self, event: &SlackEvent) -> Result<()> {
        let channel = required(event.channel.as_deref(), "channel")?;
        let thread_ts = required(event.thread_ts.as_deref(), "thread_ts")?;
        info!(channel, thread_ts, "Handling assistant message");

        let status = Arc::new(AssistantThreadStatus::new(self.slack.clone(), channel, thread_ts));
        status.set_status(THINKING_STATUS).await;

        let reply = async {
            let bot_user_id = self.slack.bot_user_id().await?;
            let thread = reconstruct(self.slack.as_ref(), channel, thread_ts, &bot_user_id).await?;
            self.generator.generate(&thread, self.tool_context(status.clone())).await
        }
        .await;

        let text = reply.unwrap_or_else(|e| {
            error!(error = %e, channel, "Generation failed for assistant message");
            FAILURE_NOTICE.to_string()
        });
        let posted = if text.is_empty() {
            debug!(channel, thread_ts, "Empty reply, nothing to post");
            Ok(())
        } else {
            self.slack
                .post_message(&PostMessage::new(channel, text).in_thread(thread_ts).without_unfurl())
                .await
                .map(|_| ())
        };
        status.set_status("").await;
        posted
    }

    async fn handle_thread_started(&self, thread: &AssistantThread) -> Result<()> {
        info!(channel = %thread.channel_id, thread_ts = %thread.thread_ts, "Assistant thread started");
        self.slack
            .post_message(&PostMessage::new(&thread.channel_id, GREETING).in_thread(&thread.thread_ts))
            .await?;
        self.slack
            .set_suggested_prompts(&thread.channel_id, &thread.thread_ts, &suggested_prompts())
            .await
    }
}
