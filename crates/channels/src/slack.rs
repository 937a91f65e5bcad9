use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use slackmate_core::config::SlackConfig;
use slackmate_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackMessage {
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
    pub subtype: Option<String>,
}

impl SlackMessage {
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackChannelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackUserProfile {
    #[serde(default)]
    pub real_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub profile: Option<SlackUserProfile>,
}

impl SlackUser {
    /// Real name from the member record, falling back to the profile.
    pub fn display_real_name(&self) -> Option<&str> {
        self.real_name
            .as_deref()
            .or_else(|| self.profile.as_ref().and_then(|p| p.real_name.as_deref()))
    }
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedPrompt {
    pub title: String,
    pub message: String,
}

impl SuggestedPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_media: Option<bool>,
}

impl PostMessage {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            thread_ts: None,
            unfurl_links: None,
            unfurl_media: None,
        }
    }

    pub fn in_thread(mut self, thread_ts: impl Into<String>) -> Self {
        self.thread_ts = Some(thread_ts.into());
        self
    }

    pub fn without_unfurl(mut self) -> Self {
        self.unfurl_links = Some(false);
        self.unfurl_media = Some(false);
        self
    }
}

/// The Slack Web API surface the assistant relies on.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `conversations.replies`, in platform order.
    async fn conversation_replies(
        &self,
        channel: &str,
        thread_ts: &str,
        limit: u32,
    ) -> Result<Vec<SlackMessage>>;

    /// `conversations.history`, most recent first.
    async fn conversation_history(&self, channel: &str, limit: u32) -> Result<Vec<SlackMessage>>;

    /// One page of `conversations.list` (public and private, archived excluded).
    async fn list_channels_page(
        &self,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<SlackChannelInfo>>;

    /// One page of `users.list`.
    async fn list_users_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<SlackUser>>;

    /// User id of the bot the token belongs to (`auth.test`).
    async fn bot_user_id(&self) -> Result<String>;

    async fn set_assistant_status(&self, channel: &str, thread_ts: &str, status: &str)
        -> Result<()>;

    async fn set_suggested_prompts(
        &self,
        channel: &str,
        thread_ts: &str,
        prompts: &[SuggestedPrompt],
    ) -> Result<()>;

    /// Returns the `ts` of the posted message.
    async fn post_message(&self, message: &PostMessage) -> Result<String>;

    async fn update_message(&self, channel: &str, ts: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Option<Vec<SlackMessage>>,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    channels: Vec<SlackChannelInfo>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    members: Vec<SlackUser>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    #[serde(default)]
    ts: Option<String>,
}

fn next_cursor(meta: Option<ResponseMetadata>) -> Option<String> {
    meta.and_then(|m| m.next_cursor).filter(|c| !c.is_empty())
}

/// Check the `ok` flag of a Web API reply, then decode the method-specific body.
fn parse_response<T: DeserializeOwned>(method: &str, body: serde_json::Value) -> Result<T> {
    let status: SlackResponse = serde_json::from_value(body.clone())
        .map_err(|e| Error::Channel(format!("Failed to parse Slack response: {}", e)))?;

    if !status.ok {
        return Err(Error::Channel(format!(
            "Slack API error ({}): {}",
            method,
            status.error.unwrap_or_else(|| "unknown".to_string())
        )));
    }

    serde_json::from_value(body)
        .map_err(|e| Error::Channel(format!("Failed to parse Slack {} response: {}", method, e)))
}

/// Bot-token client for the Slack Web API.
pub struct SlackClient {
    client: Client,
    token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, SLACK_API_BASE)
    }

    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &SlackConfig) -> Self {
        Self::with_api_base(&config.bot_token, &config.api_base)
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(method, "Slack API GET");
        let response = self
            .client
            .get(self.url(method))
            .header("Authorization", format!("Bearer {}", self.token))
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Slack request failed: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Channel(format!("Failed to parse Slack response: {}", e)))?;

        parse_response(method, body)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &B,
    ) -> Result<T> {
        debug!(method, "Slack API POST");
        let response = self
            .client
            .post(self.url(method))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Slack request failed: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Channel(format!("Failed to parse Slack response: {}", e)))?;

        parse_response(method, body)
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn conversation_replies(
        &self,
        channel: &str,
        thread_ts: &str,
        limit: u32,
    ) -> Result<Vec<SlackMessage>> {
        let body: MessagesResponse = self
            .get(
                "conversations.replies",
                &[
                    ("channel", channel.to_string()),
                    ("ts", thread_ts.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        body.messages
            .ok_or_else(|| Error::Channel("No messages found in thread".to_string()))
    }

    async fn conversation_history(&self, channel: &str, limit: u32) -> Result<Vec<SlackMessage>> {
        let body: MessagesResponse = self
            .get(
                "conversations.history",
                &[("channel", channel.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(body.messages.unwrap_or_default())
    }

    async fn list_channels_page(
        &self,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<SlackChannelInfo>> {
        let mut query = vec![
            ("types", "public_channel,private_channel".to_string()),
            ("exclude_archived", "true".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let body: ChannelsResponse = self.get("conversations.list", &query).await?;
        Ok(Page {
            items: body.channels,
            next_cursor: next_cursor(body.response_metadata),
        })
    }

    async fn list_users_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<SlackUser>> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let body: UsersResponse = self.get("users.list", &query).await?;
        Ok(Page {
            items: body.members,
            next_cursor: next_cursor(body.response_metadata),
        })
    }

    async fn bot_user_id(&self) -> Result<String> {
        let body: AuthTestResponse = self.post("auth.test", &serde_json::json!({})).await?;
        body.user_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Channel("auth.test returned no user_id".to_string()))
    }

    async fn set_assistant_status(
        &self,
        channel: &str,
        thread_ts: &str,
        status: &str,
    ) -> Result<()> {
        let _: SlackResponse = self
            .post(
                "assistant.threads.setStatus",
                &serde_json::json!({
                    "channel_id": channel,
                    "thread_ts": thread_ts,
                    "status": status,
                }),
            )
            .await?;
        Ok(())
    }

    async fn set_suggested_prompts(
        &self,
        channel: &str,
        thread_ts: &str,
        prompts: &[SuggestedPrompt],
    ) -> Result<()> {
        let _: SlackResponse = self
            .post(
                "assistant.threads.setSuggestedPrompts",
                &serde_json::json!({
                    "channel_id": channel,
                    "thread_ts": thread_ts,
                    "prompts": prompts,
                }),
            )
            .await?;
        Ok(())
    }

    async fn post_message(&self, message: &PostMessage) -> Result<String> {
        let body: PostMessageResponse = self.post("chat.postMessage", message).await?;
        Ok(body.ts.unwrap_or_default())
    }

    async fn update_message(&self, channel: &str, ts: &str, text: &str) -> Result<()> {
        let _: SlackResponse = self
            .post(
                "chat.update",
                &serde_json::json!({
                    "channel": channel,
                    "ts": ts,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }
}
