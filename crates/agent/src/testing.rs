//! Hand-written fakes for the model and Slack collaborators.

use async_trait::async_trait;
use serde_json::{json, Value};
use slackmate_channels::slack::{
    Page, PostMessage, SlackApi, SlackChannelInfo, SlackMessage, SlackUser, SuggestedPrompt,
};
use slackmate_core::types::{ChatMessage, LLMResponse, ToolCallRequest};
use slackmate_core::{Error, Result};
use slackmate_providers::Provider;
use slackmate_tools::weather::CurrentWeather;
use slackmate_tools::web::SearchHit;
use slackmate_tools::{SearchProvider, StatusSink, ToolContext, WeatherProvider};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

pub fn calls_tools(content: Option<&str>, calls: Vec<ToolCallRequest>) -> LLMResponse {
    LLMResponse {
        content: content.map(str::to_string),
        tool_calls: calls,
        finish_reason: "tool_calls".to_string(),
        usage: Value::Null,
    }
}

/// Replays queued responses; once the queue is drained the last one repeats.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<LLMResponse>>,
    last: Mutex<Option<LLMResponse>>,
    fail: bool,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LLMResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            last: Mutex::new(None),
            fail: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Messages submitted on the `n`th call.
    pub fn messages(&self, n: usize) -> Vec<ChatMessage> {
        self.seen.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, messages: &[ChatMessage], _tools: &[Value]) -> Result<LLMResponse> {
        self.seen.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(Error::Provider("API error 529: overloaded".to_string()));
        }
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(response) = next {
            *last = Some(response);
        }
        Ok(last.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlackCall {
    Post {
        channel: String,
        text: String,
        thread_ts: Option<String>,
        unfurl_links: Option<bool>,
    },
    Update {
        channel: String,
        ts: String,
        text: String,
    },
    Status {
        channel: String,
        thread_ts: String,
        status: String,
    },
    Prompts {
        channel: String,
        thread_ts: String,
        titles: Vec<String>,
    },
}

/// Slack fake that records every write in order.
#[derive(Default)]
pub struct RecordingSlack {
    pub replies: Vec<SlackMessage>,
    pub fail_writes: bool,
    pub fail_replies: bool,
    pub fail_auth: bool,
    pub calls: Mutex<Vec<SlackCall>>,
    pub reply_fetches: Mutex<Vec<(String, String)>>,
}

impl RecordingSlack {
    pub fn with_replies(replies: Vec<SlackMessage>) -> Self {
        Self {
            replies,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<SlackCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reply_fetches(&self) -> Vec<(String, String)> {
        self.reply_fetches.lock().unwrap().clone()
    }

    fn record(&self, call: SlackCall) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Channel("Slack API error: channel_not_found".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl SlackApi for RecordingSlack {
    async fn conversation_replies(&self, channel: &str, thread_ts: &str, _: u32) -> Result<Vec<SlackMessage>> {
        self.reply_fetches
            .lock()
            .unwrap()
            .push((channel.to_string(), thread_ts.to_string()));
        if self.fail_replies {
            return Err(Error::Channel("Slack API error: thread_not_found".to_string()));
        }
        Ok(self.replies.clone())
    }

    async fn conversation_history(&self, _: &str, _: u32) -> Result<Vec<SlackMessage>> {
        Ok(Vec::new())
    }

    async fn list_channels_page(&self, _: Option<&str>, _: u32) -> Result<Page<SlackChannelInfo>> {
        Ok(Page {
            items: Vec::new(),
            next_cursor: None,
        })
    }

    async fn list_users_page(&self, _: Option<&str>, _: u32) -> Result<Page<SlackUser>> {
        Ok(Page {
            items: Vec::new(),
            next_cursor: None,
        })
    }

    async fn bot_user_id(&self) -> Result<String> {
        if self.fail_auth {
            return Err(Error::Channel("Slack API error: invalid_auth".to_string()));
        }
        Ok("UBOT".to_string())
    }

    async fn set_assistant_status(&self, channel: &str, thread_ts: &str, status: &str) -> Result<()> {
        self.record(SlackCall::Status {
            channel: channel.to_string(),
            thread_ts: thread_ts.to_string(),
            status: status.to_string(),
        })
    }

    async fn set_suggested_prompts(&self, channel: &str, thread_ts: &str, prompts: &[SuggestedPrompt]) -> Result<()> {
        self.record(SlackCall::Prompts {
            channel: channel.to_string(),
            thread_ts: thread_ts.to_string(),
            titles: prompts.iter().map(|p| p.title.clone()).collect(),
        })
    }

    async fn post_message(&self, message: &PostMessage) -> Result<String> {
        self.record(SlackCall::Post {
            channel: message.channel.clone(),
            text: message.text.clone(),
            thread_ts: message.thread_ts.clone(),
            unfurl_links: message.unfurl_links,
        })?;
        Ok("100.1".to_string())
    }

    async fn update_message(&self, channel: &str, ts: &str, text: &str) -> Result<()> {
        self.record(SlackCall::Update {
            channel: channel.to_string(),
            ts: ts.to_string(),
            text: text.to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingStatus {
    seen: Mutex<Vec<String>>,
}

impl RecordingStatus {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSink for RecordingStatus {
    async fn set_status(&self, status: &str) {
        self.seen.lock().unwrap().push(status.to_string());
    }
}

pub struct SunnyWeather;

#[async_trait]
impl WeatherProvider for SunnyWeather {
    async fn current(&self, _: f64, _: f64) -> Result<CurrentWeather> {
        Ok(CurrentWeather {
            temperature: 21.5,
            weather_code: 0,
            humidity: 40.0,
        })
    }
}

pub struct BrokenSearch;

#[async_trait]
impl SearchProvider for BrokenSearch {
    async fn search(&self, _: &str, _: Option<&str>) -> Result<Vec<SearchHit>> {
        Err(Error::Tool("Exa search failed: 401 Unauthorized".to_string()))
    }
}

pub fn tool_context(slack: Arc<dyn SlackApi>) -> ToolContext {
    ToolContext::new(slack, Arc::new(BrokenSearch), Arc::new(SunnyWeather))
}

pub fn weather_args(city: &str) -> Value {
    json!({"latitude": 51.5, "longitude": -0.12, "city": city})
}
