//! Hand-written fakes for the tool collaborators.

use async_trait::async_trait;
use slackmate_channels::slack::{
    Page, PostMessage, SlackApi, SlackChannelInfo, SlackMessage, SlackUser, SuggestedPrompt,
};
use slackmate_core::{Error, Result};
use std::sync::{Arc, Mutex};

use crate::weather::CurrentWeather;
use crate::web::SearchHit;
use crate::{SearchProvider, StatusSink, ToolContext, WeatherProvider};

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

pub struct FakeWeather(pub CurrentWeather);

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, _latitude: f64, _longitude: f64) -> Result<CurrentWeather> {
        Ok(self.0.clone())
    }
}

pub struct FakeSearch {
    hits: Vec<SearchHit>,
    last_domain: Mutex<Option<String>>,
}

impl FakeSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            last_domain: Mutex::new(None),
        }
    }

    pub fn last_domain(&self) -> Option<String> {
        self.last_domain.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _query: &str, domain: Option<&str>) -> Result<Vec<SearchHit>> {
        *self.last_domain.lock().unwrap() = domain.map(str::to_string);
        Ok(self.hits.clone())
    }
}

/// Slack fake serving listing pages by index; the cursor is the next page number.
#[derive(Default)]
pub struct FakeSlack {
    pub history: Vec<SlackMessage>,
    pub channel_pages: Vec<Vec<SlackChannelInfo>>,
    pub user_pages: Vec<Vec<SlackUser>>,
    pub fail_listing: bool,
    pub history_calls: Mutex<Vec<(String, u32)>>,
    pub page_limits: Mutex<Vec<u32>>,
}

impl FakeSlack {
    pub fn history_calls(&self) -> Vec<(String, u32)> {
        self.history_calls.lock().unwrap().clone()
    }

    pub fn page_limits(&self) -> Vec<u32> {
        self.page_limits.lock().unwrap().clone()
    }

    fn page<T: Clone>(&self, pages: &[Vec<T>], cursor: Option<&str>, limit: u32) -> Result<Page<T>> {
        if self.fail_listing {
            return Err(Error::Channel("Slack API error: ratelimited".to_string()));
        }
        self.page_limits.lock().unwrap().push(limit);
        let index: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let items = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Ok(Page { items, next_cursor })
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn conversation_replies(&self, _: &str, _: &str, _: u32) -> Result<Vec<SlackMessage>> {
        Ok(Vec::new())
    }

    async fn conversation_history(&self, channel: &str, limit: u32) -> Result<Vec<SlackMessage>> {
        self.history_calls
            .lock()
            .unwrap()
            .push((channel.to_string(), limit));
        Ok(self.history.clone())
    }

    async fn list_channels_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<SlackChannelInfo>> {
        self.page(&self.channel_pages, cursor, limit)
    }

    async fn list_users_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<SlackUser>> {
        self.page(&self.user_pages, cursor, limit)
    }

    async fn bot_user_id(&self) -> Result<String> {
        Ok("UBOT".to_string())
    }

    async fn set_assistant_status(&self, _: &str, _: &str, _: &str) -> Result<()> {
        Ok(())
    }

    async fn set_suggested_prompts(&self, _: &str, _: &str, _: &[SuggestedPrompt]) -> Result<()> {
        Ok(())
    }

    async fn post_message(&self, _: &PostMessage) -> Result<String> {
        Ok("1.0".to_string())
    }

    async fn update_message(&self, _: &str, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
}

pub struct ContextBuilder {
    slack: Arc<dyn SlackApi>,
    search: Arc<dyn SearchProvider>,
    weather: Arc<dyn WeatherProvider>,
}

pub fn context() -> ContextBuilder {
    ContextBuilder {
        slack: Arc::new(FakeSlack::default()),
        search: Arc::new(FakeSearch::new(Vec::new())),
        weather: Arc::new(FakeWeather(CurrentWeather {
            temperature: 0.0,
            weather_code: 0,
            humidity: 0.0,
        })),
    }
}

impl ContextBuilder {
    pub fn with_slack(mut self, slack: Arc<dyn SlackApi>) -> Self {
        self.slack = slack;
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = search;
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = weather;
        self
    }

    pub fn build(self) -> ToolContext {
        ToolContext::new(self.slack, self.search, self.weather)
    }
}
