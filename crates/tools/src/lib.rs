pub mod registry;
pub mod slack;
pub mod status;
pub mod weather;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::Value;
use slackmate_channels::SlackApi;
use slackmate_core::{Error, Result};
use std::sync::Arc;

pub use registry::ToolRegistry;
pub use status::{NoopStatus, StatusSink};
pub use weather::{OpenMeteoClient, WeatherProvider};
pub use web::{ExaSearch, SearchProvider};

/// Truncate a string to at most `max_chars` characters, respecting UTF-8 char boundaries.
pub fn safe_truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Collaborators a tool may call while executing. Tools never hold state of their own.
#[derive(Clone)]
pub struct ToolContext {
    pub slack: Arc<dyn SlackApi>,
    pub search: Arc<dyn SearchProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub status: Arc<dyn StatusSink>,
}

impl ToolContext {
    pub fn new(
        slack: Arc<dyn SlackApi>,
        search: Arc<dyn SearchProvider>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            slack,
            search,
            weather,
            status: Arc::new(NoopStatus),
        }
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }
}

pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;
    fn validate(&self, params: &Value) -> Result<()>;
    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value>;
}

pub(crate) fn require_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Validation(format!("Missing required parameter: {}", key)))
}

pub(crate) fn require_f64(params: &Value, key: &str) -> Result<f64> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| Error::Validation(format!("Missing required parameter: {} (number)", key)))
}

/// Optional string parameter. Absent and `null` both read as `None`.
pub(crate) fn optional_str<'a>(params: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(Error::Validation(format!("Parameter {} must be a string", key))),
    }
}
