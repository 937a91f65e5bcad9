use chrono::{Local, NaiveDate};
use serde_json::json;
use slackmate_core::types::{ChatMessage, ToolCallRequest};
use slackmate_core::{Config, Message, Result};
use slackmate_providers::Provider;
use slackmate_tools::{ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::context::build_messages;
use crate::mrkdwn::to_mrkdwn;

/// Model rounds allowed per reply.
pub const DEFAULT_MAX_STEPS: u32 = 10;

/// Drives the model/tool loop for one reply.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    max_steps: u32,
}

impl Generator {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        Self::new(provider, Arc::new(ToolRegistry::from_config(&config.tools)))
            .with_max_steps(config.agent.max_steps)
    }

    /// Rounds are capped at [`DEFAULT_MAX_STEPS`].
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.min(DEFAULT_MAX_STEPS);
        self
    }

    /// Produce the reply to `thread`, formatted as Slack mrkdwn.
    ///
    /// Progress is reported through `ctx.status`. An empty thread yields an
    /// empty reply without calling the model.
    pub async fn generate(&self, thread: &[Message], ctx: ToolContext) -> Result<String> {
        self.generate_on(thread, ctx, Local::now().date_naive()).await
    }

    pub async fn generate_on(
        &self,
        thread: &[Message],
        ctx: ToolContext,
        today: NaiveDate,
    ) -> Result<String> {
        if thread.is_empty() {
            debug!("Empty thread, nothing to answer");
            return Ok(String::new());
        }

        let tools = self.registry.get_tool_schemas();
        let mut messages = build_messages(thread, today);
        let mut last_text = String::new();

        for step in 0..self.max_steps {
            debug!(step, "LLM call step");
            let response = self.provider.chat(&messages, &tools).await?;

            info!(
                step,
                content_len = response.content.as_ref().map(|c| c.len()).unwrap_or(0),
                tool_calls_count = response.tool_calls.len(),
                finish_reason = %response.finish_reason,
                "LLM response received"
            );

            if let Some(text) = response.content.as_deref().filter(|t| !t.is_empty()) {
                last_text = text.to_string();
            }

            if response.tool_calls.is_empty() {
                let final_text = response.content.unwrap_or_default();
                return Ok(to_mrkdwn(&final_text));
            }

            let mut assistant_msg = ChatMessage::assistant(response.content.as_deref().unwrap_or(""));
            assistant_msg.tool_calls = Some(response.tool_calls.clone());
            messages.push(assistant_msg);

            for tool_call in &response.tool_calls {
                let result = self.execute_tool_call(tool_call, &ctx).await?;
                let mut tool_msg = ChatMessage::tool_result(&tool_call.id, &result);
                tool_msg.name = Some(tool_call.name.clone());
                messages.push(tool_msg);
            }
        }

        warn!(max_steps = self.max_steps, "Reached max steps");
        Ok(to_mrkdwn(&last_text))
    }

    /// Run one tool call. Errors the model can correct come back as an
    /// `{"error": ...}` result; anything else aborts the reply.
    async fn execute_tool_call(&self, tool_call: &ToolCallRequest, ctx: &ToolContext) -> Result<String> {
        info!(tool = %tool_call.name, id = %tool_call.id, "Executing tool call");
        match self
            .registry
            .execute(&tool_call.name, ctx.clone(), tool_call.arguments.clone())
            .await
        {
            Ok(value) => Ok(value.to_string()),
            Err(e) if e.is_recoverable_by_model() => {
                warn!(tool = %tool_call.name, error = %e, "Tool call rejected, returning error to model");
                Ok(json!({ "error": e.to_string() }).to_string())
            }
            Err(e) => {
                error!(tool = %tool_call.name, error = %e, "Tool call failed");
                Err(e)
            }
        }
    }
}
