pub mod anthropic;
pub mod client;
pub mod factory;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use slackmate_core::types::{ChatMessage, LLMResponse};
use slackmate_core::Result;

/// A chat model that can answer with text or request tool calls.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<LLMResponse>;
}

pub use anthropic::AnthropicProvider;
pub use factory::{create_main_provider, create_provider, infer_provider_from_model};
pub use openai::OpenAIProvider;
