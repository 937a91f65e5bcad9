use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use slackmate_core::types::{ChatMessage, LLMResponse, ToolCallRequest};
use slackmate_core::{Error, Result};
use tracing::{debug, error, info};

use crate::Provider;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicProvider {
    pub fn new(
        api_key: &str,
        api_base: Option<&str>,
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self::with_client(Client::new(), api_key, api_base, model, max_tokens, temperature)
    }

    pub fn with_client(
        client: Client,
        api_key: &str,
        api_base: Option<&str>,
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base
                .unwrap_or(ANTHROPIC_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            max_tokens,
            temperature,
        }
    }

    /// Convert OpenAI-style tool schemas to Anthropic tool format.
    /// OpenAI: { type: "function", function: { name, description, parameters } }
    /// Anthropic: { name, description, input_schema }
    fn convert_tools(tools: &[Value]) -> Vec<Value> {
        tools
            .iter()
            .filter_map(|tool| {
                let func = tool.get("function")?;
                let name = func.get("name")?.as_str()?;
                let description = func.get("description").and_then(|v| v.as_str()).unwrap_or("");
                let parameters = func.get("parameters").cloned().unwrap_or(json!({
                    "type": "object",
                    "properties": {}
                }));

                Some(json!({
                    "name": name,
                    "description": description,
                    "input_schema": parameters,
                }))
            })
            .collect()
    }

    /// Split out the system prompt and map the rest onto user/assistant turns.
    /// Tool results travel as `tool_result` blocks inside a user turn.
    fn convert_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_text: Option<String> = None;
        let mut converted: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => {
                    system_text = Some(match system_text {
                        Some(existing) => format!("{}\n\n{}", existing, msg.content),
                        None => msg.content.clone(),
                    });
                }
                "assistant" => {
                    let mut blocks: Vec<Value> = Vec::new();
                    if !msg.content.is_empty() {
                        blocks.push(json!({ "type": "text", "text": msg.content }));
                    }
                    for tc in msg.tool_calls.iter().flatten() {
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": tc.id,
                            "name": tc.name,
                            "input": tc.arguments,
                        }));
                    }
                    if blocks.is_empty() {
                        blocks.push(json!({ "type": "text", "text": "" }));
                    }
                    converted.push(json!({ "role": "assistant", "content": blocks }));
                }
                "tool" => {
                    converted.push(json!({
                        "role": "user",
                        "content": [{
                            "type": "tool_result",
                            "tool_use_id": msg.tool_call_id.as_deref().unwrap_or(""),
                            "content": msg.content,
                        }],
                    }));
                }
                _ => {
                    converted.push(json!({ "role": "user", "content": msg.content }));
                }
            }
        }

        (system_text, Self::merge_consecutive_roles(converted))
    }

    /// Merge consecutive messages with the same role (Anthropic requirement).
    fn merge_consecutive_roles(messages: Vec<Value>) -> Vec<Value> {
        let mut result: Vec<Value> = Vec::new();

        for msg in messages {
            let role = msg.get("role").and_then(|v| v.as_str()).unwrap_or("");
            let same_role = result
                .last()
                .and_then(|v| v.get("role"))
                .and_then(|v| v.as_str())
                == Some(role);

            if same_role {
                if let Some(last) = result.last_mut() {
                    let last_content = last.get("content").cloned().unwrap_or(Value::Null);
                    let new_content = msg.get("content").cloned().unwrap_or(Value::Null);
                    last["content"] = merge_content(last_content, new_content);
                    continue;
                }
            }
            result.push(msg);
        }

        result
    }

    /// Config may store "anthropic/claude-..." but the API expects the bare id.
    fn normalize_model(model: &str) -> &str {
        model.strip_prefix("anthropic/").unwrap_or(model)
    }

    fn parse_response(raw_body: &str) -> Result<LLMResponse> {
        let resp: AnthropicResponse = serde_json::from_str(raw_body).map_err(|e| {
            Error::Provider(format!(
                "Failed to parse Anthropic response: {}. Body: {}",
                e,
                raw_body.chars().take(500).collect::<String>()
            ))
        })?;

        let mut text_parts: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCallRequest> = Vec::new();

        for block in resp.content {
            match block.block_type.as_str() {
                "text" => {
                    if let Some(text) = block.text.filter(|t| !t.is_empty()) {
                        text_parts.push(text);
                    }
                }
                "tool_use" => {
                    if let (Some(id), Some(name)) = (block.id, block.name) {
                        tool_calls.push(ToolCallRequest {
                            id,
                            name,
                            arguments: block.input.unwrap_or_else(|| json!({})),
                        });
                    }
                }
                _ => {}
            }
        }

        let finish_reason = match resp.stop_reason.as_deref() {
            Some("end_turn") | None => "stop".to_string(),
            Some("tool_use") => "tool_calls".to_string(),
            Some("max_tokens") => "length".to_string(),
            Some(other) => other.to_string(),
        };

        Ok(LLMResponse {
            content: (!text_parts.is_empty()).then(|| text_parts.join("\n")),
            tool_calls,
            finish_reason,
            usage: json!({
                "prompt_tokens": resp.usage.as_ref().and_then(|u| u.input_tokens),
                "completion_tokens": resp.usage.as_ref().and_then(|u| u.output_tokens),
            }),
        })
    }
}

fn merge_content(existing: Value, new: Value) -> Value {
    match (existing, new) {
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        (Value::Array(mut a), Value::String(s)) => {
            a.push(json!({"type": "text", "text": s}));
            Value::Array(a)
        }
        (Value::String(s1), Value::String(s2)) => Value::String(format!("{}\n\n{}", s1, s2)),
        (Value::String(s), Value::Array(a)) => {
            let mut blocks = vec![json!({"type": "text", "text": s})];
            blocks.extend(a);
            Value::Array(blocks)
        }
        (existing, _) => existing,
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn chat(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<LLMResponse> {
        let url = format!("{}/messages", self.api_base);
        let model = Self::normalize_model(&self.model);

        let (system, anthropic_messages) = Self::convert_messages(messages);
        let anthropic_tools = Self::convert_tools(tools);

        let mut request = json!({
            "model": model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": anthropic_messages,
        });
        if let Some(sys) = system {
            request["system"] = Value::String(sys);
        }
        if !anthropic_tools.is_empty() {
            request["tools"] = Value::Array(anthropic_tools);
        }

        info!(
            model = %model,
            tools_count = tools.len(),
            messages_count = messages.len(),
            "Calling Anthropic API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        let raw_body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(status = %status, body = %raw_body, "Anthropic API error");
            return Err(Error::Provider(format!(
                "Anthropic API error {}: {}",
                status, raw_body
            )));
        }

        debug!(body_len = raw_body.len(), "Anthropic raw response");
        let parsed = Self::parse_response(&raw_body)?;

        info!(
            content_len = parsed.content.as_ref().map(|c| c.len()).unwrap_or(0),
            tool_calls_count = parsed.tool_calls.len(),
            finish_reason = %parsed.finish_reason,
            "Anthropic response parsed"
        );
        Ok(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_tools() {
        let tools = vec![json!({
            "type": "function",
            "function": {
                "name": "getWeather",
                "description": "Get the current weather at a location",
                "parameters": {
                    "type": "object",
                    "properties": { "city": {"type": "string"} },
                    "required": ["city"]
                }
            }
        })];

        let converted = AnthropicProvider::convert_tools(&tools);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0]["name"], "getWeather");
        assert!(converted[0]["input_schema"].is_object());
    }

    #[test]
    fn test_convert_messages_system_extraction() {
        let messages = vec![ChatMessage::system("You are a Slack bot"), ChatMessage::user("Hello")];

        let (system, msgs) = AnthropicProvider::convert_messages(&messages);
        assert_eq!(system, Some("You are a Slack bot".to_string()));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0]["role"], "user");
    }

    #[test]
    fn test_convert_messages_tool_results_merge() {
        let mut assistant = ChatMessage::assistant("");
        assistant.tool_calls = Some(vec![
            ToolCallRequest {
                id: "tc_1".to_string(),
                name: "listChannels".to_string(),
                arguments: json!({}),
            },
            ToolCallRequest {
                id: "tc_2".to_string(),
                name: "listUsers".to_string(),
                arguments: json!({"nameFilter": "ada"}),
            },
        ]);

        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("who is in #eng?"),
            assistant,
            ChatMessage::tool_result("tc_1", "{\"channels\":[]}"),
            ChatMessage::tool_result("tc_2", "{\"users\":[]}"),
        ];

        let (_, msgs) = AnthropicProvider::convert_messages(&messages);
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1]["content"][0]["type"], "tool_use");
        assert_eq!(msgs[1]["content"][1]["name"], "listUsers");
        let results = msgs[2]["content"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["tool_use_id"], "tc_1");
        assert_eq!(results[1]["tool_use_id"], "tc_2");
    }

    #[test]
    fn test_normalize_model() {
        assert_eq!(
            AnthropicProvider::normalize_model("anthropic/claude-3-5-sonnet-20240620"),
            "claude-3-5-sonnet-20240620"
        );
        assert_eq!(
            AnthropicProvider::normalize_model("claude-3-opus-20240229"),
            "claude-3-opus-20240229"
        );
    }

    #[test]
    fn test_parse_response() {
        let raw = r#"{
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me check the weather."},
                {"type": "tool_use", "id": "toolu_1", "name": "getWeather", "input": {"city": "London", "latitude": 51.5, "longitude": -0.12}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 100, "output_tokens": 50}
        }"#;

        let resp = AnthropicProvider::parse_response(raw).unwrap();
        assert_eq!(resp.content.as_deref(), Some("Let me check the weather."));
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].arguments["city"], "London");
        assert_eq!(resp.finish_reason, "tool_calls");
        assert_eq!(resp.usage["prompt_tokens"], 100);
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let err = AnthropicProvider::parse_response("<html>").unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[test]
    fn test_merge_consecutive_roles() {
        let messages = vec![
            json!({"role": "user", "content": "hello"}),
            json!({"role": "user", "content": "world"}),
            json!({"role": "assistant", "content": "hi"}),
        ];

        let merged = AnthropicProvider::merge_consecutive_roles(messages);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["content"], "hello\n\nworld");
        assert_eq!(merged[1]["role"], "assistant");
    }
}
