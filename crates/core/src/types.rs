use serde::{Deserialize, Serialize};
use tracing::warn;

/// A tool call request that serializes to the OpenAI-compatible format:
/// `{id, type: "function", function: {name, arguments}}`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl Serialize for ToolCallRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("type", "function")?;
        map.serialize_entry("function", &serde_json::json!({
            "name": self.name,
            "arguments": self.arguments.to_string()
        }))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ToolCallRequest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let obj = value.as_object().ok_or_else(|| serde::de::Error::custom("expected object"))?;

        let id = obj.get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let func = obj.get("function").and_then(|v| v.as_object());
        let name = func
            .and_then(|f| f.get("name"))
            .or_else(|| obj.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let raw_args = func
            .and_then(|f| f.get("arguments"))
            .or_else(|| obj.get("arguments"));

        // Chat Completions sends arguments as a JSON-encoded string.
        let arguments = match raw_args {
            Some(serde_json::Value::String(s)) => serde_json::from_str(s).unwrap_or_else(|e| {
                warn!(error = %e, raw = %s, "Failed to parse tool call arguments as JSON, using empty object");
                serde_json::Value::Object(serde_json::Map::new())
            }),
            Some(v) => v.clone(),
            None => serde_json::Value::Object(serde_json::Map::new()),
        };

        Ok(ToolCallRequest { id, name, arguments })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: String,
    pub usage: serde_json::Value,
}

impl LLMResponse {
    pub fn text(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            ..Self::default()
        }
    }
}

impl Default for LLMResponse {
    fn default() -> Self {
        Self {
            content: None,
            tool_calls: Vec::new(),
            finish_reason: String::new(),
            usage: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: &str) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: &str) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::with_role("assistant", content)
    }

    pub fn tool_result(tool_call_id: &str, content: &str) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.to_string()),
            ..Self::with_role("tool", content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_serializes_openai_shape() {
        let tc = ToolCallRequest {
            id: "call_1".to_string(),
            name: "getWeather".to_string(),
            arguments: serde_json::json!({"city": "London"}),
        };
        let v = serde_json::to_value(&tc).unwrap();
        assert_eq!(v["type"], "function");
        assert_eq!(v["function"]["name"], "getWeather");
        assert_eq!(v["function"]["arguments"], r#"{"city":"London"}"#);
    }

    #[test]
    fn test_tool_call_deserializes_string_arguments() {
        let raw = r#"{"id":"c","type":"function","function":{"name":"searchWeb","arguments":"{\"query\":\"rust\"}"}}"#;
        let tc: ToolCallRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(tc.name, "searchWeb");
        assert_eq!(tc.arguments["query"], "rust");
    }

    #[test]
    fn test_tool_call_bad_arguments_become_empty_object() {
        let raw = r#"{"id":"c","function":{"name":"listUsers","arguments":"{not json"}}"#;
        let tc: ToolCallRequest = serde_json::from_str(raw).unwrap();
        assert!(tc.arguments.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_tool_result_message() {
        let m = ChatMessage::tool_result("call_9", "{}");
        assert_eq!(m.role, "tool");
        assert_eq!(m.tool_call_id.as_deref(), Some("call_9"));
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("tool_calls").is_none());
    }
}
