use std::collections::HashMap;
use std::sync::Arc;
use serde_json::{json, Value};
use slackmate_core::config::ToolsConfig;
use slackmate_core::{Error, Result};
use tracing::{debug, warn};

use crate::{Tool, ToolContext};
use crate::slack::{GetChannelMessagesTool, ListChannelsTool, ListUsersTool};
use crate::weather::GetWeatherTool;
use crate::web::SearchWebTool;

/// Tool catalog. Schemas are reported in registration order.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::from_config(&ToolsConfig::default())
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(GetWeatherTool));
        registry.register(Arc::new(SearchWebTool::new(config.search.snippet_chars)));

        // Slack workspace lookups
        registry.register(Arc::new(GetChannelMessagesTool));
        registry.register(Arc::new(ListChannelsTool));
        registry.register(Arc::new(ListUsersTool));

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        debug!(name = schema.name, "Registering tool");
        let name = schema.name.to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn get_tool_schemas(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                let schema = tool.schema();
                json!({
                    "type": "function",
                    "function": {
                        "name": schema.name,
                        "description": schema.description,
                        "parameters": schema.parameters
                    }
                })
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub async fn execute(&self, name: &str, ctx: ToolContext, params: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| {
            Error::Validation(format!("Unknown tool: {}", name))
        })?;

        if let Err(e) = tool.validate(&params) {
            warn!(tool = name, error = %e, "Tool validation failed");
            return Err(e);
        }

        debug!(tool = name, "Executing tool");
        tool.execute(ctx, params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
