use async_trait::async_trait;
use serde_json::{json, Value};
use slackmate_channels::directory::{filter_channels, filter_users, list_all_channels, list_all_users};
use slackmate_core::{Error, Result};

use crate::{optional_str, require_str, Tool, ToolContext, ToolSchema};

pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

fn history_limit(params: &Value) -> Result<u32> {
    match params.get("limit") {
        None | Some(Value::Null) => Ok(DEFAULT_HISTORY_LIMIT),
        Some(v) => {
            let n = v
                .as_f64()
                .ok_or_else(|| Error::Validation("Parameter limit must be a number".to_string()))?;
            if n < 1.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                return Err(Error::Validation(
                    "Parameter limit must be a positive integer".to_string(),
                ));
            }
            Ok(n as u32)
        }
    }
}

fn filter_suffix(filter: Option<&str>) -> String {
    match filter {
        Some(f) if !f.is_empty() => format!(" matching \"{}\"", f),
        _ => String::new(),
    }
}

// ============ getChannelMessages ============

pub struct GetChannelMessagesTool;

#[async_trait]
impl Tool for GetChannelMessagesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "getChannelMessages",
            description: "Get messages from a channel by channel ID. Optionally specify a limit to the number of messages returned. Use this when you need to get a list of messages from a channel.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "channelId": { "type": "string" },
                    "limit": { "type": "number", "default": DEFAULT_HISTORY_LIMIT }
                },
                "required": ["channelId"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        require_str(params, "channelId")?;
        history_limit(params)?;
        Ok(())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let channel_id = require_str(&params, "channelId")?;
        let limit = history_limit(&params)?;

        ctx.status
            .set_status(&format!("Getting {} messages from channel {}", limit, channel_id))
            .await;

        let messages = ctx.slack.conversation_history(channel_id, limit).await?;
        let out: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "content": m.text, "authorId": m.user }))
            .collect();
        Ok(Value::Array(out))
    }
}

// ============ listChannels ============

pub struct ListChannelsTool;

#[async_trait]
impl Tool for ListChannelsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "listChannels",
            description: "List Slack channels, optionally filtered by name. Use this when you need to find a channel ID or verify a channel exists.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "nameFilter": {
                        "type": "string",
                        "description": "Optional name filter to search for specific channels"
                    }
                }
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        optional_str(params, "nameFilter")?;
        Ok(())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let filter = optional_str(&params, "nameFilter")?;

        ctx.status
            .set_status(&format!("is listing channels{}...", filter_suffix(filter)))
            .await;

        let channels = filter_channels(list_all_channels(ctx.slack.as_ref()).await?, filter);
        let total = channels.len();
        let channels: Vec<Value> = channels
            .into_iter()
            .map(|c| json!({ "id": c.id, "name": c.name, "isPrivate": c.is_private }))
            .collect();

        Ok(json!({ "channels": channels, "total": total }))
    }
}

// ============ listUsers ============

pub struct ListUsersTool;

#[async_trait]
impl Tool for ListUsersTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "listUsers",
            description: "List Slack users, optionally filtered by name. Use this when you need to find a user ID or verify a user exists.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "nameFilter": {
                        "type": "string",
                        "description": "Optional name filter to search for specific users"
                    }
                }
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        optional_str(params, "nameFilter")?;
        Ok(())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let filter = optional_str(&params, "nameFilter")?;

        ctx.status
            .set_status(&format!("is listing users{}...", filter_suffix(filter)))
            .await;

        let users = filter_users(list_all_users(ctx.slack.as_ref()).await?, filter);
        let total = users.len();
        let users: Vec<Value> = users
            .into_iter()
            .map(|u| {
                json!({
                    "id": u.id,
                    "name": u.name,
                    "realName": u.display_real_name(),
                    "isBot": u.is_bot,
                })
            })
            .collect();

        Ok(json!({ "users": users, "total": total }))
    }
}
