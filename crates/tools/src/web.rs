use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use slackmate_core::config::SearchConfig;
use slackmate_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

use crate::{optional_str, require_str, safe_truncate, Tool, ToolContext, ToolSchema};

pub const DEFAULT_SNIPPET_CHARS: usize = 1000;
/// Results handed back to the model, whatever the provider returns.
pub const MAX_RESULTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search and return page contents, optionally restricted to one domain.
    async fn search(&self, query: &str, domain: Option<&str>) -> Result<Vec<SearchHit>>;
}

/// Exa search-and-contents client.
pub struct ExaSearch {
    client: Client,
    api_key: String,
    api_base: String,
    num_results: u32,
}

impl ExaSearch {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, num_results: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            num_results,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(&config.api_key, &config.api_base, config.num_results)
    }

    fn request_body(&self, query: &str, domain: Option<&str>) -> Value {
        let mut body = json!({
            "query": query,
            "numResults": self.num_results,
            "contents": {
                "text": true,
                "livecrawl": "always"
            }
        });
        if let Some(domain) = domain {
            body["includeDomains"] = json!([domain]);
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[async_trait]
impl SearchProvider for ExaSearch {
    async fn search(&self, query: &str, domain: Option<&str>) -> Result<Vec<SearchHit>> {
        if self.api_key.is_empty() {
            return Err(Error::Tool(
                "Search API key not configured (tools.search.apiKey or EXA_API_KEY)".to_string(),
            ));
        }

        debug!(query, domain = ?domain, "Exa search");
        let response = self
            .client
            .post(format!("{}/search", self.api_base))
            .header("x-api-key", &self.api_key)
            .json(&self.request_body(query, domain))
            .send()
            .await
            .map_err(|e| Error::Tool(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Tool(format!(
                "Search API returned HTTP {}: {}",
                status,
                safe_truncate(&text, 200)
            )));
        }

        let body: ExaResponse = response
            .json()
            .await
            .map_err(|e| Error::Tool(format!("Failed to parse search response: {}", e)))?;
        Ok(body.results)
    }
}

// ============ searchWeb ============

pub struct SearchWebTool {
    snippet_chars: usize,
}

impl SearchWebTool {
    pub fn new(snippet_chars: usize) -> Self {
        Self { snippet_chars }
    }
}

impl Default for SearchWebTool {
    fn default() -> Self {
        Self::new(DEFAULT_SNIPPET_CHARS)
    }
}

#[async_trait]
impl Tool for SearchWebTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "searchWeb",
            description: "Use this to search the web for information",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "specificDomain": {
                        "type": ["string", "null"],
                        "description": "a domain to search if the user specifies e.g. bbc.com. Should be only the domain name without the protocol"
                    }
                },
                "required": ["query", "specificDomain"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        require_str(params, "query")?;
        optional_str(params, "specificDomain")?;
        Ok(())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let query = require_str(&params, "query")?;
        let domain = optional_str(&params, "specificDomain")?.filter(|d| !d.is_empty());

        ctx.status
            .set_status(&format!("is searching the web for {}...", query))
            .await;

        let hits = ctx.search.search(query, domain).await?;
        let results: Vec<Value> = hits
            .iter()
            .take(MAX_RESULTS)
            .map(|hit| {
                json!({
                    "title": hit.title,
                    "url": hit.url,
                    "snippet": safe_truncate(hit.text.as_deref().unwrap_or(""), self.snippet_chars),
                })
            })
            .collect();

        Ok(json!({ "results": results }))
    }
}
