use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
    /// HTTP(S) proxy for this provider. Empty string forces a direct connection.
    #[serde(default)]
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Signing secret used to authenticate Events API requests.
    #[serde(default)]
    pub signing_secret: String,
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
    /// Replay window for request timestamps, in seconds.
    #[serde(default = "default_timestamp_tolerance")]
    pub timestamp_tolerance_secs: u64,
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_timestamp_tolerance() -> u64 {
    300
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            signing_secret: String::new(),
            api_base: default_slack_api_base(),
            timestamp_tolerance_secs: default_timestamp_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Explicit provider name. Inferred from the model prefix when absent.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on model rounds per reply.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20240620".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_steps() -> u32 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_search_api_base")]
    pub api_base: String,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    /// Characters of page text kept per result.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

fn default_search_api_base() -> String {
    "https://api.exa.ai".to_string()
}

fn default_num_results() -> u32 {
    3
}

fn default_snippet_chars() -> usize {
    1000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_search_api_base(),
            num_results: default_num_results(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConfig {
    #[serde(default = "default_weather_api_base")]
    pub api_base: String,
}

fn default_weather_api_base() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base: default_weather_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolsConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), ProviderConfig::default());
        providers.insert("openai".to_string(), ProviderConfig::default());

        Self {
            slack: SlackConfig::default(),
            providers,
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Environment variables that override values from the config file.
const ENV_OVERRIDES: &[&str] = &[
    "SLACK_BOT_TOKEN",
    "SLACK_SIGNING_SECRET",
    "EXA_API_KEY",
    "ANTHROPIC_API_KEY",
    "OPENAI_API_KEY",
    "SLACKMATE_MODEL",
];

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ENV_OVERRIDES {
            let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            debug!(key, "Applying environment override");
            match *key {
                "SLACK_BOT_TOKEN" => self.slack.bot_token = value,
                "SLACK_SIGNING_SECRET" => self.slack.signing_secret = value,
                "EXA_API_KEY" => self.tools.search.api_key = value,
                "ANTHROPIC_API_KEY" => self.provider_entry("anthropic").api_key = value,
                "OPENAI_API_KEY" => self.provider_entry("openai").api_key = value,
                "SLACKMATE_MODEL" => self.agent.model = value,
                _ => {}
            }
        }
    }

    fn provider_entry(&mut self, name: &str) -> &mut ProviderConfig {
        self.providers.entry(name.to_string()).or_default()
    }

    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Names of settings the webhook gateway cannot run without.
    pub fn missing_gateway_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.slack.bot_token.trim().is_empty() {
            missing.push("slack.botToken");
        }
        if self.slack.signing_secret.trim().is_empty() {
            missing.push("slack.signingSecret");
        }
        missing
    }

    /// Copy of the config with every secret masked, for display.
    pub fn redacted(&self) -> Config {
        let mut cfg = self.clone();
        cfg.slack.bot_token = mask(&cfg.slack.bot_token);
        cfg.slack.signing_secret = mask(&cfg.slack.signing_secret);
        cfg.tools.search.api_key = mask(&cfg.tools.search.api_key);
        for provider in cfg.providers.values_mut() {
            provider.api_key = mask(&provider.api_key);
        }
        cfg
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}
