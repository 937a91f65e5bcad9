use slackmate_core::config::ProviderConfig;
use slackmate_core::Config;
use std::time::Duration;

use crate::client::build_http_client;
use crate::{AnthropicProvider, OpenAIProvider, Provider};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Default base URL for OpenAI-compatible providers.
fn default_api_base(provider_name: &str) -> &'static str {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        _ => "https://api.openai.com/v1",
    }
}

/// Infer the provider from a model id prefix. `None` means the prefix is not recognised.
pub fn infer_provider_from_model(model: &str) -> Option<&'static str> {
    if model.starts_with("anthropic/") || model.starts_with("claude-") {
        Some("anthropic")
    } else if model.starts_with("openai/")
        || model.starts_with("gpt-")
        || model.starts_with("o1")
        || model.starts_with("o3")
    {
        Some("openai")
    } else if model.starts_with("openrouter/") {
        Some("openrouter")
    } else if model.starts_with("deepseek") {
        Some("deepseek")
    } else if model.starts_with("groq/") {
        Some("groq")
    } else {
        None
    }
}

/// First provider, in priority order, that has an API key.
fn fallback_provider_name(config: &Config) -> Option<&'static str> {
    ["anthropic", "openai", "openrouter", "deepseek", "groq"]
        .into_iter()
        .find(|name| {
            config
                .providers
                .get(*name)
                .is_some_and(|p| !p.api_key.is_empty())
        })
}

/// Build the model client.
///
/// Resolution order:
/// 1. `explicit_provider` (from `agent.provider`)
/// 2. model id prefix (`claude-...` → anthropic, `gpt-...` → openai)
/// 3. the first provider in config with an API key
///
/// An explicit provider must have an API key configured.
pub fn create_provider(
    config: &Config,
    model: &str,
    explicit_provider: Option<&str>,
) -> anyhow::Result<Box<dyn Provider>> {
    let max_tokens = config.agent.max_tokens;
    let temperature = config.agent.temperature;

    let effective_provider: &str = if let Some(ep) = explicit_provider {
        ep
    } else if let Some(inferred) = infer_provider_from_model(model) {
        inferred
    } else if let Some(fallback) = fallback_provider_name(config) {
        fallback
    } else {
        return Err(anyhow::anyhow!(
            "No LLM provider configured. Set 'agent.provider', use a recognized model prefix \
             (e.g. 'claude-...', 'gpt-4o'), or add an API key to the providers section."
        ));
    };

    let provider_cfg = config.providers.get(effective_provider);

    if explicit_provider.is_some() {
        match provider_cfg {
            None => {
                return Err(anyhow::anyhow!(
                    "Provider '{}' is explicitly configured but not found in providers section",
                    effective_provider
                ));
            }
            Some(cfg) if cfg.api_key.is_empty() => {
                return Err(anyhow::anyhow!(
                    "Provider '{}' is explicitly configured but has no API key",
                    effective_provider
                ));
            }
            _ => {}
        }
    }

    let empty_cfg = ProviderConfig::default();
    let resolved_cfg = provider_cfg.unwrap_or(&empty_cfg);
    let client = build_http_client(resolved_cfg.proxy.as_deref(), PROVIDER_TIMEOUT);

    match effective_provider {
        "anthropic" => Ok(Box::new(AnthropicProvider::with_client(
            client,
            &resolved_cfg.api_key,
            resolved_cfg.api_base.as_deref(),
            model,
            max_tokens,
            temperature,
        )) as Box<dyn Provider>),
        _ => {
            let api_base = resolved_cfg
                .api_base
                .as_deref()
                .unwrap_or_else(|| default_api_base(effective_provider));
            Ok(Box::new(OpenAIProvider::with_client(
                client,
                &resolved_cfg.api_key,
                Some(api_base),
                model,
                max_tokens,
                temperature,
            )) as Box<dyn Provider>)
        }
    }
}

/// Provider for the configured `agent.model` / `agent.provider`.
pub fn create_main_provider(config: &Config) -> anyhow::Result<Box<dyn Provider>> {
    create_provider(config, &config.agent.model, config.agent.provider.as_deref())
}
