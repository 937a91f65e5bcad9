use async_trait::async_trait;
use slackmate_agent::Generator;
use slackmate_channels::SlackClient;
use slackmate_core::Message;
use slackmate_providers::create_main_provider;
use slackmate_tools::{ExaSearch, OpenMeteoClient, StatusSink, ToolContext};
use std::sync::Arc;

use super::load_config;

/// Prints tool progress to stderr so stdout carries only the answer.
struct StderrStatus;

#[async_trait]
impl StatusSink for StderrStatus {
    async fn set_status(&self, status: &str) {
        eprintln!("… {}", status);
    }
}

/// Run the generation loop once for a single question.
pub async fn run(question: &str) -> anyhow::Result<()> {
    let (_paths, config) = load_config()?;
    let provider: Arc<dyn slackmate_providers::Provider> = Arc::from(create_main_provider(&config)?);
    let generator = Generator::from_config(&config, provider);

    let search = &config.tools.search;
    let ctx = ToolContext::new(
        Arc::new(SlackClient::from_config(&config.slack)),
        Arc::new(ExaSearch::new(&search.api_key, &search.api_base, search.num_results)),
        Arc::new(OpenMeteoClient::new(&config.tools.weather.api_base)),
    )
    .with_status(Arc::new(StderrStatus));

    let answer = generator.generate(&[Message::user(question)], ctx).await?;
    println!("{}", answer);
    Ok(())
}
