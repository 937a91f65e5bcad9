use slackmate_core::{Config, Paths};

use super::load_config;

/// Write the default configuration to `~/.slackmate/config.json`.
pub async fn init(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();
    let path = paths.config_file();

    if path.exists() && !force {
        println!("Config already exists: {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    paths.ensure_dirs()?;
    Config::default().save(&path)?;
    println!("✓ Created config: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set slack.botToken and slack.signingSecret (or SLACK_BOT_TOKEN / SLACK_SIGNING_SECRET)");
    println!("  2. Add an API key for your model provider and tools.search.apiKey for web search");
    println!("  3. Run `slackmate serve` and point the Slack Events API at /api/events");
    Ok(())
}

/// Show the effective configuration (file plus environment) with secrets masked.
pub async fn show() -> anyhow::Result<()> {
    let (paths, config) = load_config()?;
    let json = serde_json::to_value(config.redacted())?;

    println!();
    println!("📋 Current Configuration");
    println!("  File: {}", paths.config_file().display());
    let missing = config.missing_gateway_settings();
    if !missing.is_empty() {
        println!("  Missing for `serve`: {}", missing.join(", "));
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
