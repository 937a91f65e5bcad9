pub mod ask;
pub mod config_cmd;
pub mod serve;

use slackmate_core::{Config, Paths};
use tracing::debug;

/// Load `config.json`, then `.env` files, then environment overrides.
pub(crate) fn load_config() -> anyhow::Result<(Paths, Config)> {
    let paths = Paths::new();

    if dotenvy::from_path(paths.env_file()).is_ok() {
        debug!(path = %paths.env_file().display(), "Loaded env file");
    }
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded env file");
    }

    let mut config = Config::load_or_default(&paths)?;
    config.apply_env_overrides();
    Ok((paths, config))
}
