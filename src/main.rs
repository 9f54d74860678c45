use anyhow::Result;
use log::{info, warn};

use glesdemo::{config::AppConfig, host::SurfaceHost, utils::init_logging};

fn load_config() -> (AppConfig, Option<String>) {
    let loaded = AppConfig::default_path().and_then(|path| AppConfig::load_or_create(&path));
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e.to_string())),
    }
}

fn main() -> Result<()> {
    let (config, config_error) = load_config();
    init_logging(&config.logging)?;

    // The logger is only up once the config has told us its level.
    if let Some(e) = config_error {
        warn!("using default config: {e}");
    }
    info!("Initializing application...");

    SurfaceHost::run(config)
}
