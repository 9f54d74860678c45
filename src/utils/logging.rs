use log::LevelFilter;
use simple_logger::SimpleLogger;

use crate::config::LoggingConfig;

/// Installs the global logger. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), log::SetLoggerError> {
    SimpleLogger::new()
        .with_level(config.level_filter())
        .with_module_level("winit", LevelFilter::Warn)
        .with_module_level("egui_glow", LevelFilter::Warn)
        .with_module_level("sctk", LevelFilter::Warn)
        .env()
        .init()
}
