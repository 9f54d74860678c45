pub mod core;
pub mod rendering;
pub mod window;

pub use self::core::{AppConfig, ConfigError, LoggingConfig};
pub use rendering::{GlApi, RenderConfig};
pub use window::WindowConfig;
