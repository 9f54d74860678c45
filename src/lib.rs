pub mod config;
pub mod host;
pub mod render;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::core::AppConfig;
pub use config::rendering::RenderConfig;
pub use host::SurfaceHost;
pub use render::shaders::{ShaderError, ShaderProgram};
pub use render::surface::{SurfaceDriver, SurfaceRenderer};
pub use render::triangle::{TriangleRenderer, TriangleStyle};
pub use ui::menu::{Navigator, Screen};
