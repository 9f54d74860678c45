pub mod egui_render;
pub mod menu;

pub use egui_render::EguiLayer;
pub use menu::{BackAction, LauncherMenu, Navigator, Screen, Transition};
