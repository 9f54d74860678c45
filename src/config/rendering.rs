use serde::{Deserialize, Serialize};

/// Which client API the host asks the display for first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlApi {
    /// OpenGL ES 2.0, falling back to desktop OpenGL.
    Gles,
    /// Desktop OpenGL 3.3 compatibility profile, falling back to GLES.
    Gl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub triangle_color: [f32; 4],
    /// Keep the triangle's proportions instead of stretching with the surface.
    pub preserve_aspect: bool,
    pub gl_api: GlApi,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.5, 0.5, 0.5, 1.0],
            triangle_color: [1.0, 1.0, 1.0, 1.0],
            preserve_aspect: false,
            gl_api: GlApi::Gles,
        }
    }
}
