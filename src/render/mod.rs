pub mod gl;
pub mod shaders;
pub mod surface;
pub mod triangle;
pub mod vertex;

#[cfg(test)]
pub(crate) mod fake;

pub use gl::{DrawMode, GlesApi, ShaderStage};
pub use shaders::{ShaderError, ShaderProgram};
pub use surface::{SurfaceDriver, SurfacePhase, SurfaceRenderer};
pub use triangle::{ProgramState, TriangleRenderer, TriangleStyle, Viewport};
pub use vertex::VertexBuffer;
