use std::fmt;
use std::mem;

use super::gl::GlesApi;
use super::shaders::ShaderError;

/// Coordinates per vertex (x, y, z).
pub const COORDS_PER_VERTEX: usize = 3;

/// Byte distance between consecutive vertices.
pub const VERTEX_STRIDE: usize = COORDS_PER_VERTEX * mem::size_of::<f32>();

/// Triangle corners, origin at the center of the surface.
pub const TRIANGLE_COORDS: [f32; 9] = [
    0.5, 0.5, 0.0, // top
    -0.5, -0.5, 0.0, // bottom left
    0.5, -0.5, 0.0, // bottom right
];

/// Vertex positions copied into a native-endian byte region, plus the GL
/// array buffer they were uploaded to.
pub struct VertexBuffer<G: GlesApi> {
    bytes: Vec<u8>,
    handle: Option<G::Buffer>,
}

impl<G: GlesApi> fmt::Debug for VertexBuffer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("len", &self.bytes.len())
            .field("handle", &self.handle)
            .finish()
    }
}

impl<G: GlesApi> VertexBuffer<G> {
    pub fn from_coords(coords: &[f32]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(coords).to_vec(),
            handle: None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads the stored bytes back as floats.
    pub fn coords(&self) -> Vec<f32> {
        self.bytes
            .chunks_exact(mem::size_of::<f32>())
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.bytes.len() / VERTEX_STRIDE
    }

    pub fn handle(&self) -> Option<G::Buffer> {
        self.handle
    }

    /// Copies the bytes into a new GL array buffer. Runs once per surface.
    pub fn upload(&mut self, gl: &G) -> Result<G::Buffer, ShaderError> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        let handle = gl.create_buffer().map_err(ShaderError::CreateBuffer)?;
        gl.upload_array_buffer(handle, &self.bytes);
        gl.bind_array_buffer(None);
        self.handle = Some(handle);
        Ok(handle)
    }

    pub fn release(&mut self, gl: &G) {
        if let Some(handle) = self.handle.take() {
            gl.delete_buffer(handle);
        }
    }
}
