//! Flat-colored triangle renderer.

use std::fmt;

use glam::Mat4;

use super::gl::{DrawMode, GlesApi};
use super::shaders::triangle_shaders::{
    COLOR_UNIFORM, FRAGMENT_SRC, MVP_UNIFORM, POSITION_ATTRIB, VERTEX_SRC,
};
use super::shaders::{ShaderError, ShaderProgram};
use super::surface::SurfaceRenderer;
use super::vertex::{VertexBuffer, COORDS_PER_VERTEX, TRIANGLE_COORDS, VERTEX_STRIDE};
use crate::config::RenderConfig;

/// Colors and projection mode of the triangle screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleStyle {
    pub clear_color: [f32; 4],
    pub color: [f32; 4],
    pub preserve_aspect: bool,
}

impl Default for TriangleStyle {
    fn default() -> Self {
        Self {
            clear_color: [0.5, 0.5, 0.5, 1.0],
            color: [1.0, 1.0, 1.0, 1.0],
            preserve_aspect: false,
        }
    }
}

impl From<&RenderConfig> for TriangleStyle {
    fn from(config: &RenderConfig) -> Self {
        Self {
            clear_color: config.clear_color,
            color: config.triangle_color,
            preserve_aspect: config.preserve_aspect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Linked program plus the input locations the draw call needs, resolved
/// once right after linking.
pub struct TriangleProgram<G: GlesApi> {
    program: ShaderProgram<G>,
    position: u32,
    mvp: G::UniformLocation,
    color: G::UniformLocation,
}

impl<G: GlesApi> TriangleProgram<G> {
    fn bind(gl: &G, program: ShaderProgram<G>) -> Result<Self, ShaderError> {
        match Self::locations(gl, &program) {
            Ok((position, mvp, color)) => Ok(Self {
                program,
                position,
                mvp,
                color,
            }),
            Err(e) => {
                program.delete(gl);
                Err(e)
            }
        }
    }

    fn locations(
        gl: &G,
        program: &ShaderProgram<G>,
    ) -> Result<(u32, G::UniformLocation, G::UniformLocation), ShaderError> {
        let position = program.attribute_location(gl, POSITION_ATTRIB)?;
        let mvp = program.uniform_location(gl, MVP_UNIFORM)?;
        let color = program.uniform_location(gl, COLOR_UNIFORM)?;
        Ok((position, mvp, color))
    }

    pub fn id(&self) -> G::Program {
        self.program.id()
    }
}

/// Program lifecycle per surface: `Uncreated` until the surface exists, then
/// either `Ready` or `Failed` for the rest of the surface's life.
pub enum ProgramState<G: GlesApi> {
    Uncreated,
    Ready(TriangleProgram<G>),
    Failed(ShaderError),
}

impl<G: GlesApi> fmt::Debug for ProgramState<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramState::Uncreated => f.write_str("Uncreated"),
            ProgramState::Ready(p) => f.debug_tuple("Ready").field(&p.id()).finish(),
            ProgramState::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

pub struct TriangleRenderer<G: GlesApi> {
    style: TriangleStyle,
    vertex_source: &'static str,
    fragment_source: &'static str,
    state: ProgramState<G>,
    vertices: Option<VertexBuffer<G>>,
    viewport: Option<Viewport>,
    mvp: Mat4,
    warned_unready: bool,
}

impl<G: GlesApi> TriangleRenderer<G> {
    pub fn new(style: TriangleStyle) -> Self {
        Self {
            style,
            vertex_source: VERTEX_SRC,
            fragment_source: FRAGMENT_SRC,
            state: ProgramState::Uncreated,
            vertices: None,
            viewport: None,
            mvp: Mat4::IDENTITY,
            warned_unready: false,
        }
    }

    /// Replaces the built-in shader pair.
    pub fn with_shader_sources(mut self, vertex: &'static str, fragment: &'static str) -> Self {
        self.vertex_source = vertex;
        self.fragment_source = fragment;
        self
    }

    pub fn state(&self) -> &ProgramState<G> {
        &self.state
    }

    /// Handle of the linked program, if linking succeeded.
    pub fn program_id(&self) -> Option<G::Program> {
        match &self.state {
            ProgramState::Ready(p) => Some(p.id()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ShaderError> {
        match &self.state {
            ProgramState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn vertices(&self) -> Option<&VertexBuffer<G>> {
        self.vertices.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn mvp(&self) -> Mat4 {
        self.mvp
    }

    /// Whether the skipped-draw warning was already logged for this surface.
    pub fn warned_unready(&self) -> bool {
        self.warned_unready
    }

    fn build(&mut self, gl: &G) -> Result<TriangleProgram<G>, ShaderError> {
        let mut vertices = VertexBuffer::from_coords(&TRIANGLE_COORDS);
        vertices.upload(gl)?;
        self.vertices = Some(vertices);

        let program = ShaderProgram::from_source(gl, self.vertex_source, self.fragment_source)?;
        TriangleProgram::bind(gl, program)
    }

    fn release(&mut self, gl: &G) {
        if let ProgramState::Ready(p) = std::mem::replace(&mut self.state, ProgramState::Uncreated)
        {
            p.program.delete(gl);
        }
        if let Some(mut vertices) = self.vertices.take() {
            vertices.release(gl);
        }
    }
}

/// Model-view-projection for a surface of the given size.
///
/// Identity stretches the triangle with the surface. With `preserve_aspect`
/// the shorter axis spans [-1, 1] and the longer one is widened to match.
pub fn projection(width: u32, height: u32, preserve_aspect: bool) -> Mat4 {
    if !preserve_aspect || width == 0 || height == 0 {
        return Mat4::IDENTITY;
    }
    let aspect = width as f32 / height as f32;
    if aspect >= 1.0 {
        Mat4::orthographic_rh_gl(-aspect, aspect, -1.0, 1.0, -1.0, 1.0)
    } else {
        let inv = 1.0 / aspect;
        Mat4::orthographic_rh_gl(-1.0, 1.0, -inv, inv, -1.0, 1.0)
    }
}

impl<G: GlesApi> SurfaceRenderer<G> for TriangleRenderer<G> {
    fn on_surface_created(&mut self, gl: &G) {
        log::debug!("surface created");
        self.release(gl);
        self.warned_unready = false;

        gl.clear_color(self.style.clear_color);

        self.state = match self.build(gl) {
            Ok(program) => {
                log::info!("triangle program ready: {:?}", program.id());
                ProgramState::Ready(program)
            }
            Err(e) => {
                log::error!("triangle program unavailable: {}", e);
                ProgramState::Failed(e)
            }
        };
    }

    fn on_surface_resized(&mut self, gl: &G, width: u32, height: u32) {
        log::debug!("surface resized: {}x{}", width, height);
        let viewport = Viewport {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        };
        gl.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        self.viewport = Some(viewport);
        self.mvp = projection(width, height, self.style.preserve_aspect);
    }

    fn on_draw_frame(&mut self, gl: &G) {
        log::trace!("draw frame");
        gl.clear_color_buffer();

        let (program, vertices) = match (&self.state, &self.vertices) {
            (ProgramState::Ready(program), Some(vertices)) => (program, vertices),
            _ => {
                if !self.warned_unready {
                    log::warn!("skipping draw, program state: {:?}", self.state);
                    self.warned_unready = true;
                }
                return;
            }
        };

        program.program.set_used(gl);
        gl.bind_array_buffer(vertices.handle());
        gl.enable_vertex_attrib_array(program.position);
        gl.vertex_attrib_pointer_f32(
            program.position,
            COORDS_PER_VERTEX as i32,
            false,
            VERTEX_STRIDE as i32,
            0,
        );
        gl.uniform_4_f32(&program.color, self.style.color);
        gl.uniform_matrix_4_f32(&program.mvp, &self.mvp.to_cols_array());
        gl.draw_arrays(DrawMode::Triangles, 0, vertices.vertex_count() as i32);
    }

    fn on_surface_destroyed(&mut self, gl: &G) {
        log::debug!("surface destroyed, releasing triangle resources");
        self.release(gl);
        self.viewport = None;
    }
}
