//! Recording GL backend for unit tests.
//!
//! Handles are plain non-zero integers. The "compiler" accepts any source that
//! has a `main` entry point and balanced double quotes, which is enough to
//! tell the triangle shaders apart from deliberately broken ones.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::gl::{DrawMode, GlesApi, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    ClearColor([f32; 4]),
    Clear,
    Viewport(i32, i32, i32, i32),
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    AttribLocation(u32, String),
    UniformLocation(u32, String),
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    UploadArrayBuffer(u32, Vec<u8>),
    DeleteBuffer(u32),
    EnableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    Uniform4f(u32, [f32; 4]),
    UniformMatrix4f(u32, [f32; 16]),
    DrawArrays(DrawMode, i32, i32),
}

#[derive(Debug, Default)]
pub(super) struct ShaderObject {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
pub(super) struct ProgramObject {
    shaders: Vec<u32>,
    linked: bool,
}

#[derive(Debug, Default)]
pub struct FakeGl {
    pub(super) next_id: Cell<u32>,
    pub(super) calls: RefCell<Vec<GlCall>>,
    pub(super) shaders: RefCell<HashMap<u32, ShaderObject>>,
    pub(super) programs: RefCell<HashMap<u32, ProgramObject>>,
    pub fail_create_shader: bool,
    pub fail_create_program: bool,
    pub fail_create_buffer: bool,
    pub link_error: Option<String>,
    /// Names the linker reports as inactive.
    pub missing_locations: Vec<&'static str>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.borrow().len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.borrow().len()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn alloc(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn accepts(source: &str) -> bool {
        source.contains("void main") && source.matches('"').count() % 2 == 0
    }
}

impl GlesApi for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = u32;

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(GlCall::ClearColor(rgba));
    }

    fn clear_color_buffer(&self) {
        self.record(GlCall::Clear);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        if self.fail_create_shader {
            return Err("out of shader objects".to_string());
        }
        let id = self.alloc();
        self.shaders.borrow_mut().insert(id, ShaderObject::default());
        self.record(GlCall::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(obj) = self.shaders.borrow_mut().get_mut(&shader) {
            obj.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(obj) = self.shaders.borrow_mut().get_mut(&shader) {
            obj.compiled = Self::accepts(&obj.source);
        }
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders
            .borrow()
            .get(&shader)
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.shaders.borrow().get(&shader) {
            Some(s) if !s.compiled => format!("0:1: syntax error in shader {shader}"),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.shaders.borrow_mut().remove(&shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        if self.fail_create_program {
            return Err("out of program objects".to_string());
        }
        let id = self.alloc();
        self.programs.borrow_mut().insert(id, ProgramObject::default());
        self.record(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.shaders.push(shader);
        }
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        let shaders = self.shaders.borrow();
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            let all_compiled = p
                .shaders
                .iter()
                .all(|id| shaders.get(id).map(|s| s.compiled).unwrap_or(false));
            p.linked = self.link_error.is_none() && p.shaders.len() == 2 && all_compiled;
        }
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs
            .borrow()
            .get(&program)
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            return String::new();
        }
        self.link_error
            .clone()
            .unwrap_or_else(|| "error: vertex and fragment stages do not match".to_string())
    }

    fn delete_program(&self, program: u32) {
        self.programs.borrow_mut().remove(&program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.record(GlCall::AttribLocation(program, name.to_string()));
        if self.missing_locations.contains(&name) {
            return None;
        }
        (name == "vPosition").then_some(0)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        self.record(GlCall::UniformLocation(program, name.to_string()));
        if self.missing_locations.contains(&name) {
            return None;
        }
        match name {
            "uMVPMatrix" => Some(0),
            "vColor" => Some(1),
            _ => None,
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        if self.fail_create_buffer {
            return Err("out of buffer objects".to_string());
        }
        let id = self.alloc();
        self.record(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(GlCall::BindArrayBuffer(buffer));
    }

    fn upload_array_buffer(&self, buffer: u32, bytes: &[u8]) {
        self.record(GlCall::UploadArrayBuffer(buffer, bytes.to_vec()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            normalized,
            stride,
            offset,
        });
    }

    fn uniform_4_f32(&self, location: &u32, value: [f32; 4]) {
        self.record(GlCall::Uniform4f(*location, value));
    }

    fn uniform_matrix_4_f32(&self, location: &u32, value: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4f(*location, *value));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.record(GlCall::DrawArrays(mode, first, count));
    }
}
