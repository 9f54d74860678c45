// shaders.rs - shader compilation and program linking

use std::fmt;

use thiserror::Error;

use super::gl::{GlesApi, ShaderStage};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error("Could not create {stage} shader object: {reason}")]
    CreateShader { stage: ShaderStage, reason: String },
    #[error("{stage} shader compilation failed: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Could not create program object: {0}")]
    CreateProgram(String),
    #[error("Program linking failed: {0}")]
    Link(String),
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),
    #[error("Uniform not found: {0}")]
    UniformNotFound(String),
    #[error("Could not create vertex buffer: {0}")]
    CreateBuffer(String),
}

/// Predefined triangle shader sources.
///
/// No `#version` line: they build as GLSL ES 1.00 on a GLES context and as
/// GLSL 1.10 on a desktop compatibility context.
pub mod triangle_shaders {
    pub const POSITION_ATTRIB: &str = "vPosition";
    pub const MVP_UNIFORM: &str = "uMVPMatrix";
    pub const COLOR_UNIFORM: &str = "vColor";

    pub const VERTEX_SRC: &str = r#"
uniform mat4 uMVPMatrix;
attribute vec4 vPosition;
void main() {
    gl_Position = uMVPMatrix * vPosition;
}
"#;

    pub const FRAGMENT_SRC: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
uniform vec4 vColor;
void main() {
    gl_FragColor = vColor;
}
"#;
}

/// A linked vertex + fragment program.
pub struct ShaderProgram<G: GlesApi> {
    id: G::Program,
}

impl<G: GlesApi> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram").field("id", &self.id).finish()
    }
}

impl<G: GlesApi> ShaderProgram<G> {
    /// Compiles both stages and links them.
    ///
    /// Program creation is skipped entirely when either stage fails to
    /// compile. Shader objects never outlive this call.
    pub fn from_source(
        gl: &G,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vertex_shader = compile_shader(gl, ShaderStage::Vertex, vertex_source)?;
        let fragment_shader = match compile_shader(gl, ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vertex_shader);
                return Err(e);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(reason) => {
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                return Err(ShaderError::CreateProgram(reason));
            }
        };
        log::debug!("program created: {:?}", program);

        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);
        // Attached shaders are only flagged here; the driver frees them with the program.
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        Self::check_link_status(gl, program)?;
        Ok(ShaderProgram { id: program })
    }

    fn check_link_status(gl: &G, program: G::Program) -> Result<(), ShaderError> {
        let linked = gl.program_link_status(program);
        log::debug!("link status for {:?}: {}", program, linked);
        if linked {
            return Ok(());
        }

        // The caller reports the failure; only the object is cleaned up here.
        let info = gl.program_info_log(program);
        gl.delete_program(program);
        Err(ShaderError::Link(info))
    }

    pub fn id(&self) -> G::Program {
        self.id
    }

    pub fn set_used(&self, gl: &G) {
        gl.use_program(Some(self.id));
    }

    /// Queries the driver; callers keep the result instead of asking per frame.
    pub fn attribute_location(&self, gl: &G, name: &str) -> Result<u32, ShaderError> {
        gl.attrib_location(self.id, name)
            .ok_or_else(|| ShaderError::AttributeNotFound(name.to_string()))
    }

    pub fn uniform_location(&self, gl: &G, name: &str) -> Result<G::UniformLocation, ShaderError> {
        gl.uniform_location(self.id, name)
            .ok_or_else(|| ShaderError::UniformNotFound(name.to_string()))
    }

    pub fn delete(self, gl: &G) {
        gl.delete_program(self.id);
    }
}

/// Creates, sources and compiles one shader object.
///
/// On failure the compiler log is captured and the object is deleted.
pub fn compile_shader<G: GlesApi>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ShaderError> {
    let shader = gl
        .create_shader(stage)
        .map_err(|reason| ShaderError::CreateShader { stage, reason })?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    let compiled = gl.shader_compile_status(shader);
    log::debug!("{} shader compiled: {}", stage, compiled);
    if !compiled {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(ShaderError::Compile { stage, log });
    }

    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::triangle_shaders::*;
    use super::*;
    use crate::render::fake::{FakeGl, GlCall};

    const BROKEN_FRAGMENT: &str = r#"
uniform vec4 vColor;
void main() {
    const char* label = "unterminated;
    gl_FragColor = vColor;
}
"#;

    #[test]
    fn test_valid_sources_link() {
        let gl = FakeGl::new();
        let program = ShaderProgram::from_source(&gl, VERTEX_SRC, FRAGMENT_SRC).unwrap();

        assert_ne!(program.id(), 0);
        assert_eq!(program.attribute_location(&gl, POSITION_ATTRIB), Ok(0));
        assert!(program.uniform_location(&gl, COLOR_UNIFORM).is_ok());
        assert!(program.uniform_location(&gl, MVP_UNIFORM).is_ok());
        assert_eq!(gl.live_programs(), 1);
        // Both stages were released after linking.
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn test_compile_failure_skips_program_creation() {
        let gl = FakeGl::new();
        let err = ShaderProgram::from_source(&gl, VERTEX_SRC, BROKEN_FRAGMENT)
            .unwrap_err();

        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(gl.count(|c| matches!(c, GlCall::CreateProgram(_))), 0);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn test_compile_shader_reports_stage() {
        let gl = FakeGl::new();
        let err = compile_shader(&gl, ShaderStage::Vertex, "no entry point").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn test_shader_creation_failure() {
        let gl = FakeGl {
            fail_create_shader: true,
            ..FakeGl::default()
        };
        let err = compile_shader(&gl, ShaderStage::Fragment, FRAGMENT_SRC).unwrap_err();
        assert!(matches!(err, ShaderError::CreateShader { stage: ShaderStage::Fragment, .. }));
        assert_eq!(gl.count(|c| matches!(c, GlCall::CompileShader(_))), 0);
    }

    #[test]
    fn test_program_creation_failure_skips_link() {
        let gl = FakeGl {
            fail_create_program: true,
            ..FakeGl::default()
        };
        let err = ShaderProgram::from_source(&gl, VERTEX_SRC, FRAGMENT_SRC)
            .unwrap_err();
        assert!(matches!(err, ShaderError::CreateProgram(_)));
        assert_eq!(gl.count(|c| matches!(c, GlCall::LinkProgram(_))), 0);
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn test_link_failure_deletes_program() {
        let gl = FakeGl {
            link_error: Some("error: vColor redeclared".to_string()),
            ..FakeGl::default()
        };
        let err = ShaderProgram::from_source(&gl, VERTEX_SRC, FRAGMENT_SRC)
            .unwrap_err();

        assert_eq!(err, ShaderError::Link("error: vColor redeclared".to_string()));
        assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn test_missing_uniform_is_an_error() {
        let gl = FakeGl::new();
        let program = ShaderProgram::from_source(&gl, VERTEX_SRC, FRAGMENT_SRC).unwrap();

        assert_eq!(
            program.uniform_location(&gl, "uTime"),
            Err(ShaderError::UniformNotFound("uTime".to_string()))
        );
        assert_eq!(
            program.attribute_location(&gl, "aNormal"),
            Err(ShaderError::AttributeNotFound("aNormal".to_string()))
        );
    }

    #[test]
    fn test_sources_have_no_version_directive() {
        assert!(!VERTEX_SRC.contains("#version"));
        assert!(!FRAGMENT_SRC.contains("#version"));
        assert!(VERTEX_SRC.contains("uMVPMatrix * vPosition"));
    }
}
