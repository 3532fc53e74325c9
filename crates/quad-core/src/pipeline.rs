use crate::device::{GraphicsDevice, LinkOptions};
use crate::error::SetupError;
use crate::ShaderStage;

/// Vertex and fragment source text for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Compile both stages, link them and optionally validate the result.
///
/// Stops at the first failure: a vertex compile error means the fragment
/// stage is never compiled, and no compile error ever reaches linking.
pub fn build_pipeline<D: GraphicsDevice>(
    device: &mut D,
    sources: &ShaderSources,
    options: &LinkOptions,
    validate: bool,
) -> Result<D::Program, SetupError> {
    let vertex = compile(device, ShaderStage::Vertex, &sources.vertex)?;
    log::debug!("vertex stage compiled");

    let fragment = compile(device, ShaderStage::Fragment, &sources.fragment)?;
    log::debug!("fragment stage compiled");

    let program = device
        .link_program(vertex, fragment, options)
        .map_err(SetupError::ShaderLink)?;
    log::debug!("program linked");

    if validate {
        device
            .validate_program(&program)
            .map_err(SetupError::ShaderValidation)?;
        log::debug!("program validated");
    }

    Ok(program)
}

fn compile<D: GraphicsDevice>(
    device: &mut D,
    stage: ShaderStage,
    source: &str,
) -> Result<D::Shader, SetupError> {
    device
        .compile_shader(stage, source)
        .map_err(|log| SetupError::ShaderCompile {
            stage,
            log,
            code: source.to_string(),
        })
}
