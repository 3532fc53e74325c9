use thiserror::Error;

use crate::ShaderStage;

/// Fatal setup failures. None of these are retried: the session either
/// reaches its render loop or shows a fallback message and stops.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no graphics context available: {0}")]
    ContextUnavailable(String),

    /// `code` is the offending source text, kept for diagnostics.
    #[error("failed to compile the {stage} shader: {log}")]
    ShaderCompile {
        stage: ShaderStage,
        log: String,
        code: String,
    },

    #[error("failed to link the shader program: {0}")]
    ShaderLink(String),

    #[error("shader program failed validation: {0}")]
    ShaderValidation(String),
}

impl SetupError {
    /// Static, human-readable text for the fallback UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            SetupError::ContextUnavailable(_) => "Graphics context not available",
            SetupError::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            } => "Error while compiling the vertex shader",
            SetupError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            } => "Error while compiling the fragment shader",
            SetupError::ShaderLink(_) => "Error while linking the shader program",
            SetupError::ShaderValidation(_) => "Error while validating the shader program",
        }
    }

    /// The stage that failed to compile, if this is a compile error.
    pub fn failed_stage(&self) -> Option<ShaderStage> {
        match self {
            SetupError::ShaderCompile { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
