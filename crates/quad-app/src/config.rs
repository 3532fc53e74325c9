use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use quad_core::pipeline::ShaderSources;
use quad_core::{SessionConfig, Size, Variant};

use crate::logging::LoggingConfig;

/// Draw a full-surface quad (or triangle) with a WGSL pipeline.
#[derive(Debug, Parser)]
#[command(name = "quad", version)]
pub struct Cli {
    /// triangle, quad, render-target or canvas-feedback
    #[arg(long, default_value_t = Variant::RenderTarget)]
    pub variant: Variant,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// WGSL file to use instead of the built-in vertex shader.
    #[arg(long, value_name = "FILE")]
    pub vertex: Option<PathBuf>,

    /// WGSL file to use instead of the built-in fragment shader.
    #[arg(long, value_name = "FILE")]
    pub fragment: Option<PathBuf>,

    /// Skip the pipeline validation step after linking.
    #[arg(long)]
    pub no_validate: bool,

    /// Log filter, e.g. "debug" or "quad_core=debug". Overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            variant: self.variant,
            validate_pipeline: !self.no_validate,
            initial_size: Size::new(self.width.max(1), self.height.max(1)),
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }

    /// Built-in sources for the variant, with either stage replaced by a file.
    pub fn shader_sources(&self) -> anyhow::Result<ShaderSources> {
        let mut sources = quad_gpu::builtin_sources(self.variant);
        if let Some(path) = &self.vertex {
            sources.vertex = read_source(path)?;
        }
        if let Some(path) = &self.fragment {
            sources.fragment = read_source(path)?;
        }
        Ok(sources)
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    log::info!("Loading shader {}", path.display());
    std::fs::read_to_string(path).with_context(|| format!("reading shader {}", path.display()))
}
