pub mod device;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod pipeline;
pub mod session;
pub mod target;
pub mod variant;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

pub use error::SetupError;
pub use session::{launch, FallbackUi, RenderSession, SessionConfig};
pub use variant::Variant;

// ---------------------------------------------------------------------------
// Size: physical pixel dimensions of a surface, viewport or target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_f32(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// Width over height. Returns 1.0 for a degenerate size.
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// ShaderStage
// ---------------------------------------------------------------------------

/// One compiled unit of a shader pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}
