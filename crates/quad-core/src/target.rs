use crate::Size;

/// Side of the fixed-size render target.
pub const FIXED_TARGET_SIDE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSize {
    Fixed(Size),
    /// Follows the surface and is reallocated when it resizes.
    MatchSurface,
}

/// How the target texture is initialized and fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Linear filtering over an explicitly allocated empty image.
    Empty,
    /// Linear filtering plus a copy of the presented surface, sampled by
    /// the next frame's off-screen pass.
    CaptureSurface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub size: TargetSize,
    pub mode: TargetMode,
}

impl TargetSpec {
    pub fn resolve(&self, surface: Size) -> Size {
        match self.size {
            TargetSize::Fixed(size) => size,
            TargetSize::MatchSurface => surface,
        }
    }

    pub fn follows_surface(&self) -> bool {
        self.size == TargetSize::MatchSurface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_target_ignores_surface() {
        let spec = TargetSpec {
            size: TargetSize::Fixed(Size::new(FIXED_TARGET_SIDE, FIXED_TARGET_SIDE)),
            mode: TargetMode::Empty,
        };
        assert_eq!(spec.resolve(Size::new(640, 480)), Size::new(1024, 1024));
        assert!(!spec.follows_surface());
    }

    #[test]
    fn surface_sized_target_tracks_surface() {
        let spec = TargetSpec {
            size: TargetSize::MatchSurface,
            mode: TargetMode::CaptureSurface,
        };
        assert_eq!(spec.resolve(Size::new(640, 480)), Size::new(640, 480));
        assert!(spec.follows_surface());
    }
}
