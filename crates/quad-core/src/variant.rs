use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::frame::Schedule;
use crate::geometry::{Geometry, QUAD, TRIANGLE};
use crate::target::{TargetMode, TargetSize, TargetSpec, FIXED_TARGET_SIDE};
use crate::Size;

/// The four demos, each adding one feature to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Triangle,
    Quad,
    RenderTarget,
    CanvasFeedback,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Triangle,
        Variant::Quad,
        Variant::RenderTarget,
        Variant::CanvasFeedback,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Triangle => "Static Triangle",
            Variant::Quad => "Full-screen Quad",
            Variant::RenderTarget => "Render-to-Texture Quad",
            Variant::CanvasFeedback => "Canvas Feedback Quad",
        }
    }

    /// Command-line spelling.
    pub fn slug(self) -> &'static str {
        match self {
            Variant::Triangle => "triangle",
            Variant::Quad => "quad",
            Variant::RenderTarget => "render-target",
            Variant::CanvasFeedback => "canvas-feedback",
        }
    }

    pub fn geometry(self) -> &'static Geometry {
        match self {
            Variant::Triangle => &TRIANGLE,
            _ => &QUAD,
        }
    }

    pub fn target(self) -> Option<TargetSpec> {
        match self {
            Variant::Triangle | Variant::Quad => None,
            Variant::RenderTarget => Some(TargetSpec {
                size: TargetSize::Fixed(Size::new(FIXED_TARGET_SIDE, FIXED_TARGET_SIDE)),
                mode: TargetMode::Empty,
            }),
            Variant::CanvasFeedback => Some(TargetSpec {
                size: TargetSize::MatchSurface,
                mode: TargetMode::CaptureSurface,
            }),
        }
    }

    pub fn schedule(self) -> Schedule {
        match self {
            Variant::Triangle => Schedule::Once {
                delay: Duration::ZERO,
            },
            Variant::Quad => Schedule::Once {
                delay: Duration::from_secs(1),
            },
            Variant::RenderTarget | Variant::CanvasFeedback => Schedule::EveryFrame,
        }
    }

    /// Only the perspective triangle draws with a depth buffer.
    pub fn depth_test(self) -> bool {
        self == Variant::Triangle
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant `{0}` (expected one of: {known})", known = known_slugs())]
pub struct UnknownVariant(pub String);

fn known_slugs() -> String {
    Variant::ALL.map(Variant::slug).join(", ")
}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .iter()
            .copied()
            .find(|v| v.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_four_variants() {
        assert_eq!(Variant::ALL.len(), 4);
    }

    #[test]
    fn all_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for v in Variant::ALL {
            assert!(seen.insert(v.name()), "duplicate variant name: {}", v.name());
        }
    }

    #[test]
    fn slugs_parse_back() {
        for v in Variant::ALL {
            assert_eq!(v.slug().parse::<Variant>(), Ok(v));
        }
        assert_eq!("QUAD".parse::<Variant>(), Ok(Variant::Quad));
    }

    #[test]
    fn unknown_slug_lists_choices() {
        let err = "hexagon".parse::<Variant>().unwrap_err();
        let msg = err.to_string();
        assert_eq!(
            msg,
            "unknown variant `hexagon` (expected one of: triangle, quad, render-target, canvas-feedback)"
        );
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert!(boxed.to_string().starts_with("unknown variant"));
    }

    #[test]
    fn only_advanced_variants_have_targets() {
        assert!(Variant::Triangle.target().is_none());
        assert!(Variant::Quad.target().is_none());
        assert_eq!(
            Variant::RenderTarget.target().map(|t| t.mode),
            Some(TargetMode::Empty)
        );
        assert_eq!(
            Variant::CanvasFeedback.target().map(|t| t.size),
            Some(TargetSize::MatchSurface)
        );
    }

    #[test]
    fn older_variants_draw_once() {
        assert!(matches!(Variant::Triangle.schedule(), Schedule::Once { .. }));
        assert_eq!(
            Variant::Quad.schedule(),
            Schedule::Once {
                delay: Duration::from_secs(1)
            }
        );
        assert_eq!(Variant::RenderTarget.schedule(), Schedule::EveryFrame);
    }

    #[test]
    fn triangle_uses_its_own_geometry() {
        assert_eq!(Variant::Triangle.geometry().vertex_count(), 3);
        assert_eq!(Variant::CanvasFeedback.geometry().vertex_count(), 4);
    }
}
