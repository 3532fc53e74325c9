//! Built-in WGSL programs, one pair per variant.
//!
//! Every module that touches uniforms declares the same `Uniforms` block as
//! [`crate::context::Uniforms`] at `@group(0) @binding(0)`; sampling shaders
//! add `t_input` and `s_input` at bindings 1 and 2.

use quad_core::pipeline::ShaderSources;
use quad_core::Variant;

pub const TRIANGLE_VERT: &str = include_str!("../shaders/triangle.vert.wgsl");
pub const TRIANGLE_FRAG: &str = include_str!("../shaders/triangle.frag.wgsl");
pub const QUAD_VERT: &str = include_str!("../shaders/quad.vert.wgsl");
pub const QUAD_FRAG: &str = include_str!("../shaders/quad.frag.wgsl");
pub const RENDER_TARGET_FRAG: &str = include_str!("../shaders/render_target.frag.wgsl");
pub const CANVAS_FEEDBACK_FRAG: &str = include_str!("../shaders/canvas_feedback.frag.wgsl");

pub fn builtin_sources(variant: Variant) -> ShaderSources {
    let (vertex, fragment) = match variant {
        Variant::Triangle => (TRIANGLE_VERT, TRIANGLE_FRAG),
        Variant::Quad => (QUAD_VERT, QUAD_FRAG),
        Variant::RenderTarget => (QUAD_VERT, RENDER_TARGET_FRAG),
        Variant::CanvasFeedback => (QUAD_VERT, CANVAS_FEEDBACK_FRAG),
    };
    ShaderSources::new(vertex, fragment)
}
