//! The graphics device collaborator.
//!
//! The session drives setup and every frame through this trait; it never
//! talks to a graphics API directly. `quad-gpu` implements it on wgpu.

use crate::frame::FrameInputs;
use crate::geometry::{Geometry, Topology};
use crate::target::TargetMode;
use crate::{ShaderStage, Size};

/// Fixed-function state baked into a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOptions {
    /// Floats per vertex position (2 or 3).
    pub vertex_components: u32,
    pub topology: Topology,
    /// Less-or-equal depth test against a depth buffer cleared to 1.0.
    pub depth_test: bool,
}

impl LinkOptions {
    pub fn for_geometry(geometry: &Geometry, depth_test: bool) -> Self {
        Self {
            vertex_components: geometry.components(),
            topology: geometry.topology(),
            depth_test,
        }
    }
}

/// Where a pass renders to.
pub enum Destination<'a, T> {
    Surface,
    Target(&'a T),
}

/// Which texture a pass samples, if any.
pub enum Sample<'a, T> {
    Nothing,
    /// The target's color texture, written by an earlier pass.
    Target(&'a T),
    /// The target's copy of the previously presented surface.
    History(&'a T),
}

/// Everything needed to record one draw of the geometry.
pub struct Pass<'a, D: GraphicsDevice + ?Sized> {
    pub destination: Destination<'a, D::Target>,
    pub viewport: Size,
    pub program: &'a D::Program,
    pub geometry: &'a D::Geometry,
    pub sample: Sample<'a, D::Target>,
    pub inputs: &'a FrameInputs,
}

pub trait GraphicsDevice {
    type Shader;
    type Program;
    type Geometry;
    type Target;
    /// Error raised when a frame's drawable cannot be acquired.
    type FrameError;

    /// Current drawable size in physical pixels.
    fn surface_size(&self) -> Size;

    /// Compile one stage. `Err` carries the compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
        options: &LinkOptions,
    ) -> Result<Self::Program, String>;

    /// Check the linked program can execute against the current state.
    fn validate_program(&mut self, program: &Self::Program) -> Result<(), String>;

    fn upload_geometry(&mut self, geometry: &Geometry) -> Self::Geometry;

    fn create_target(&mut self, size: Size, mode: TargetMode) -> Self::Target;

    /// Apply a new drawable size. Takes effect from the next frame.
    fn resize_surface(&mut self, size: Size);

    fn begin_frame(&mut self) -> Result<(), Self::FrameError>;

    fn draw(&mut self, pass: Pass<'_, Self>);

    /// Submit everything recorded so far; later passes see its results.
    fn flush(&mut self);

    /// Copy the current drawable into the target's history texture.
    fn capture_surface(&mut self, target: &Self::Target);

    /// Submit and present the frame.
    fn end_frame(&mut self);

    /// Present one cleared drawable. Used when setup fails after the
    /// context was acquired, so nothing stale stays on screen.
    fn blank_surface(&mut self);
}
