use glam::Mat4;

use crate::device::{Destination, GraphicsDevice, LinkOptions, Pass, Sample};
use crate::error::SetupError;
use crate::frame::{perspective, FrameInputs, OFFSCREEN_PASS, SURFACE_PASS};
use crate::input::{InteractionState, SurfaceBounds};
use crate::pipeline::{build_pipeline, ShaderSources};
use crate::target::{TargetMode, TargetSpec};
use crate::variant::Variant;
use crate::Size;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub variant: Variant,
    /// Run the optional validation step after linking.
    pub validate_pipeline: bool,
    /// Drawable size requested from the host before the first resize.
    pub initial_size: Size,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: Variant::RenderTarget,
            validate_pipeline: true,
            initial_size: Size::new(800, 600),
        }
    }
}

// ---------------------------------------------------------------------------
// FallbackUi
// ---------------------------------------------------------------------------

/// Shown in place of the drawable when setup fails.
pub trait FallbackUi {
    fn show_message(&mut self, message: &str);
}

/// Acquire a device and set up a session, or report why not.
///
/// On failure the detailed error is logged, the fallback UI receives the
/// static message for that failure, and no draw call is ever made.
pub fn launch<D, F>(
    acquire: F,
    config: &SessionConfig,
    sources: &ShaderSources,
    fallback: &mut dyn FallbackUi,
) -> Result<RenderSession<D>, SetupError>
where
    D: GraphicsDevice,
    F: FnOnce() -> Result<D, SetupError>,
{
    let result = acquire().and_then(|device| RenderSession::new(device, config, sources));
    if let Err(err) = &result {
        log::error!("setup failed: {err}");
        if let SetupError::ShaderCompile { code, .. } = err {
            log::debug!("offending source:\n{code}");
        }
        fallback.show_message(err.user_message());
    }
    result
}

// ---------------------------------------------------------------------------
// RenderSession
// ---------------------------------------------------------------------------

struct OffscreenTarget<T> {
    spec: TargetSpec,
    size: Size,
    handle: T,
}

/// Owns the device and every resource created from it, plus the input state.
pub struct RenderSession<D: GraphicsDevice> {
    device: D,
    variant: Variant,
    program: D::Program,
    geometry: D::Geometry,
    target: Option<OffscreenTarget<D::Target>>,
    interaction: InteractionState,
    surface: Size,
}

impl<D: GraphicsDevice> RenderSession<D> {
    /// Build the pipeline, upload geometry and allocate the target.
    pub fn new(
        mut device: D,
        config: &SessionConfig,
        sources: &ShaderSources,
    ) -> Result<Self, SetupError> {
        let variant = config.variant;
        let surface = device.surface_size();
        log::info!("Setting up {} at {}", variant.name(), surface);

        let options = LinkOptions::for_geometry(variant.geometry(), variant.depth_test());
        let program = match build_pipeline(&mut device, sources, &options, config.validate_pipeline)
        {
            Ok(program) => program,
            Err(err) => {
                device.blank_surface();
                return Err(err);
            }
        };
        log::info!("Pipeline active");

        let geometry = device.upload_geometry(variant.geometry());

        let target = variant.target().map(|spec| {
            let size = spec.resolve(surface);
            log::debug!("Allocating {:?} render target {}", spec.mode, size);
            OffscreenTarget {
                spec,
                size,
                handle: device.create_target(size, spec.mode),
            }
        });

        Ok(Self {
            device,
            variant,
            program,
            geometry,
            target,
            interaction: InteractionState::new(),
            surface,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Viewport used by the on-screen pass of the next frame.
    pub fn viewport(&self) -> Size {
        self.surface
    }

    pub fn target_size(&self) -> Option<Size> {
        self.target.as_ref().map(|t| t.size)
    }

    // -------------------------------------------------------------------------
    // Host events
    // -------------------------------------------------------------------------

    /// Apply a new surface size. Zero-sized surfaces are ignored.
    pub fn resize(&mut self, size: Size) {
        if size.is_empty() || size == self.surface {
            return;
        }
        log::debug!("Resizing to {}", size);
        self.surface = size;
        self.device.resize_surface(size);

        if let Some(target) = &mut self.target {
            if target.spec.follows_surface() {
                target.size = size;
                target.handle = self.device.create_target(size, target.spec.mode);
            }
        }
    }

    /// Pointer move for a drawable filling the window's client area.
    pub fn pointer_moved_in_surface(&mut self, x: f32, y: f32) {
        let [w, h] = self.surface.as_f32();
        self.interaction
            .pointer_moved(x, y, &SurfaceBounds::at_origin(w, h));
    }

    pub fn pointer_pressed(&mut self) {
        self.interaction.pointer_pressed();
    }

    pub fn pointer_released(&mut self) {
        self.interaction.pointer_released();
    }

    // -------------------------------------------------------------------------
    // Render
    // -------------------------------------------------------------------------

    /// Run one draw cycle: off-screen pass (if any), flush, on-screen pass,
    /// flush, present.
    pub fn render_frame(&mut self, time: f32) -> Result<(), D::FrameError> {
        self.device.begin_frame()?;

        // Consume the click only once the frame is certain to be drawn.
        let buttons = self.interaction.take_flags();
        let target_size = self.target.as_ref().map_or(self.surface, |t| t.size);
        let projection = if self.variant.depth_test() {
            perspective(self.surface.aspect())
        } else {
            Mat4::IDENTITY
        };
        let inputs = FrameInputs {
            resolution: self.surface,
            target_size,
            pointer: self.interaction.pointer(),
            buttons,
            pass_index: SURFACE_PASS,
            time,
            projection,
            model_view: Mat4::IDENTITY,
        };

        match &self.target {
            Some(target) => {
                let offscreen = inputs.for_pass(OFFSCREEN_PASS);
                let capture = target.spec.mode == TargetMode::CaptureSurface;

                self.device.draw(Pass {
                    destination: Destination::Target(&target.handle),
                    viewport: target.size,
                    program: &self.program,
                    geometry: &self.geometry,
                    sample: if capture {
                        Sample::History(&target.handle)
                    } else {
                        Sample::Nothing
                    },
                    inputs: &offscreen,
                });
                self.device.flush();

                self.device.draw(Pass {
                    destination: Destination::Surface,
                    viewport: self.surface,
                    program: &self.program,
                    geometry: &self.geometry,
                    sample: Sample::Target(&target.handle),
                    inputs: &inputs,
                });
                if capture {
                    self.device.capture_surface(&target.handle);
                }
            }
            None => {
                self.device.draw(Pass {
                    destination: Destination::Surface,
                    viewport: self.surface,
                    program: &self.program,
                    geometry: &self.geometry,
                    sample: Sample::Nothing,
                    inputs: &inputs,
                });
            }
        }

        self.device.flush();
        self.device.end_frame();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
