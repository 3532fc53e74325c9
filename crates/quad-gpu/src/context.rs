use quad_core::frame::FrameInputs;
use quad_core::{SetupError, Size};
use wgpu::{Device, Instance, Queue, Surface, SurfaceConfiguration};

/// The wgpu objects bound to one drawable surface.
pub struct GpuContext {
    pub instance: Instance,
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    /// Whether the surface can be a copy source (needed for capture).
    pub surface_copyable: bool,
}

impl GpuContext {
    /// Create instance, surface, adapter and device for `target`.
    ///
    /// Every failure on the way is a missing context.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: Size,
    ) -> Result<Self, SetupError> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| SetupError::ContextUnavailable(format!("surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| SetupError::ContextUnavailable("no suitable GPU adapter found".into()))?;

        log::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("quad-gpu device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| SetupError::ContextUnavailable(format!("device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| SetupError::ContextUnavailable("surface has no formats".into()))?;

        let surface_copyable = caps.usages.contains(wgpu::TextureUsages::COPY_SRC);
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if surface_copyable {
            usage |= wgpu::TextureUsages::COPY_SRC;
        }

        let config = SurfaceConfiguration {
            usage,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {}×{} {:?} Fifo",
            config.width,
            config.height,
            format
        );

        Ok(Self {
            instance,
            surface,
            device,
            queue,
            config,
            surface_copyable,
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.config.width, self.config.height)
    }

    /// Reconfigure the surface. Zero sizes are ignored.
    pub fn resize(&mut self, size: Size) {
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

/// All per-pass data uploaded to the GPU as one uniform block.
/// Must match the `Uniforms` struct in every WGSL shader.
/// `repr(C)` + `bytemuck` ensures safe casting to `&[u8]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub resolution: [f32; 2],
    pub target_size: [f32; 2],
    pub pointer: [f32; 2],
    pub clicked: u32,
    pub held: u32,
    pub pass_index: u32,
    pub time: f32,
    pub _pad: [u32; 2], // mat4 fields start on a 16-byte boundary
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
}

impl From<&FrameInputs> for Uniforms {
    fn from(inputs: &FrameInputs) -> Self {
        Self {
            resolution: inputs.resolution.as_f32(),
            target_size: inputs.target_size.as_f32(),
            pointer: inputs.pointer,
            clicked: inputs.buttons.clicked as u32,
            held: inputs.buttons.held as u32,
            pass_index: inputs.pass_index,
            time: inputs.time,
            _pad: [0; 2],
            projection: inputs.projection.to_cols_array_2d(),
            model_view: inputs.model_view.to_cols_array_2d(),
        }
    }
}
