use std::num::NonZeroU64;

use quad_core::device::{Destination, GraphicsDevice, LinkOptions, Pass, Sample};
use quad_core::geometry::{Geometry, Topology};
use quad_core::target::TargetMode;
use quad_core::{SetupError, ShaderStage, Size};
use wgpu::util::DeviceExt;
use wgpu::{BindGroupLayout, Buffer, Device};

use crate::context::{GpuContext, Uniforms};
use crate::target::{create_depth_view, extent, GpuTarget, DEPTH_FORMAT};

/// Vertex shader entry point every program must export.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment shader entry point every program must export.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Uniform slots per frame: one per pass.
const UNIFORM_SLOTS: u64 = 2;

pub struct GpuShader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
}

pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    vertex_stride: u64,
    depth_test: bool,
}

pub struct GpuGeometry {
    buffer: Buffer,
    vertex_count: u32,
}

struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    next_slot: u64,
}

/// `GraphicsDevice` on wgpu.
///
/// Bind group 0 is shared by every program:
///   binding 0 : Uniforms (dynamic offset, one slot per pass)
///   binding 1 : input texture (placeholder when a pass samples nothing)
///   binding 2 : linear clamp sampler
pub struct WgpuDevice {
    ctx: GpuContext,
    bind_group_layout: BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    placeholder_view: wgpu::TextureView,
    uniform_buf: Buffer,
    uniform_stride: u64,
    depth_view: Option<wgpu::TextureView>,
    depth_test: bool,
    frame: Option<Frame>,
    warned_capture: bool,
}

impl WgpuDevice {
    /// Acquire a context for `target`, failing with `ContextUnavailable`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: Size,
    ) -> Result<Self, SetupError> {
        let ctx = GpuContext::new(target, size)?;
        Ok(Self::with_context(ctx))
    }

    pub fn with_context(ctx: GpuContext) -> Self {
        let device = &ctx.device;

        // --- bind group layout -------------------------------------------------
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<Uniforms>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        // --- uniform buffer ----------------------------------------------------
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = (std::mem::size_of::<Uniforms>() as u64).div_ceil(align) * align;
        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_uniforms"),
            size: uniform_stride * UNIFORM_SLOTS,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // --- placeholder input texture ----------------------------------------
        let placeholder_view = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("placeholder_input"),
                size: extent(Size::new(1, 1)),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&Default::default());

        Self {
            ctx,
            bind_group_layout,
            pipeline_layout,
            sampler,
            placeholder_view,
            uniform_buf,
            uniform_stride,
            depth_view: None,
            depth_test: false,
            frame: None,
            warned_capture: false,
        }
    }

    /// Reapply the surface configuration after `Lost`/`Outdated`.
    pub fn reconfigure_surface(&mut self) {
        self.frame = None;
        self.ctx.reconfigure();
    }

    fn bind_group(&self, layout: &BindGroupLayout, input: &wgpu::TextureView) -> wgpu::BindGroup {
        self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.uniform_buf,
                        offset: 0,
                        size: NonZeroU64::new(std::mem::size_of::<Uniforms>() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Run `f` inside a validation error scope and report what it raised.
    fn scoped<T>(&self, f: impl FnOnce(&Device) -> T) -> Result<T, String> {
        self.ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.ctx.device);
        match pollster::block_on(self.ctx.device.pop_error_scope()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }

    fn new_encoder(&self) -> wgpu::CommandEncoder {
        self.ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            })
    }
}

impl GraphicsDevice for WgpuDevice {
    type Shader = GpuShader;
    type Program = GpuProgram;
    type Geometry = GpuGeometry;
    type Target = GpuTarget;
    type FrameError = wgpu::SurfaceError;

    fn surface_size(&self) -> Size {
        self.ctx.size()
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<GpuShader, String> {
        let label = match stage {
            ShaderStage::Vertex => "vertex_stage",
            ShaderStage::Fragment => "fragment_stage",
        };
        let module = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;
        Ok(GpuShader { stage, module })
    }

    fn link_program(
        &mut self,
        vertex: GpuShader,
        fragment: GpuShader,
        options: &LinkOptions,
    ) -> Result<GpuProgram, String> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err("stages attached in the wrong slots".into());
        }

        let attribute = wgpu::VertexAttribute {
            format: match options.vertex_components {
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                n => return Err(format!("unsupported vertex size: {n} components")),
            },
            offset: 0,
            shader_location: 0,
        };
        let topology = match options.topology {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        };
        let depth_stencil = options.depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        });
        let vertex_stride = u64::from(options.vertex_components) * 4;
        let format = self.ctx.config.format;
        let layout = &self.pipeline_layout;

        let pipeline = self.scoped(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("quad_pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: VERTEX_ENTRY,
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: vertex_stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[attribute],
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: FRAGMENT_ENTRY,
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..Default::default()
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        if options.depth_test {
            self.depth_test = true;
            self.depth_view = Some(create_depth_view(&self.ctx.device, self.ctx.size()));
        }

        Ok(GpuProgram {
            pipeline,
            vertex_stride,
            depth_test: options.depth_test,
        })
    }

    fn validate_program(&mut self, program: &GpuProgram) -> Result<(), String> {
        let bind_group = self.bind_group(&self.bind_group_layout, &self.placeholder_view);
        validate_draw(
            &self.ctx.device,
            program,
            &bind_group,
            &[0],
            self.ctx.config.format,
        )
    }

    fn upload_geometry(&mut self, geometry: &Geometry) -> GpuGeometry {
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad_vertices"),
                contents: bytemuck::cast_slice(geometry.positions()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        GpuGeometry {
            buffer,
            vertex_count: geometry.vertex_count(),
        }
    }

    fn create_target(&mut self, size: Size, mode: TargetMode) -> GpuTarget {
        GpuTarget::new(
            &self.ctx.device,
            size,
            mode,
            self.ctx.config.format,
            self.depth_test,
        )
    }

    fn resize_surface(&mut self, size: Size) {
        self.ctx.resize(size);
        if self.depth_test {
            self.depth_view = Some(create_depth_view(&self.ctx.device, self.ctx.size()));
        }
    }

    fn begin_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.ctx.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(Frame {
            surface_texture,
            view,
            encoder: self.new_encoder(),
            next_slot: 0,
        });
        Ok(())
    }

    fn draw(&mut self, pass: Pass<'_, Self>) {
        // Each pass gets its own uniform slot so both passes of a frame keep
        // their own values until submission.
        let Some(slot) = self.frame.as_mut().map(|frame| {
            frame.next_slot += 1;
            (frame.next_slot - 1) % UNIFORM_SLOTS
        }) else {
            log::warn!("draw outside of a frame ignored");
            return;
        };
        let offset = slot * self.uniform_stride;
        self.ctx.queue.write_buffer(
            &self.uniform_buf,
            offset,
            bytemuck::bytes_of(&Uniforms::from(pass.inputs)),
        );

        let input = match pass.sample {
            Sample::Nothing => &self.placeholder_view,
            Sample::Target(t) => &t.view,
            Sample::History(t) => t.history_view().unwrap_or(&self.placeholder_view),
        };
        let bind_group = self.bind_group(&self.bind_group_layout, input);

        let depth_view = match pass.destination {
            Destination::Surface => self.depth_view.as_ref(),
            Destination::Target(t) => t.depth_view.as_ref(),
        }
        .filter(|_| pass.program.depth_test);

        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let color_view = match pass.destination {
            Destination::Surface => &frame.view,
            Destination::Target(t) => &t.view,
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quad-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: depth_view.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_viewport(
            0.0,
            0.0,
            pass.viewport.width as f32,
            pass.viewport.height as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(&pass.program.pipeline);
        rpass.set_bind_group(0, &bind_group, &[offset as u32]);
        rpass.set_vertex_buffer(0, pass.geometry.buffer.slice(..));
        rpass.draw(0..pass.geometry.vertex_count, 0..1);
    }

    fn flush(&mut self) {
        let encoder = self.new_encoder();
        if let Some(frame) = self.frame.as_mut() {
            let finished = std::mem::replace(&mut frame.encoder, encoder);
            self.ctx.queue.submit(std::iter::once(finished.finish()));
        }
    }

    fn capture_surface(&mut self, target: &GpuTarget) {
        if !self.ctx.surface_copyable {
            if !self.warned_capture {
                log::warn!("Skipping surface capture: surface is not a copy source");
                self.warned_capture = true;
            }
            return;
        }
        let (Some(frame), Some((history, _))) = (self.frame.as_mut(), target.history.as_ref())
        else {
            return;
        };
        let size = Size::new(
            frame.surface_texture.texture.width().min(target.size.width),
            frame.surface_texture.texture.height().min(target.size.height),
        );
        frame.encoder.copy_texture_to_texture(
            frame.surface_texture.texture.as_image_copy(),
            history.as_image_copy(),
            extent(size),
        );
    }

    fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.ctx.queue.submit(std::iter::once(frame.encoder.finish()));
            frame.surface_texture.present();
        }
    }

    fn blank_surface(&mut self) {
        self.frame = None;
        let surface_texture = match self.ctx.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("could not blank surface: {e}");
                return;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.new_encoder();
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blank-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }
}

/// Record one draw of `program` into a throwaway 1×1 attachment and report
/// whatever validation error encoding it raises.
///
/// This catches mismatches between the program and the state it will be
/// drawn with: bind group, dynamic offsets, vertex stride, depth attachment.
fn validate_draw(
    device: &Device,
    program: &GpuProgram,
    bind_group: &wgpu::BindGroup,
    offsets: &[u32],
    format: wgpu::TextureFormat,
) -> Result<(), String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let one = Size::new(1, 1);
    let color = device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("validation_target"),
            size: extent(one),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default());
    let depth = program.depth_test.then(|| create_depth_view(device, one));
    let vertices = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("validation_vertices"),
        size: program.vertex_stride * 3,
        usage: wgpu::BufferUsages::VERTEX,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("validation-encoder"),
    });
    {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("validation-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color,
                resolve_target: None,
                ops: wgpu::Operations::default(),
            })],
            depth_stencil_attachment: depth.as_ref().map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations::default()),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&program.pipeline);
        rpass.set_bind_group(0, bind_group, offsets);
        rpass.set_vertex_buffer(0, vertices.slice(..));
        rpass.draw(0..3, 0..1);
    }
    // Never submitted; encoding alone raises the errors.
    drop(encoder.finish());

    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err.to_string()),
        None => Ok(()),
    }
}
