use quad_core::target::TargetMode;
use quad_core::Size;
use wgpu::Device;

/// Off-screen color target, plus a history texture when it captures the
/// surface. Both use the surface format so one pipeline can render into
/// the target and the surface alike.
pub struct GpuTarget {
    pub size: Size,
    pub tex: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub history: Option<(wgpu::Texture, wgpu::TextureView)>,
    /// Present only for programs that depth test.
    pub depth_view: Option<wgpu::TextureView>,
}

impl GpuTarget {
    pub fn new(
        device: &Device,
        size: Size,
        mode: TargetMode,
        format: wgpu::TextureFormat,
        depth: bool,
    ) -> Self {
        // wgpu zero-initializes new textures, which gives the empty image.
        let desc = wgpu::TextureDescriptor {
            label: None,
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen_target"),
            ..desc
        });
        let view = tex.create_view(&Default::default());

        let history = (mode == TargetMode::CaptureSurface).then(|| {
            let tex = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("surface_history"),
                usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
                ..desc
            });
            let view = tex.create_view(&Default::default());
            (tex, view)
        });

        let depth_view = depth.then(|| create_depth_view(device, size));

        Self {
            size,
            tex,
            view,
            history,
            depth_view,
        }
    }

    pub fn history_view(&self) -> Option<&wgpu::TextureView> {
        self.history.as_ref().map(|(_, view)| view)
    }
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn create_depth_view(device: &Device, size: Size) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default())
}

pub fn extent(size: Size) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    }
}
