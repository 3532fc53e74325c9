pub mod context;
pub mod device;
pub mod shaders;
pub mod target;

pub use context::GpuContext;
pub use device::WgpuDevice;
pub use shaders::builtin_sources;
