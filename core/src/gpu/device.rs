use thiserror::Error;

use super::*;

pub const WHOLE_BUFFER: u64 = u64::MAX;

/// Frames the GPU may be working on at once. Resources that leave scope are
/// only freed once this many frames have passed since they were retired.
pub const DEFAULT_MAX_FRAMES_IN_FLIGHT: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryUsage {
  GpuOnly,
  CpuToGpu,
  GpuToCpu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("out of device memory")]
pub struct OutOfMemoryError {}

#[derive(Clone, Debug, Error)]
pub enum DeviceCreateError {
  #[error("adapter has no graphics queue family")]
  NoGraphicsQueue,
  #[error("out of device memory")]
  OutOfMemory,
  #[error("device creation failed: {0}")]
  Backend(String),
}

pub trait Device<B: GPUBackend> {
  unsafe fn create_buffer(
    &self,
    info: &BufferInfo,
    memory_usage: MemoryUsage,
    name: Option<&str>,
  ) -> Result<B::Buffer, OutOfMemoryError>;
  unsafe fn create_texture(
    &self,
    info: &TextureInfo,
    name: Option<&str>,
  ) -> Result<B::Texture, OutOfMemoryError>;
  unsafe fn create_bind_group_layout(
    &self,
    info: &BindGroupLayoutInfo,
    name: Option<&str>,
  ) -> Result<B::BindGroupLayout, OutOfMemoryError>;
  unsafe fn create_swapchain(
    &self,
    surface: B::Surface,
    info: &SwapchainInfo,
  ) -> Result<B::Swapchain, SwapchainError>;
  unsafe fn wait_for_idle(&self);
}
