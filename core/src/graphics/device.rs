use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;

use log::debug;

use crate::gpu::{
    self,
    Device as _,
    GPUBackend,
};

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub max_frames_in_flight: u32,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            max_frames_in_flight: gpu::DEFAULT_MAX_FRAMES_IN_FLIGHT,
        }
    }
}

pub struct Device<B: GPUBackend> {
    device: Arc<B::Device>,
    destroyer: Arc<DeferredDestroyer<B>>,
    instance: Arc<Instance<B>>,
    max_frames_in_flight: u32,
    has_context: AtomicBool,
}

impl<B: GPUBackend> Device<B> {
    pub(super) fn new(device: B::Device, instance: Arc<Instance<B>>, info: &DeviceInfo) -> Arc<Self> {
        assert!(info.max_frames_in_flight >= 1);
        Arc::new(Self {
            device: Arc::new(device),
            destroyer: Arc::new(DeferredDestroyer::<B>::new(info.max_frames_in_flight)),
            instance,
            max_frames_in_flight: info.max_frames_in_flight,
            has_context: AtomicBool::new(false),
        })
    }

    /// There can only be one context per device. It owns frame pacing and is
    /// the only place deferred destruction makes progress.
    pub fn create_context(&self) -> GraphicsContext<B> {
        assert!(!self.has_context.swap(true, Ordering::AcqRel));
        GraphicsContext::<B>::new(&self.device, &self.destroyer, self.max_frames_in_flight)
    }

    pub fn create_buffer(
        &self,
        info: &gpu::BufferInfo,
        memory_usage: gpu::MemoryUsage,
        name: Option<&str>,
    ) -> Result<Arc<Buffer<B>>, gpu::OutOfMemoryError> {
        assert!(
            info.size >= gpu::MIN_BUFFER_SIZE,
            "buffer size must be at least {} bytes",
            gpu::MIN_BUFFER_SIZE
        );
        Buffer::<B>::new(&self.device, &self.destroyer, info, memory_usage, name)
    }

    pub fn create_texture(
        &self,
        info: &gpu::TextureInfo,
        name: Option<&str>,
    ) -> Result<Arc<Texture<B>>, gpu::OutOfMemoryError> {
        assert!(
            info.width >= 1 && info.height >= 1 && info.depth >= 1,
            "texture extents must be non zero"
        );
        assert!(
            info.mip_levels >= 1 && info.array_length >= 1,
            "texture mip and layer counts must be non zero"
        );
        Texture::<B>::new(&self.device, &self.destroyer, info, name)
    }

    pub fn create_bind_group_layout(
        &self,
        info: &gpu::BindGroupLayoutInfo,
        name: Option<&str>,
    ) -> Result<Arc<BindGroupLayout<B>>, gpu::OutOfMemoryError> {
        BindGroupLayout::<B>::new(&self.device, &self.destroyer, info, name)
    }

    pub fn create_swapchain(
        &self,
        surface: B::Surface,
        info: &gpu::SwapchainInfo,
    ) -> Result<Swapchain<B>, gpu::SwapchainError> {
        Swapchain::<B>::new(&self.device, &self.destroyer, surface, info)
    }

    pub fn wait_for_idle(&self) {
        unsafe {
            self.device.wait_for_idle();
        }
    }

    /// Resources waiting in the deferred destruction queue. The queue only
    /// shrinks while frames advance, so this growing without bound usually
    /// means nobody is pacing the context.
    pub fn pending_destructions(&self) -> usize {
        self.destroyer.pending_len()
    }

    pub fn max_frames_in_flight(&self) -> u32 {
        self.max_frames_in_flight
    }

    pub fn instance(&self) -> &Arc<Instance<B>> {
        &self.instance
    }

    #[inline(always)]
    pub fn handle(&self) -> &Arc<B::Device> {
        &self.device
    }
}

impl<B: GPUBackend> Drop for Device<B> {
    fn drop(&mut self) {
        self.destroyer.mark_shutting_down();
        unsafe {
            self.device.wait_for_idle();
            self.destroyer.destroy_all();
        }
        debug!("{}: device destroyed", B::name());
    }
}
