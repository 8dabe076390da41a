use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::gpu::{
    self,
    Device as _,
    GPUBackend,
    Swapchain as _,
};

use super::*;

pub struct Swapchain<B: GPUBackend> {
    swapchain: ManuallyDrop<B::Swapchain>,
    destroyer: Arc<DeferredDestroyer<B>>,
}

impl<B: GPUBackend> Swapchain<B> {
    pub(super) fn new(
        device: &Arc<B::Device>,
        destroyer: &Arc<DeferredDestroyer<B>>,
        surface: B::Surface,
        info: &gpu::SwapchainInfo,
    ) -> Result<Self, gpu::SwapchainError> {
        let swapchain = unsafe { device.create_swapchain(surface, info) }?;
        Ok(Self {
            swapchain: ManuallyDrop::new(swapchain),
            destroyer: destroyer.clone(),
        })
    }

    pub fn format(&self) -> gpu::Format {
        self.swapchain.format()
    }

    pub fn surface(&self) -> &B::Surface {
        self.swapchain.surface()
    }

    pub fn width(&self) -> u32 {
        self.swapchain.width()
    }

    pub fn height(&self) -> u32 {
        self.swapchain.height()
    }

    /// Tears down and rebuilds the backend swapchain in place, typically after
    /// a window resize or after a present reported
    /// [`SwapchainError::NeedsRecreation`](gpu::SwapchainError).
    pub fn recreate(&mut self, width: u32, height: u32) -> Result<(), gpu::SwapchainError> {
        unsafe { self.swapchain.recreate(width, height) }
    }

    pub fn next_backbuffer(&mut self) -> Result<u32, gpu::SwapchainError> {
        unsafe { self.swapchain.next_backbuffer() }
    }

    /// The index has to come from [`next_backbuffer`](Self::next_backbuffer).
    pub fn backbuffer_texture(&self, index: u32) -> &B::Texture {
        unsafe { self.swapchain.backbuffer_texture(index) }
    }

    pub fn present(&mut self) -> Result<(), gpu::SwapchainError> {
        unsafe { self.swapchain.present() }
    }
}

impl<B: GPUBackend> Drop for Swapchain<B> {
    fn drop(&mut self) {
        let swapchain = unsafe { ManuallyDrop::take(&mut self.swapchain) };
        self.destroyer.destroy_swapchain(swapchain);
    }
}
