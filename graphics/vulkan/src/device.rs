use std::sync::{
    Arc,
    Mutex,
};

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use vetro_core::gpu;
use vetro_core::gpu::{
    BindGroupLayoutInfo,
    BufferInfo,
    MemoryUsage,
    OutOfMemoryError,
    SwapchainError,
    SwapchainInfo,
    TextureInfo,
};

use super::*;

pub struct VkDevice {
    device: Arc<RawVkDevice>,
}

impl VkDevice {
    pub(crate) fn new(
        device: ash::Device,
        instance: &Arc<RawVkInstance>,
        physical_device: vk::PhysicalDevice,
        properties: vk::PhysicalDeviceProperties,
        graphics_queue_family_index: u32,
        allocator: Allocator,
    ) -> Self {
        let graphics_queue = unsafe { device.get_device_queue(graphics_queue_family_index, 0) };
        let swapchain_device = ash::khr::swapchain::Device::new(&instance.instance, &device);
        let debug_utils_device = instance
            .debug_utils
            .as_ref()
            .map(|_| ash::ext::debug_utils::Device::new(&instance.instance, &device));

        Self {
            device: Arc::new(RawVkDevice {
                device,
                physical_device,
                properties,
                graphics_queue_info: VkQueueInfo {
                    queue_family_index: graphics_queue_family_index,
                    queue_index: 0,
                },
                graphics_queue,
                swapchain_device,
                debug_utils_device,
                allocator: Some(Mutex::new(allocator)),
                instance: instance.clone(),
            }),
        }
    }

    #[inline(always)]
    pub fn raw(&self) -> &Arc<RawVkDevice> {
        &self.device
    }
}

impl gpu::Device<VkBackend> for VkDevice {
    unsafe fn create_buffer(
        &self,
        info: &BufferInfo,
        memory_usage: MemoryUsage,
        name: Option<&str>,
    ) -> Result<VkBuffer, OutOfMemoryError> {
        unsafe { VkBuffer::new(&self.device, info, memory_usage, name) }
    }

    unsafe fn create_texture(
        &self,
        info: &TextureInfo,
        name: Option<&str>,
    ) -> Result<VkTexture, OutOfMemoryError> {
        unsafe { VkTexture::new(&self.device, info, name) }
    }

    unsafe fn create_bind_group_layout(
        &self,
        info: &BindGroupLayoutInfo,
        name: Option<&str>,
    ) -> Result<VkBindGroupLayout, OutOfMemoryError> {
        unsafe { VkBindGroupLayout::new(&self.device, info, name) }
    }

    unsafe fn create_swapchain(
        &self,
        surface: VkSurface,
        info: &SwapchainInfo,
    ) -> Result<VkSwapchain, SwapchainError> {
        unsafe { VkSwapchain::new(&self.device, surface, info) }
    }

    unsafe fn wait_for_idle(&self) {
        self.device.wait_for_idle();
    }
}
