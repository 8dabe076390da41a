use vetro_core::gpu::GPUBackend;

use crate::*;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum VkBackend {}

impl GPUBackend for VkBackend {
    type Instance = VkInstance;
    type Adapter = VkAdapter;
    type Device = VkDevice;
    type Surface = VkSurface;
    type Swapchain = VkSwapchain;
    type Buffer = VkBuffer;
    type Texture = VkTexture;
    type BindGroupLayout = VkBindGroupLayout;

    fn name() -> &'static str {
        "Vulkan"
    }
}
