use std::sync::Arc;

use ash::vk;
use ash::vk::Handle as _;
use vetro_core::gpu;
use vetro_core::gpu::{
    OutOfMemoryError,
    TextureInfo,
};

use super::*;
use crate::format::{
    format_to_vk,
    samples_to_vk,
    texture_dimension_to_vk,
    texture_usage_to_vk,
};

pub struct VkTexture {
    image: vk::Image,
    device: Arc<RawVkDevice>,
    allocation: Option<gpu_allocator::vulkan::Allocation>,
    info: TextureInfo,
    owns_image: bool,
}

unsafe impl Send for VkTexture {}
unsafe impl Sync for VkTexture {}

impl VkTexture {
    pub(crate) unsafe fn new(
        device: &Arc<RawVkDevice>,
        info: &TextureInfo,
        name: Option<&str>,
    ) -> Result<Self, OutOfMemoryError> {
        let create_info = vk::ImageCreateInfo {
            image_type: texture_dimension_to_vk(info.dimension),
            format: format_to_vk(info.format),
            extent: vk::Extent3D {
                width: info.width,
                height: info.height,
                depth: info.depth,
            },
            mip_levels: info.mip_levels,
            array_layers: info.array_length,
            samples: samples_to_vk(info.samples),
            tiling: vk::ImageTiling::OPTIMAL,
            usage: texture_usage_to_vk(info.usage, info.format),
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            initial_layout: vk::ImageLayout::UNDEFINED,
            ..Default::default()
        };
        let image_res = unsafe { device.create_image(&create_info, None) };
        if let Err(e) = image_res {
            if e == vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
                || e == vk::Result::ERROR_OUT_OF_HOST_MEMORY
            {
                return Err(OutOfMemoryError {});
            }
        }
        let image = image_res.unwrap();

        let requirements = unsafe { device.get_image_memory_requirements(image) };
        let allocation = match device.allocate(
            name.unwrap_or("texture"),
            requirements,
            gpu::MemoryUsage::GpuOnly,
            false,
        ) {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe {
                    device.destroy_image(image, None);
                }
                return Err(e);
            }
        };

        let bind_result =
            unsafe { device.bind_image_memory(image, allocation.memory(), allocation.offset()) };
        if bind_result.is_err() {
            device.free(allocation);
            unsafe {
                device.destroy_image(image, None);
            }
            return Err(OutOfMemoryError {});
        }

        if let Some(name) = name {
            device.set_object_name(vk::ObjectType::IMAGE, image.as_raw(), name);
        }

        Ok(Self {
            image,
            device: device.clone(),
            allocation: Some(allocation),
            info: *info,
            owns_image: true,
        })
    }

    /// Wraps an image owned by somebody else, typically a swapchain.
    pub(crate) fn from_image(device: &Arc<RawVkDevice>, image: vk::Image, info: TextureInfo) -> Self {
        Self {
            image,
            device: device.clone(),
            allocation: None,
            info,
            owns_image: false,
        }
    }

    #[inline(always)]
    pub fn handle(&self) -> vk::Image {
        self.image
    }
}

impl Drop for VkTexture {
    fn drop(&mut self) {
        if self.owns_image {
            unsafe {
                self.device.destroy_image(self.image, None);
            }
        }
        if let Some(allocation) = self.allocation.take() {
            self.device.free(allocation);
        }
    }
}

impl gpu::Texture for VkTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl PartialEq for VkTexture {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image
    }
}

impl Eq for VkTexture {}
