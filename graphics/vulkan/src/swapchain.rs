use std::cmp::{
    max,
    min,
};
use std::collections::VecDeque;
use std::hash::{
    Hash,
    Hasher,
};
use std::sync::Arc;

use ash::vk;
use log::warn;
use smallvec::SmallVec;
use vetro_core::gpu;
use vetro_core::gpu::{
    Format,
    PresentMode,
    SampleCount,
    SwapchainError,
    SwapchainInfo,
    TextureDimension,
    TextureInfo,
    TextureUsage,
};

use super::*;
use crate::format::{
    present_mode_to_vk,
    surface_vk_format_to_format,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum VkSwapchainState {
    Okay,
    Suboptimal,
    OutOfDate,
}

pub struct VkSwapchain {
    swapchain: vk::SwapchainKHR,
    textures: SmallVec<[VkTexture; 5]>,
    acquire_semaphores: SmallVec<[VkBinarySemaphore; 5]>,
    acquire_counter: u64,
    // Acquired images that have not been presented yet, oldest first.
    pending: VecDeque<(u32, u32)>,
    state: VkSwapchainState,
    format: Format,
    width: u32,
    height: u32,
    present_mode: PresentMode,
    surface: VkSurface,
    device: Arc<RawVkDevice>,
}

impl VkSwapchain {
    pub(crate) unsafe fn new(
        device: &Arc<RawVkDevice>,
        surface: VkSurface,
        info: &SwapchainInfo,
    ) -> Result<Self, SwapchainError> {
        if info.width == 0 || info.height == 0 {
            return Err(SwapchainError::ZeroExtents);
        }

        let (swapchain, textures, format, extent) = Self::create_swapchain_and_textures(
            device,
            &surface,
            info.width,
            info.height,
            info.present_mode,
            None,
        )?;

        let acquire_semaphores: SmallVec<[VkBinarySemaphore; 5]> = (0..textures.len())
            .map(|_| VkBinarySemaphore::new(device))
            .collect();

        Ok(Self {
            swapchain,
            textures,
            acquire_semaphores,
            acquire_counter: 0u64,
            pending: VecDeque::new(),
            state: VkSwapchainState::Okay,
            format,
            width: extent.width,
            height: extent.height,
            present_mode: info.present_mode,
            surface,
            device: device.clone(),
        })
    }

    unsafe fn create_swapchain_and_textures(
        device: &Arc<RawVkDevice>,
        surface: &VkSurface,
        width: u32,
        height: u32,
        present_mode: PresentMode,
        old_swapchain: Option<vk::SwapchainKHR>,
    ) -> Result<(vk::SwapchainKHR, SmallVec<[VkTexture; 5]>, Format, vk::Extent2D), SwapchainError>
    {
        let physical_device = device.physical_device;
        let capabilities = surface
            .get_capabilities(physical_device)
            .map_err(surface_result_to_error)?;
        let formats = surface
            .get_formats(physical_device)
            .map_err(surface_result_to_error)?;
        let present_modes = surface
            .get_present_modes(physical_device)
            .map_err(surface_result_to_error)?;

        let extent = Self::pick_extent(&capabilities, width, height);
        if extent.width == 0 || extent.height == 0 {
            return Err(SwapchainError::ZeroExtents);
        }

        let (surface_format, format) =
            Self::pick_format(&formats).ok_or(SwapchainError::Other)?;
        let vk_present_mode = Self::pick_present_mode(present_mode, &present_modes);
        let image_count = Self::pick_image_count(&capabilities, 3);

        let mut usage = TextureUsage::RENDER_TARGET;
        let mut vk_usage = vk::ImageUsageFlags::COLOR_ATTACHMENT;
        if capabilities
            .supported_usage_flags
            .contains(vk::ImageUsageFlags::TRANSFER_DST)
        {
            usage |= TextureUsage::COPY_DST;
            vk_usage |= vk::ImageUsageFlags::TRANSFER_DST;
        }

        let pre_transform = if capabilities
            .supported_transforms
            .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
        {
            vk::SurfaceTransformFlagsKHR::IDENTITY
        } else {
            capabilities.current_transform
        };

        let create_info = vk::SwapchainCreateInfoKHR {
            surface: surface.surface_handle(),
            min_image_count: image_count,
            image_format: surface_format.format,
            image_color_space: surface_format.color_space,
            image_extent: extent,
            image_array_layers: 1,
            image_usage: vk_usage,
            present_mode: vk_present_mode,
            image_sharing_mode: vk::SharingMode::EXCLUSIVE,
            pre_transform,
            composite_alpha: if capabilities
                .supported_composite_alpha
                .contains(vk::CompositeAlphaFlagsKHR::OPAQUE)
            {
                vk::CompositeAlphaFlagsKHR::OPAQUE
            } else {
                vk::CompositeAlphaFlagsKHR::INHERIT
            },
            clipped: vk::TRUE,
            old_swapchain: old_swapchain.unwrap_or_default(),
            ..Default::default()
        };

        let swapchain = unsafe {
            device
                .swapchain_device
                .create_swapchain(&create_info, None)
        }
        .map_err(surface_result_to_error)?;

        let swapchain_images = match unsafe {
            device.swapchain_device.get_swapchain_images(swapchain)
        } {
            Ok(images) => images,
            Err(e) => {
                unsafe {
                    device.swapchain_device.destroy_swapchain(swapchain, None);
                }
                return Err(surface_result_to_error(e));
            }
        };
        let textures: SmallVec<[VkTexture; 5]> = swapchain_images
            .iter()
            .map(|image| {
                VkTexture::from_image(
                    device,
                    *image,
                    TextureInfo {
                        dimension: TextureDimension::Dim2D,
                        format,
                        width: extent.width,
                        height: extent.height,
                        depth: 1u32,
                        mip_levels: 1u32,
                        array_length: 1u32,
                        samples: SampleCount::Samples1,
                        usage,
                    },
                )
            })
            .collect();

        Ok((swapchain, textures, format, extent))
    }

    fn pick_extent(
        capabilities: &vk::SurfaceCapabilitiesKHR,
        preferred_width: u32,
        preferred_height: u32,
    ) -> vk::Extent2D {
        if capabilities.current_extent.width != u32::MAX
            && capabilities.current_extent.height != u32::MAX
        {
            capabilities.current_extent
        } else {
            vk::Extent2D {
                width: min(
                    max(preferred_width, capabilities.min_image_extent.width),
                    capabilities.max_image_extent.width,
                ),
                height: min(
                    max(preferred_height, capabilities.min_image_extent.height),
                    capabilities.max_image_extent.height,
                ),
            }
        }
    }

    fn pick_format(formats: &[vk::SurfaceFormatKHR]) -> Option<(vk::SurfaceFormatKHR, Format)> {
        if formats.len() == 1 && formats[0].format == vk::Format::UNDEFINED {
            // The surface does not care, so take the most common one.
            return Some((
                vk::SurfaceFormatKHR {
                    format: vk::Format::B8G8R8A8_UNORM,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                },
                Format::BGRA8UNorm,
            ));
        }

        let preferred = formats.iter().find(|format| {
            (format.format == vk::Format::B8G8R8A8_UNORM
                || format.format == vk::Format::R8G8B8A8_UNORM)
                && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        });
        if let Some(surface_format) = preferred {
            let format = surface_vk_format_to_format(surface_format.format)?;
            return Some((*surface_format, format));
        }

        formats.iter().find_map(|surface_format| {
            if surface_format.color_space != vk::ColorSpaceKHR::SRGB_NONLINEAR {
                return None;
            }
            surface_vk_format_to_format(surface_format.format)
                .map(|format| (*surface_format, format))
        })
    }

    fn pick_image_count(capabilities: &vk::SurfaceCapabilitiesKHR, preferred: u32) -> u32 {
        let mut image_count = max(capabilities.min_image_count + 1, preferred);
        if capabilities.max_image_count != 0 {
            image_count = min(capabilities.max_image_count, image_count);
        }
        image_count
    }

    fn pick_present_mode(
        preferred: PresentMode,
        present_modes: &[vk::PresentModeKHR],
    ) -> vk::PresentModeKHR {
        let wanted = present_mode_to_vk(preferred);
        if present_modes.contains(&wanted) {
            return wanted;
        }
        // FIFO support is mandatory.
        vk::PresentModeKHR::FIFO
    }

    #[inline(always)]
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }
}

impl Drop for VkSwapchain {
    fn drop(&mut self) {
        self.device.wait_for_idle();
        unsafe {
            self.device
                .swapchain_device
                .destroy_swapchain(self.swapchain, None);
        }
    }
}

impl gpu::Swapchain<VkBackend> for VkSwapchain {
    fn format(&self) -> Format {
        self.format
    }

    fn surface(&self) -> &VkSurface {
        &self.surface
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    unsafe fn recreate(&mut self, width: u32, height: u32) -> Result<(), SwapchainError> {
        if width == 0 || height == 0 {
            return Err(SwapchainError::ZeroExtents);
        }

        self.device.wait_for_idle();

        let result = unsafe {
            Self::create_swapchain_and_textures(
                &self.device,
                &self.surface,
                width,
                height,
                self.present_mode,
                Some(self.swapchain),
            )
        };
        let (swapchain, textures, format, extent) = match result {
            Ok(created) => created,
            Err(e) => {
                // A failed create still retires the old swapchain.
                self.state = VkSwapchainState::OutOfDate;
                return Err(e);
            }
        };

        unsafe {
            self.device
                .swapchain_device
                .destroy_swapchain(self.swapchain, None);
        }

        self.swapchain = swapchain;
        self.textures = textures;
        self.acquire_semaphores = (0..self.textures.len())
            .map(|_| VkBinarySemaphore::new(&self.device))
            .collect();
        self.acquire_counter = 0;
        self.pending.clear();
        self.state = VkSwapchainState::Okay;
        self.format = format;
        self.width = extent.width;
        self.height = extent.height;
        Ok(())
    }

    unsafe fn next_backbuffer(&mut self) -> Result<u32, SwapchainError> {
        if self.state == VkSwapchainState::OutOfDate {
            return Err(SwapchainError::NeedsRecreation);
        }
        assert!(
            self.pending.len() < self.textures.len(),
            "all backbuffers are acquired, present one first"
        );

        let semaphore_index =
            (self.acquire_counter % self.acquire_semaphores.len() as u64) as u32;
        let semaphore = &self.acquire_semaphores[semaphore_index as usize];

        let result = unsafe {
            self.device.swapchain_device.acquire_next_image(
                self.swapchain,
                u64::MAX,
                semaphore.handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => {
                if suboptimal && self.state == VkSwapchainState::Okay {
                    self.state = VkSwapchainState::Suboptimal;
                }
                self.acquire_counter += 1;
                self.pending.push_back((image_index, semaphore_index));
                Ok(image_index)
            }
            // The semaphore is untouched in the error case and gets reused.
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.state = VkSwapchainState::OutOfDate;
                Err(SwapchainError::NeedsRecreation)
            }
            Err(e) => {
                warn!("Acquiring a backbuffer failed: {:?}", e);
                Err(surface_result_to_error(e))
            }
        }
    }

    unsafe fn backbuffer_texture(&self, index: u32) -> &VkTexture {
        &self.textures[index as usize]
    }

    unsafe fn present(&mut self) -> Result<(), SwapchainError> {
        let (image_index, semaphore_index) = self
            .pending
            .pop_front()
            .expect("present without an acquired backbuffer");
        let wait_semaphore = self.acquire_semaphores[semaphore_index as usize].handle();

        let present_info = vk::PresentInfoKHR {
            wait_semaphore_count: 1,
            p_wait_semaphores: &wait_semaphore as *const vk::Semaphore,
            swapchain_count: 1,
            p_swapchains: &self.swapchain as *const vk::SwapchainKHR,
            p_image_indices: &image_index as *const u32,
            ..Default::default()
        };
        let result = unsafe {
            self.device
                .swapchain_device
                .queue_present(self.device.graphics_queue, &present_info)
        };

        match result {
            Ok(suboptimal) => {
                if suboptimal && self.state == VkSwapchainState::Okay {
                    self.state = VkSwapchainState::Suboptimal;
                }
                Ok(())
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.state = VkSwapchainState::OutOfDate;
                Err(SwapchainError::NeedsRecreation)
            }
            Err(e) => {
                warn!("Presenting failed: {:?}", e);
                Err(surface_result_to_error(e))
            }
        }
    }
}

fn surface_result_to_error(result: vk::Result) -> SwapchainError {
    match result {
        vk::Result::ERROR_SURFACE_LOST_KHR => SwapchainError::SurfaceLost,
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            SwapchainError::OutOfMemory
        }
        _ => SwapchainError::Other,
    }
}

pub struct VkBinarySemaphore {
    device: Arc<RawVkDevice>,
    semaphore: vk::Semaphore,
}

impl VkBinarySemaphore {
    pub fn new(device: &Arc<RawVkDevice>) -> Self {
        let semaphore = unsafe {
            device
                .create_semaphore(
                    &vk::SemaphoreCreateInfo {
                        flags: vk::SemaphoreCreateFlags::empty(),
                        ..Default::default()
                    },
                    None,
                )
                .unwrap()
        };
        Self {
            device: device.clone(),
            semaphore,
        }
    }

    #[inline(always)]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl PartialEq for VkBinarySemaphore {
    fn eq(&self, other: &Self) -> bool {
        self.semaphore == other.semaphore
    }
}

impl Eq for VkBinarySemaphore {}

impl Hash for VkBinarySemaphore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.semaphore.hash(state);
    }
}

impl Drop for VkBinarySemaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_follows_the_surface_when_fixed() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 640,
                height: 480,
            },
            ..Default::default()
        };
        let extent = VkSwapchain::pick_extent(&capabilities, 1920, 1080);
        assert_eq!(extent.width, 640);
        assert_eq!(extent.height, 480);
    }

    #[test]
    fn extent_clamps_to_surface_limits_when_flexible() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 16,
                height: 16,
            },
            max_image_extent: vk::Extent2D {
                width: 2048,
                height: 2048,
            },
            ..Default::default()
        };
        let extent = VkSwapchain::pick_extent(&capabilities, 4096, 4);
        assert_eq!(extent.width, 2048);
        assert_eq!(extent.height, 16);
    }

    #[test]
    fn image_count_respects_surface_limits() {
        let unbounded = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(VkSwapchain::pick_image_count(&unbounded, 3), 3);

        let tight = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 2,
            ..Default::default()
        };
        assert_eq!(VkSwapchain::pick_image_count(&tight, 3), 2);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::FIFO];
        assert_eq!(
            VkSwapchain::pick_present_mode(PresentMode::Mailbox, &modes),
            vk::PresentModeKHR::FIFO
        );

        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(
            VkSwapchain::pick_present_mode(PresentMode::Mailbox, &modes),
            vk::PresentModeKHR::MAILBOX
        );
    }

    #[test]
    fn format_picker_handles_the_undefined_wildcard() {
        let formats = [vk::SurfaceFormatKHR {
            format: vk::Format::UNDEFINED,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }];
        let (surface_format, format) = VkSwapchain::pick_format(&formats).unwrap();
        assert_eq!(surface_format.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(format, Format::BGRA8UNorm);
    }

    #[test]
    fn format_picker_skips_formats_we_do_not_expose() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R5G6B5_UNORM_PACK16,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::R16G16B16A16_SFLOAT,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];
        let (_, format) = VkSwapchain::pick_format(&formats).unwrap();
        assert_eq!(format, Format::RGBA16Float);
    }
}
