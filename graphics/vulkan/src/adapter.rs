use std::ffi::{
    CStr,
    CString,
};
use std::os::raw::c_char;
use std::sync::Arc;

use ash::vk;
use bitflags::bitflags;
use gpu_allocator::vulkan::{
    Allocator,
    AllocatorCreateDesc,
};
use log::info;
use vetro_core::gpu;
use vetro_core::gpu::{
    AdapterInfo,
    AdapterType,
    BackendType,
    DeviceCreateError,
};

use super::*;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VkAdapterExtensionSupport: u32 {
        const SWAPCHAIN = 0b1;
    }
}

pub struct VkAdapter {
    instance: Arc<RawVkInstance>,
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    adapter_info: AdapterInfo,
    extensions: VkAdapterExtensionSupport,
}

impl VkAdapter {
    pub(crate) fn new(instance: &Arc<RawVkInstance>, physical_device: vk::PhysicalDevice) -> Self {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };

        let mut extensions = VkAdapterExtensionSupport::empty();
        let supported_extensions =
            unsafe { instance.enumerate_device_extension_properties(physical_device) }
                .unwrap_or_default();
        for extension in &supported_extensions {
            let name = unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) };
            if name == ash::khr::swapchain::NAME {
                extensions |= VkAdapterExtensionSupport::SWAPCHAIN;
            }
        }

        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_str()
            .unwrap_or("Unknown adapter")
            .to_string();
        let adapter_type = match properties.device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => AdapterType::Discrete,
            vk::PhysicalDeviceType::INTEGRATED_GPU => AdapterType::Integrated,
            vk::PhysicalDeviceType::VIRTUAL_GPU => AdapterType::Virtual,
            vk::PhysicalDeviceType::CPU => AdapterType::Software,
            _ => AdapterType::Other,
        };

        Self {
            instance: instance.clone(),
            physical_device,
            properties,
            adapter_info: AdapterInfo {
                name,
                adapter_type,
                backend: BackendType::Vulkan,
            },
            extensions,
        }
    }

    #[inline(always)]
    pub fn physical_device_handle(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    fn find_graphics_queue_family(&self) -> Option<u32> {
        let queue_properties = unsafe {
            self.instance
                .get_physical_device_queue_family_properties(self.physical_device)
        };
        queue_properties
            .iter()
            .enumerate()
            .find(|(_, properties)| {
                properties.queue_count > 0
                    && properties.queue_flags.contains(vk::QueueFlags::GRAPHICS)
            })
            .map(|(index, _)| index as u32)
    }
}

// Physical devices are owned by the instance and are freed along with it.

impl gpu::Adapter<VkBackend> for VkAdapter {
    fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }

    fn supports_surface(&self, surface: &VkSurface) -> bool {
        let queue_properties = unsafe {
            self.instance
                .get_physical_device_queue_family_properties(self.physical_device)
        };
        queue_properties
            .iter()
            .enumerate()
            .any(|(index, properties)| {
                properties.queue_count > 0
                    && properties.queue_flags.contains(vk::QueueFlags::GRAPHICS)
                    && unsafe {
                        self.instance
                            .surface_instance
                            .get_physical_device_surface_support(
                                self.physical_device,
                                index as u32,
                                surface.surface_handle(),
                            )
                    }
                    .unwrap_or(false)
            })
    }

    unsafe fn create_device(&self) -> Result<VkDevice, DeviceCreateError> {
        if !self.extensions.contains(VkAdapterExtensionSupport::SWAPCHAIN) {
            return Err(DeviceCreateError::Backend(
                "VK_KHR_swapchain is unsupported".to_string(),
            ));
        }
        let graphics_queue_family = self
            .find_graphics_queue_family()
            .ok_or(DeviceCreateError::NoGraphicsQueue)?;

        let queue_priority = 1.0f32;
        let queue_create_info = vk::DeviceQueueCreateInfo {
            queue_family_index: graphics_queue_family,
            queue_count: 1,
            p_queue_priorities: &queue_priority as *const f32,
            ..Default::default()
        };

        let extension_names_c: Vec<CString> = vec![CString::from(ash::khr::swapchain::NAME)];
        let extension_names_ptr: Vec<*const c_char> = extension_names_c
            .iter()
            .map(|extension| extension.as_ptr())
            .collect();

        let enabled_features = vk::PhysicalDeviceFeatures::default();
        let device_create_info = vk::DeviceCreateInfo {
            p_queue_create_infos: &queue_create_info as *const vk::DeviceQueueCreateInfo,
            queue_create_info_count: 1,
            p_enabled_features: &enabled_features,
            pp_enabled_extension_names: extension_names_ptr.as_ptr(),
            enabled_extension_count: extension_names_ptr.len() as u32,
            ..Default::default()
        };

        let device = unsafe {
            self.instance
                .create_device(self.physical_device, &device_create_info, None)
        }
        .map_err(|e| match e {
            vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
                DeviceCreateError::OutOfMemory
            }
            _ => DeviceCreateError::Backend(e.to_string()),
        })?;

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: self.instance.instance.clone(),
            device: device.clone(),
            physical_device: self.physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| DeviceCreateError::Backend(e.to_string()))?;

        info!("Created Vulkan device on \"{}\"", self.adapter_info.name);
        Ok(VkDevice::new(
            device,
            &self.instance,
            self.physical_device,
            self.properties,
            graphics_queue_family,
            allocator,
        ))
    }
}
