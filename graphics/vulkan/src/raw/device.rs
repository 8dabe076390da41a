use std::ffi::CString;
use std::ops::Deref;
use std::sync::{
    Arc,
    Mutex,
};

use ash::vk;
use gpu_allocator::vulkan::{
    Allocation,
    AllocationCreateDesc,
    AllocationScheme,
    Allocator,
};
use gpu_allocator::MemoryLocation;
use log::warn;
use vetro_core::gpu::{
    MemoryUsage,
    OutOfMemoryError,
};

use crate::raw::RawVkInstance;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VkQueueInfo {
    pub queue_family_index: u32,
    pub queue_index: u32,
}

pub struct RawVkDevice {
    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub graphics_queue_info: VkQueueInfo,
    pub graphics_queue: vk::Queue,
    pub swapchain_device: ash::khr::swapchain::Device,
    pub debug_utils_device: Option<ash::ext::debug_utils::Device>,
    pub allocator: Option<Mutex<Allocator>>,
    pub instance: Arc<RawVkInstance>,
}

impl Deref for RawVkDevice {
    type Target = ash::Device;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

impl RawVkDevice {
    pub(crate) fn allocate(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        memory_usage: MemoryUsage,
        linear: bool,
    ) -> Result<Allocation, OutOfMemoryError> {
        let location = match memory_usage {
            MemoryUsage::GpuOnly => MemoryLocation::GpuOnly,
            MemoryUsage::CpuToGpu => MemoryLocation::CpuToGpu,
            MemoryUsage::GpuToCpu => MemoryLocation::GpuToCpu,
        };
        let mut allocator = self
            .allocator
            .as_ref()
            .expect("allocator is only taken during device teardown")
            .lock()
            .unwrap();
        allocator
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|_| OutOfMemoryError {})
    }

    pub(crate) fn free(&self, allocation: Allocation) {
        let mut allocator = self
            .allocator
            .as_ref()
            .expect("allocator is only taken during device teardown")
            .lock()
            .unwrap();
        if let Err(e) = allocator.free(allocation) {
            warn!("Failed to free allocation: {}", e);
        }
    }

    pub(crate) fn set_object_name(&self, object_type: vk::ObjectType, object_handle: u64, name: &str) {
        let Some(debug_utils_device) = self.debug_utils_device.as_ref() else {
            return;
        };
        let Ok(name_cstring) = CString::new(name) else {
            return;
        };
        unsafe {
            let _ = debug_utils_device.set_debug_utils_object_name(&vk::DebugUtilsObjectNameInfoEXT {
                object_type,
                object_handle,
                p_object_name: name_cstring.as_ptr(),
                ..Default::default()
            });
        }
    }

    pub fn wait_for_idle(&self) {
        unsafe {
            let _ = self.device.device_wait_idle();
        }
    }
}

impl Drop for RawVkDevice {
    fn drop(&mut self) {
        self.wait_for_idle();
        // The allocator has to release its memory blocks before the device
        // goes away.
        self.allocator = None;
        unsafe {
            self.device.destroy_device(None);
        }
    }
}
