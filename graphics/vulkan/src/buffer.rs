use std::ffi::c_void;
use std::hash::{
    Hash,
    Hasher,
};
use std::sync::Arc;

use ash::vk;
use ash::vk::Handle as _;
use vetro_core::gpu;
use vetro_core::gpu::{
    BufferInfo,
    MemoryUsage,
    OutOfMemoryError,
};

use super::*;
use crate::format::buffer_usage_to_vk;

pub struct VkBuffer {
    buffer: vk::Buffer,
    device: Arc<RawVkDevice>,
    allocation: Option<gpu_allocator::vulkan::Allocation>,
    map_ptr: Option<*mut c_void>,
    info: BufferInfo,
}

unsafe impl Send for VkBuffer {}
unsafe impl Sync for VkBuffer {}

impl VkBuffer {
    pub(crate) unsafe fn new(
        device: &Arc<RawVkDevice>,
        info: &BufferInfo,
        memory_usage: MemoryUsage,
        name: Option<&str>,
    ) -> Result<Self, OutOfMemoryError> {
        let create_info = vk::BufferCreateInfo {
            size: info.size,
            usage: buffer_usage_to_vk(info.usage),
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            ..Default::default()
        };
        let buffer_res = unsafe { device.create_buffer(&create_info, None) };
        if let Err(e) = buffer_res {
            if e == vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
                || e == vk::Result::ERROR_OUT_OF_HOST_MEMORY
            {
                return Err(OutOfMemoryError {});
            }
        }
        let buffer = buffer_res.unwrap();

        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let allocation = match device.allocate(
            name.unwrap_or("buffer"),
            requirements,
            memory_usage,
            true,
        ) {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe {
                    device.destroy_buffer(buffer, None);
                }
                return Err(e);
            }
        };

        let bind_result = unsafe {
            device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
        };
        if bind_result.is_err() {
            device.free(allocation);
            unsafe {
                device.destroy_buffer(buffer, None);
            }
            return Err(OutOfMemoryError {});
        }

        let map_ptr = allocation.mapped_ptr().map(|ptr| ptr.as_ptr());

        if let Some(name) = name {
            device.set_object_name(vk::ObjectType::BUFFER, buffer.as_raw(), name);
        }

        Ok(Self {
            buffer,
            device: device.clone(),
            allocation: Some(allocation),
            map_ptr,
            info: info.clone(),
        })
    }

    #[inline(always)]
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    fn memory_range(&self, offset: u64) -> Option<vk::MappedMemoryRange> {
        let allocation = self.allocation.as_ref()?;
        let atom_size = self.device.properties.limits.non_coherent_atom_size;
        Some(vk::MappedMemoryRange {
            memory: unsafe { allocation.memory() },
            offset: align_down_64(allocation.offset() + offset, atom_size),
            size: vk::WHOLE_SIZE,
            ..Default::default()
        })
    }
}

impl Drop for VkBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
        }
        if let Some(allocation) = self.allocation.take() {
            self.device.free(allocation);
        }
    }
}

impl gpu::Buffer for VkBuffer {
    fn info(&self) -> &BufferInfo {
        &self.info
    }

    unsafe fn map_unsafe(&self, offset: u64, _length: u64, invalidate: bool) -> Option<*mut c_void> {
        let ptr = self.map_ptr?;
        if invalidate {
            if let Some(range) = self.memory_range(offset) {
                let _ = unsafe { self.device.invalidate_mapped_memory_ranges(&[range]) };
            }
        }
        Some(unsafe { ptr.add(offset as usize) })
    }

    unsafe fn unmap_unsafe(&self, offset: u64, _length: u64, flush: bool) {
        if !flush {
            return;
        }
        if let Some(range) = self.memory_range(offset) {
            let _ = unsafe { self.device.flush_mapped_memory_ranges(&[range]) };
        }
    }
}

impl Hash for VkBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.buffer.hash(state);
    }
}

impl PartialEq for VkBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
    }
}

impl Eq for VkBuffer {}

pub(crate) const fn align_down_64(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    (value / alignment) * alignment
}

pub(crate) const fn align_up_64(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    ((value + alignment - 1) / alignment) * alignment
}
