use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::gpu::{
    self,
    Buffer as _,
    Device as _,
    GPUBackend,
};

use super::*;

/// Safe handle to a device buffer. Dropping it does not free GPU memory right
/// away, the backend object is handed to the device's deferred destroyer
/// instead.
pub struct Buffer<B: GPUBackend> {
    buffer: ManuallyDrop<B::Buffer>,
    destroyer: Arc<DeferredDestroyer<B>>,
    label: Option<String>,
}

impl<B: GPUBackend> Buffer<B> {
    pub(super) fn new(
        device: &Arc<B::Device>,
        destroyer: &Arc<DeferredDestroyer<B>>,
        info: &gpu::BufferInfo,
        memory_usage: gpu::MemoryUsage,
        name: Option<&str>,
    ) -> Result<Arc<Self>, gpu::OutOfMemoryError> {
        let buffer = unsafe { device.create_buffer(info, memory_usage, name) }?;
        Ok(Arc::new(Self {
            buffer: ManuallyDrop::new(buffer),
            destroyer: destroyer.clone(),
            label: name.map(|n| n.to_string()),
        }))
    }

    #[inline(always)]
    pub fn handle(&self) -> &B::Buffer {
        &self.buffer
    }

    #[inline(always)]
    pub fn info(&self) -> &gpu::BufferInfo {
        self.buffer.info()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn write(&self, offset: u64, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        assert!(offset + data.len() as u64 <= self.info().size);
        unsafe {
            let Some(ptr) = self.buffer.map_unsafe(offset, data.len() as u64, false) else {
                panic!("buffer {:?} is not host accessible", self.label);
            };
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr as *mut u8, data.len());
            self.buffer.unmap_unsafe(offset, data.len() as u64, true);
        }
    }

    pub fn read(&self, offset: u64, data: &mut [u8]) {
        if data.is_empty() {
            return;
        }
        assert!(offset + data.len() as u64 <= self.info().size);
        unsafe {
            let Some(ptr) = self.buffer.map_unsafe(offset, data.len() as u64, true) else {
                panic!("buffer {:?} is not host accessible", self.label);
            };
            std::ptr::copy_nonoverlapping(ptr as *const u8, data.as_mut_ptr(), data.len());
            self.buffer.unmap_unsafe(offset, data.len() as u64, false);
        }
    }
}

impl<B: GPUBackend> Drop for Buffer<B> {
    fn drop(&mut self) {
        let buffer = unsafe { ManuallyDrop::take(&mut self.buffer) };
        self.destroyer.destroy_buffer(buffer);
    }
}

impl<B: GPUBackend> PartialEq for Buffer<B> {
    fn eq(&self, other: &Self) -> bool {
        *self.buffer == *other.buffer
    }
}

impl<B: GPUBackend> Eq for Buffer<B> {}
