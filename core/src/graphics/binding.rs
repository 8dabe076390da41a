use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::gpu::{
    self,
    Device as _,
    GPUBackend,
};

use super::*;

/// Bind group layouts go through the same deferred destruction path as
/// buffers and textures.
pub struct BindGroupLayout<B: GPUBackend> {
    layout: ManuallyDrop<B::BindGroupLayout>,
    destroyer: Arc<DeferredDestroyer<B>>,
    label: Option<String>,
    info: gpu::BindGroupLayoutInfo,
}

impl<B: GPUBackend> BindGroupLayout<B> {
    pub(super) fn new(
        device: &Arc<B::Device>,
        destroyer: &Arc<DeferredDestroyer<B>>,
        info: &gpu::BindGroupLayoutInfo,
        name: Option<&str>,
    ) -> Result<Arc<Self>, gpu::OutOfMemoryError> {
        let layout = unsafe { device.create_bind_group_layout(info, name) }?;
        Ok(Arc::new(Self {
            layout: ManuallyDrop::new(layout),
            destroyer: destroyer.clone(),
            label: name.map(|n| n.to_string()),
            info: info.clone(),
        }))
    }

    #[inline(always)]
    pub fn handle(&self) -> &B::BindGroupLayout {
        &self.layout
    }

    pub fn info(&self) -> &gpu::BindGroupLayoutInfo {
        &self.info
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<B: GPUBackend> Drop for BindGroupLayout<B> {
    fn drop(&mut self) {
        let layout = unsafe { ManuallyDrop::take(&mut self.layout) };
        self.destroyer.destroy_bind_group_layout(layout);
    }
}
