use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::gpu::{
    self,
    Device as _,
    GPUBackend,
    Texture as _,
};

use super::*;

pub struct Texture<B: GPUBackend> {
    texture: ManuallyDrop<B::Texture>,
    destroyer: Arc<DeferredDestroyer<B>>,
    label: Option<String>,
}

impl<B: GPUBackend> Texture<B> {
    pub(super) fn new(
        device: &Arc<B::Device>,
        destroyer: &Arc<DeferredDestroyer<B>>,
        info: &gpu::TextureInfo,
        name: Option<&str>,
    ) -> Result<Arc<Self>, gpu::OutOfMemoryError> {
        let texture = unsafe { device.create_texture(info, name) }?;
        Ok(Arc::new(Self {
            texture: ManuallyDrop::new(texture),
            destroyer: destroyer.clone(),
            label: name.map(|n| n.to_string()),
        }))
    }

    #[inline(always)]
    pub fn handle(&self) -> &B::Texture {
        &self.texture
    }

    #[inline(always)]
    pub fn info(&self) -> &gpu::TextureInfo {
        self.texture.info()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<B: GPUBackend> Drop for Texture<B> {
    fn drop(&mut self) {
        let texture = unsafe { ManuallyDrop::take(&mut self.texture) };
        self.destroyer.destroy_texture(texture);
    }
}

impl<B: GPUBackend> PartialEq for Texture<B> {
    fn eq(&self, other: &Self) -> bool {
        *self.texture == *other.texture
    }
}

impl<B: GPUBackend> Eq for Texture<B> {}
