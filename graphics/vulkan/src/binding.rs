use std::hash::{
    Hash,
    Hasher,
};
use std::sync::Arc;

use ash::vk;
use ash::vk::Handle as _;
use vetro_core::gpu::{
    BindGroupLayoutInfo,
    BindingType,
    OutOfMemoryError,
    ShaderStage,
};

use super::*;

pub struct VkBindGroupLayout {
    layout: vk::DescriptorSetLayout,
    device: Arc<RawVkDevice>,
}

impl VkBindGroupLayout {
    pub(crate) unsafe fn new(
        device: &Arc<RawVkDevice>,
        info: &BindGroupLayoutInfo,
        name: Option<&str>,
    ) -> Result<Self, OutOfMemoryError> {
        let vk_bindings: Vec<vk::DescriptorSetLayoutBinding> = info
            .entries
            .iter()
            .map(|entry| vk::DescriptorSetLayoutBinding {
                binding: entry.binding,
                descriptor_count: 1,
                descriptor_type: binding_type_to_vk(entry.binding_type),
                stage_flags: shader_stage_to_vk(entry.visibility),
                ..Default::default()
            })
            .collect();

        let create_info = vk::DescriptorSetLayoutCreateInfo {
            p_bindings: vk_bindings.as_ptr(),
            binding_count: vk_bindings.len() as u32,
            ..Default::default()
        };
        let layout_res = unsafe { device.create_descriptor_set_layout(&create_info, None) };
        if let Err(e) = layout_res {
            if e == vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
                || e == vk::Result::ERROR_OUT_OF_HOST_MEMORY
            {
                return Err(OutOfMemoryError {});
            }
        }
        let layout = layout_res.unwrap();

        if let Some(name) = name {
            device.set_object_name(vk::ObjectType::DESCRIPTOR_SET_LAYOUT, layout.as_raw(), name);
        }

        Ok(Self {
            layout,
            device: device.clone(),
        })
    }

    #[inline(always)]
    pub(crate) fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for VkBindGroupLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

impl Hash for VkBindGroupLayout {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.layout.hash(state);
    }
}

impl PartialEq for VkBindGroupLayout {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout
    }
}

impl Eq for VkBindGroupLayout {}

fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    let mut flags = vk::ShaderStageFlags::empty();

    if stage.contains(ShaderStage::VERTEX) {
        flags |= vk::ShaderStageFlags::VERTEX;
    }

    if stage.contains(ShaderStage::FRAGMENT) {
        flags |= vk::ShaderStageFlags::FRAGMENT;
    }

    if stage.contains(ShaderStage::COMPUTE) {
        flags |= vk::ShaderStageFlags::COMPUTE;
    }

    flags
}

fn binding_type_to_vk(binding_type: BindingType) -> vk::DescriptorType {
    match binding_type {
        BindingType::ConstantBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        BindingType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        BindingType::SampledTexture => vk::DescriptorType::SAMPLED_IMAGE,
        BindingType::StorageTexture => vk::DescriptorType::STORAGE_IMAGE,
        BindingType::Sampler => vk::DescriptorType::SAMPLER,
    }
}
