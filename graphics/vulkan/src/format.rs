use ash::vk;

use vetro_core::gpu::{
    BufferUsage,
    Format,
    PresentMode,
    SampleCount,
    TextureDimension,
    TextureUsage,
};

pub fn format_to_vk(format: Format) -> vk::Format {
    match format {
        Format::Unknown => vk::Format::UNDEFINED,
        Format::R8UNorm => vk::Format::R8_UNORM,
        Format::RG8UNorm => vk::Format::R8G8_UNORM,
        Format::RGBA8UNorm => vk::Format::R8G8B8A8_UNORM,
        Format::RGBA8Srgb => vk::Format::R8G8B8A8_SRGB,
        Format::BGRA8UNorm => vk::Format::B8G8R8A8_UNORM,
        Format::BGRA8Srgb => vk::Format::B8G8R8A8_SRGB,
        Format::R16Float => vk::Format::R16_SFLOAT,
        Format::RG16Float => vk::Format::R16G16_SFLOAT,
        Format::RGBA16Float => vk::Format::R16G16B16A16_SFLOAT,
        Format::R32Float => vk::Format::R32_SFLOAT,
        Format::RG32Float => vk::Format::R32G32_SFLOAT,
        Format::RGBA32Float => vk::Format::R32G32B32A32_SFLOAT,
        Format::R16UInt => vk::Format::R16_UINT,
        Format::R32UInt => vk::Format::R32_UINT,
        Format::R11G11B10Float => vk::Format::B10G11R11_UFLOAT_PACK32,
        Format::BC1 => vk::Format::BC1_RGB_UNORM_BLOCK,
        Format::BC1Alpha => vk::Format::BC1_RGBA_UNORM_BLOCK,
        Format::BC2 => vk::Format::BC2_UNORM_BLOCK,
        Format::BC3 => vk::Format::BC3_UNORM_BLOCK,
        Format::D16 => vk::Format::D16_UNORM,
        Format::D24S8 => vk::Format::D24_UNORM_S8_UINT,
        Format::D32 => vk::Format::D32_SFLOAT,
        Format::D32S8 => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

/// Maps the formats a surface commonly reports back into our enum.
/// Formats we do not expose get dropped by the swapchain format picker.
pub fn surface_vk_format_to_format(format: vk::Format) -> Option<Format> {
    match format {
        vk::Format::R8G8B8A8_UNORM => Some(Format::RGBA8UNorm),
        vk::Format::R8G8B8A8_SRGB => Some(Format::RGBA8Srgb),
        vk::Format::B8G8R8A8_UNORM => Some(Format::BGRA8UNorm),
        vk::Format::B8G8R8A8_SRGB => Some(Format::BGRA8Srgb),
        vk::Format::R16G16B16A16_SFLOAT => Some(Format::RGBA16Float),
        _ => None,
    }
}

pub fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();

    if usage.contains(BufferUsage::STORAGE) {
        flags |= vk::BufferUsageFlags::STORAGE_BUFFER;
    }

    if usage.contains(BufferUsage::CONSTANT) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }

    if usage.contains(BufferUsage::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }

    if usage.contains(BufferUsage::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }

    if usage.contains(BufferUsage::INDIRECT) {
        flags |= vk::BufferUsageFlags::INDIRECT_BUFFER;
    }

    if usage.contains(BufferUsage::COPY_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }

    if usage.contains(BufferUsage::COPY_DST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }

    flags
}

pub fn texture_usage_to_vk(usage: TextureUsage, format: Format) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();

    if usage.contains(TextureUsage::STORAGE) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }

    if usage.contains(TextureUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }

    if usage.contains(TextureUsage::COPY_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }

    if usage.contains(TextureUsage::COPY_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }

    if usage.contains(TextureUsage::DEPTH_STENCIL) {
        flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }

    if usage.contains(TextureUsage::RENDER_TARGET) {
        // Vulkan does not allow COLOR_ATTACHMENT on depth formats.
        if format.is_depth() {
            flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        } else {
            flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
        }
    }

    flags
}

pub fn texture_dimension_to_vk(dimension: TextureDimension) -> vk::ImageType {
    match dimension {
        TextureDimension::Dim1D => vk::ImageType::TYPE_1D,
        TextureDimension::Dim2D => vk::ImageType::TYPE_2D,
        TextureDimension::Dim3D => vk::ImageType::TYPE_3D,
    }
}

pub fn samples_to_vk(samples: SampleCount) -> vk::SampleCountFlags {
    match samples {
        SampleCount::Samples1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::Samples2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::Samples4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::Samples8 => vk::SampleCountFlags::TYPE_8,
    }
}

pub fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_target_usage_respects_depth_formats() {
        let color = texture_usage_to_vk(TextureUsage::RENDER_TARGET, Format::BGRA8UNorm);
        assert!(color.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT));
        assert!(!color.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));

        let depth = texture_usage_to_vk(TextureUsage::RENDER_TARGET, Format::D32);
        assert!(depth.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
        assert!(!depth.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT));
    }

    #[test]
    fn surface_formats_only_cover_exposed_formats() {
        assert_eq!(
            surface_vk_format_to_format(vk::Format::B8G8R8A8_SRGB),
            Some(Format::BGRA8Srgb)
        );
        assert_eq!(surface_vk_format_to_format(vk::Format::R5G6B5_UNORM_PACK16), None);
    }
}
