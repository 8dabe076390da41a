#![allow(dead_code)]

pub use self::adapter::{
    VkAdapter,
    VkAdapterExtensionSupport,
};
pub use self::backend::VkBackend;
pub use self::binding::VkBindGroupLayout;
pub use self::buffer::VkBuffer;
pub use self::device::VkDevice;
pub use self::instance::VkInstance;
pub use self::surface::VkSurface;
pub use self::swapchain::{
    VkBinarySemaphore,
    VkSwapchain,
};
pub use self::texture::VkTexture;
pub use self::raw::{
    RawInstanceVkDebugUtils,
    RawVkDevice,
    RawVkInstance,
    VkQueueInfo,
};

mod adapter;
mod backend;
mod binding;
mod buffer;
mod device;
mod format;
mod instance;
mod raw;
mod surface;
mod swapchain;
mod texture;
