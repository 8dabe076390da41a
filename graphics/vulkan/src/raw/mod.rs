mod device;
mod instance;

pub use crate::raw::device::{
    RawVkDevice,
    VkQueueInfo,
};
pub use crate::raw::instance::{
    RawInstanceVkDebugUtils,
    RawVkInstance,
};
