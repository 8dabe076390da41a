pub use self::backend::*;
pub use self::binding::*;
pub use self::buffer::*;
pub use self::device::*;
pub use self::format::*;
pub use self::instance::*;
pub use self::swapchain::*;
pub use self::texture::*;

mod backend;
mod binding;
mod buffer;
mod device;
mod format;
mod instance;
mod swapchain;
mod texture;
