pub use self::binding::*;
pub use self::buffer::*;
pub use self::context::*;
pub use self::device::*;
pub use self::instance::*;
pub use self::swapchain::*;
pub use self::texture::*;
use self::destroyer::*;

mod binding;
mod buffer;
mod context;
mod destroyer;
mod device;
mod instance;
mod swapchain;
mod texture;

#[cfg(test)]
pub(crate) mod testing;
