use std::fmt::{
  Display,
  Formatter,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use super::*;

// WANT https://github.com/rust-lang/rust/issues/44265
pub trait GPUBackend: 'static + Sized {
  type Instance: Instance<Self> + Send + Sync;
  type Adapter: Adapter<Self> + Send + Sync;
  type Device: Device<Self> + Send + Sync;
  type Surface: Send + Sync + PartialEq + Eq;
  type Swapchain: Swapchain<Self> + Send + Sync;
  type Buffer: Buffer + Send + Sync;
  type Texture: Texture + Send + Sync;
  type BindGroupLayout: Send + Sync;

  fn name() -> &'static str;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendType {
  Vulkan,
  D3D12,
  Metal,
  WebGPU,
  Headless,
}

impl BackendType {
  /// Backends in the order they should be tried on the running platform.
  /// Headless comes last so it only wins when nothing hardware backed exists.
  pub fn platform_default_order() -> &'static [BackendType] {
    #[cfg(target_os = "windows")]
    return &[
      BackendType::D3D12,
      BackendType::Vulkan,
      BackendType::WebGPU,
      BackendType::Headless,
    ];
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    return &[
      BackendType::Metal,
      BackendType::Vulkan,
      BackendType::WebGPU,
      BackendType::Headless,
    ];
    #[cfg(target_arch = "wasm32")]
    return &[BackendType::WebGPU, BackendType::Headless];
    #[cfg(not(any(
      target_os = "windows",
      target_os = "macos",
      target_os = "ios",
      target_arch = "wasm32"
    )))]
    return &[
      BackendType::Vulkan,
      BackendType::WebGPU,
      BackendType::Headless,
    ];
  }
}

impl Display for BackendType {
  fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
    f.write_str(match self {
      BackendType::Vulkan => "Vulkan",
      BackendType::D3D12 => "Direct3D 12",
      BackendType::Metal => "Metal",
      BackendType::WebGPU => "WebGPU",
      BackendType::Headless => "Headless",
    })
  }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown backend name: {0}")]
pub struct UnknownBackendError(pub String);

impl std::str::FromStr for BackendType {
  type Err = UnknownBackendError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "vulkan" | "vk" => Ok(BackendType::Vulkan),
      "d3d12" | "dx12" | "direct3d12" => Ok(BackendType::D3D12),
      "metal" => Ok(BackendType::Metal),
      "webgpu" => Ok(BackendType::WebGPU),
      "headless" => Ok(BackendType::Headless),
      _ => Err(UnknownBackendError(s.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backend_names_parse_back() {
    assert_eq!("vulkan".parse::<BackendType>(), Ok(BackendType::Vulkan));
    assert_eq!("Headless".parse::<BackendType>(), Ok(BackendType::Headless));
    assert!("glide".parse::<BackendType>().is_err());
  }

  #[test]
  fn platform_order_falls_back_to_headless() {
    let order = BackendType::platform_default_order();
    assert!(!order.is_empty());
    assert_eq!(*order.last().unwrap(), BackendType::Headless);
  }
}
