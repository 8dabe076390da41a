use raw_window_handle::{
  RawDisplayHandle,
  RawWindowHandle,
};
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceInfo {
  pub app_name: String,
  pub debug_layers: bool,
}

impl Default for InstanceInfo {
  fn default() -> Self {
    Self {
      app_name: "vetro".to_string(),
      debug_layers: cfg!(debug_assertions),
    }
  }
}

#[derive(Clone, Debug, Error)]
pub enum InstanceCreateError {
  #[error("no usable graphics driver: {0}")]
  DriverNotFound(String),
  #[error("instance creation failed: {0}")]
  Backend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdapterType {
  Discrete,
  Integrated,
  Virtual,
  Software,
  Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerPreference {
  LowPower,
  HighPerformance,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterInfo {
  pub name: String,
  pub adapter_type: AdapterType,
  pub backend: BackendType,
}

pub trait Instance<B: GPUBackend> {
  /// Adapters are owned by the instance and live exactly as long as it does.
  fn list_adapters(&self) -> &[B::Adapter];

  unsafe fn create_surface(
    &self,
    display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,
  ) -> Result<B::Surface, SurfaceError>;
}

pub trait Adapter<B: GPUBackend> {
  fn adapter_info(&self) -> &AdapterInfo;
  fn supports_surface(&self, surface: &B::Surface) -> bool;
  unsafe fn create_device(&self) -> Result<B::Device, DeviceCreateError>;
}
