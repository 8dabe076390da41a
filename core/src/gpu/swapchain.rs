use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresentMode {
  Fifo,
  Mailbox,
  Immediate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainInfo {
  pub width: u32,
  pub height: u32,
  pub present_mode: PresentMode,
}

impl Default for SwapchainInfo {
  fn default() -> Self {
    Self {
      width: 1280,
      height: 720,
      present_mode: PresentMode::Fifo,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SwapchainError {
  #[error("surface has zero extents")]
  ZeroExtents,
  #[error("surface was lost")]
  SurfaceLost,
  #[error("swapchain no longer matches the surface and needs to be recreated")]
  NeedsRecreation,
  #[error("out of device memory")]
  OutOfMemory,
  #[error("swapchain operation failed")]
  Other,
}

#[derive(Clone, Debug, Error)]
pub enum SurfaceError {
  #[error("the backend cannot use this window handle kind")]
  UnsupportedHandle,
  #[error("surface creation failed: {0}")]
  Backend(String),
}

pub trait Swapchain<B: GPUBackend>: Sized {
  fn format(&self) -> Format;
  fn surface(&self) -> &B::Surface;
  fn width(&self) -> u32;
  fn height(&self) -> u32;
  unsafe fn recreate(&mut self, width: u32, height: u32) -> Result<(), SwapchainError>;
  unsafe fn next_backbuffer(&mut self) -> Result<u32, SwapchainError>;
  unsafe fn backbuffer_texture(&self, index: u32) -> &B::Texture;
  unsafe fn present(&mut self) -> Result<(), SwapchainError>;
}
