use std::{
  ffi::c_void,
  hash::Hash,
};

use bitflags::bitflags;

bitflags! {
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
  pub struct BufferUsage: u32 {
    const VERTEX   = 0b1;
    const INDEX    = 0b10;
    const STORAGE  = 0b100;
    const CONSTANT = 0b1000;
    const COPY_SRC = 0b10000;
    const COPY_DST = 0b100000;
    const INDIRECT = 0b1000000;
  }
}

/// Smallest allocation the backends accept. Anything below this is almost
/// certainly a caller bug, like passing an element count instead of a size.
pub const MIN_BUFFER_SIZE: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferInfo {
  pub size: u64,
  pub usage: BufferUsage,
}

impl Default for BufferInfo {
  fn default() -> Self {
    Self {
      size: MIN_BUFFER_SIZE,
      usage: BufferUsage::COPY_DST,
    }
  }
}

pub trait Buffer: Hash + PartialEq + Eq + Send + Sync {
  fn info(&self) -> &BufferInfo;

  unsafe fn map_unsafe(&self, offset: u64, length: u64, invalidate: bool) -> Option<*mut c_void>;
  unsafe fn unmap_unsafe(&self, offset: u64, length: u64, flush: bool);
}
