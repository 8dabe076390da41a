use bitflags::bitflags;

use super::*;

bitflags! {
  #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
  pub struct TextureUsage: u32 {
    const SAMPLED       = 0b1;
    const RENDER_TARGET = 0b10;
    const STORAGE       = 0b100;
    const COPY_SRC      = 0b1000;
    const COPY_DST      = 0b10000;
    const DEPTH_STENCIL = 0b100000;
  }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureDimension {
  Dim1D,
  Dim2D,
  Dim3D,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum SampleCount {
  #[default]
  Samples1,
  Samples2,
  Samples4,
  Samples8,
}

impl SampleCount {
  pub fn count(&self) -> u32 {
    match self {
      SampleCount::Samples1 => 1,
      SampleCount::Samples2 => 2,
      SampleCount::Samples4 => 4,
      SampleCount::Samples8 => 8,
    }
  }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureInfo {
  pub dimension: TextureDimension,
  pub format: Format,
  pub width: u32,
  pub height: u32,
  pub depth: u32,
  pub mip_levels: u32,
  pub array_length: u32,
  pub samples: SampleCount,
  pub usage: TextureUsage,
}

impl Default for TextureInfo {
  fn default() -> Self {
    Self {
      dimension: TextureDimension::Dim2D,
      format: Format::RGBA8UNorm,
      width: 1,
      height: 1,
      depth: 1,
      mip_levels: 1,
      array_length: 1,
      samples: SampleCount::Samples1,
      usage: TextureUsage::SAMPLED,
    }
  }
}

pub trait Texture: Send + Sync + PartialEq + Eq {
  fn info(&self) -> &TextureInfo;
}
