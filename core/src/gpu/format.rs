#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
  Unknown,
  R8UNorm,
  RG8UNorm,
  RGBA8UNorm,
  RGBA8Srgb,
  BGRA8UNorm,
  BGRA8Srgb,
  R16Float,
  RG16Float,
  RGBA16Float,
  R32Float,
  RG32Float,
  RGBA32Float,
  R16UInt,
  R32UInt,
  R11G11B10Float,
  BC1,
  BC1Alpha,
  BC2,
  BC3,

  D16,
  D24S8,
  D32,
  D32S8,
}

impl Format {
  pub fn is_depth(&self) -> bool {
    matches!(
      self,
      Format::D16 | Format::D24S8 | Format::D32 | Format::D32S8
    )
  }

  pub fn is_stencil(&self) -> bool {
    matches!(self, Format::D24S8 | Format::D32S8)
  }

  pub fn is_compressed(&self) -> bool {
    matches!(
      self,
      Format::BC1 | Format::BC1Alpha | Format::BC2 | Format::BC3
    )
  }

  /// Bytes per texel, or per block for compressed formats.
  pub fn element_size(&self) -> u32 {
    match self {
      Format::Unknown => 0,
      Format::R8UNorm => 1,
      Format::RG8UNorm => 2,
      Format::RGBA8UNorm => 4,
      Format::RGBA8Srgb => 4,
      Format::BGRA8UNorm => 4,
      Format::BGRA8Srgb => 4,
      Format::R16Float => 2,
      Format::RG16Float => 4,
      Format::RGBA16Float => 8,
      Format::R32Float => 4,
      Format::RG32Float => 8,
      Format::RGBA32Float => 16,
      Format::R16UInt => 2,
      Format::R32UInt => 4,
      Format::R11G11B10Float => 4,
      Format::BC1 => 8,
      Format::BC1Alpha => 8,
      Format::BC2 => 16,
      Format::BC3 => 16,
      Format::D16 => 2,
      Format::D24S8 => 4,
      Format::D32 => 4,
      Format::D32S8 => 5,
    }
  }

  pub fn srgb_format(&self) -> Option<Format> {
    match self {
      Format::RGBA8UNorm => Some(Format::RGBA8Srgb),
      Format::BGRA8UNorm => Some(Format::BGRA8Srgb),
      _ => None,
    }
  }

  pub fn block_size(&self) -> (u32, u32) {
    if self.is_compressed() {
      (4, 4)
    } else {
      (1, 1)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn depth_formats_are_not_compressed() {
    for format in [Format::D16, Format::D24S8, Format::D32, Format::D32S8] {
      assert!(format.is_depth());
      assert!(!format.is_compressed());
    }
  }

  #[test]
  fn stencil_implies_depth() {
    for format in [Format::D24S8, Format::D32S8] {
      assert!(format.is_stencil());
      assert!(format.is_depth());
    }
  }

  #[test]
  fn srgb_variants_keep_their_size() {
    for format in [Format::RGBA8UNorm, Format::BGRA8UNorm] {
      let srgb = format.srgb_format().unwrap();
      assert_eq!(format.element_size(), srgb.element_size());
    }
  }

  #[test]
  fn compressed_formats_use_4x4_blocks() {
    assert_eq!(Format::BC1.block_size(), (4, 4));
    assert_eq!(Format::RGBA8UNorm.block_size(), (1, 1));
  }
}
