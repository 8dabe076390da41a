use bitflags::bitflags;
use smallvec::SmallVec;

bitflags! {
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
  pub struct ShaderStage: u32 {
    const VERTEX   = 0b1;
    const FRAGMENT = 0b10;
    const COMPUTE  = 0b100;
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingType {
  ConstantBuffer,
  StorageBuffer,
  SampledTexture,
  StorageTexture,
  Sampler,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutEntry {
  pub binding: u32,
  pub visibility: ShaderStage,
  pub binding_type: BindingType,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BindGroupLayoutInfo {
  pub entries: SmallVec<[BindGroupLayoutEntry; 8]>,
}
