pub mod gpu;
pub mod graphics;
