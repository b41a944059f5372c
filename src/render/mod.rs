mod common;
mod gpu;
mod shaders;

pub use gpu::Renderer;
