// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;
pub mod texture;

pub use render::RenderState;
pub use gpu_init::GpuContext;
pub use texture::{BlockTextures, TextureLoader};
