//! wgpu rendering
//!
//! Six interchangeable shading programs share one uniform contract. The
//! active program draws every obstacle and the ship; textured programs then
//! composite the environment backdrop behind them.

pub mod backdrop;
pub mod entity;
pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod selector;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use entity::{Material, RenderableEntity, UvMapping};
pub use gpu::{GpuContext, SurfaceErrorAction};
pub use scene::Scene;
pub use selector::{ShadingModel, ShadingSelector, VertexBinding};
