//! Shadow-casting geometry.
//!
//! The shadow passes only need positions. Meshes are baked into world space
//! on the CPU ([`Mesh`]) and uploaded once ([`GpuScene`]); the passes see
//! them through the [`ShadowCasters`] trait.

mod gpu;
mod mesh;

pub use gpu::GpuScene;
pub use mesh::{Mesh, Vertex};

/// Geometry that can be drawn into a shadow pass.
///
/// The pass has its pipeline and bind groups set when `draw` is called; the
/// implementation binds vertex/index buffers and issues draws.
pub trait ShadowCasters {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);

    fn is_empty(&self) -> bool {
        false
    }
}
