use wgpu::util::DeviceExt;

use super::{Mesh, ShadowCasters};
use crate::render::RenderCtx;

/// A [`Mesh`] uploaded into immutable vertex/index buffers.
pub struct GpuScene {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

impl GpuScene {
    pub fn upload(ctx: &RenderCtx<'_>, mesh: &Mesh) -> Self {
        if mesh.is_empty() {
            log::warn!("GpuScene: uploading an empty mesh; shadow passes will draw nothing");
        }

        // Zero-sized buffers are invalid; keep one dummy element.
        let vertices: &[u8] = if mesh.vertices.is_empty() {
            &[0u8; 12]
        } else {
            bytemuck::cast_slice(&mesh.vertices)
        };
        let indices: &[u8] = if mesh.indices.is_empty() {
            &[0u8; 4]
        } else {
            bytemuck::cast_slice(&mesh.indices)
        };

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("umbra scene vbo"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("umbra scene ibo"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "GpuScene: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.triangle_count()
        );

        Self {
            vbo,
            ibo,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl ShadowCasters for GpuScene {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vbo.slice(..));
        pass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn is_empty(&self) -> bool {
        self.index_count == 0
    }
}
