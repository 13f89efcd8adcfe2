//! wgpu implementation of [`ResourceBinder`](super::ResourceBinder).

mod binder;
mod pipelines;
mod uniforms;

pub use binder::GpuBinder;
