use crate::device::{Gpu, capture_errors};

/// Renderer-facing context (device/queue + enabled features).
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub features: wgpu::Features,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, features: wgpu::Features) -> Self {
        Self { device, queue, features }
    }

    #[inline]
    pub fn from_gpu(gpu: &'a Gpu) -> Self {
        Self::new(gpu.device(), gpu.queue(), gpu.features())
    }

    /// `PolygonMode::Line` is usable on this device.
    #[inline]
    pub fn supports_wireframe(&self) -> bool {
        self.features.contains(wgpu::Features::POLYGON_MODE_LINE)
    }

    /// [`capture_errors`] on this context's device.
    #[inline]
    pub fn validated<T>(&self, f: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
        capture_errors(self.device, f)
    }

    /// Submits a single encoder.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
