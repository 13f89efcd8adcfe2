/// Runs `f` inside validation and out-of-memory error scopes.
///
/// wgpu reports most failures asynchronously to the device's uncaptured
/// error handler, which panics by default. Calls made in `f` report here
/// instead, and the first captured error is returned.
pub fn capture_errors<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f();

    // Scopes pop innermost first.
    let invalid = pollster::block_on(validation.pop());
    let out_of_memory = pollster::block_on(oom.pop());
    match invalid.or(out_of_memory) {
        Some(e) => Err(e),
        None => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Gpu, GpuInit};

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn rejected_texture_is_returned_not_raised() {
        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let result = capture_errors(gpu.device(), || {
            gpu.device().create_texture(&wgpu::TextureDescriptor {
                label: Some("zero extent"),
                size: wgpu::Extent3d { width: 0, height: 0, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba16Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        });
        assert!(result.is_err());
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn valid_calls_pass_through() {
        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let size = capture_errors(gpu.device(), || {
            gpu.device()
                .create_buffer(&wgpu::BufferDescriptor {
                    label: Some("ok"),
                    size: 64,
                    usage: wgpu::BufferUsages::UNIFORM,
                    mapped_at_creation: false,
                })
                .size()
        });
        assert_eq!(size.unwrap(), 64);
    }
}
