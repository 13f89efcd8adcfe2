//! Blocking texture readback.
//!
//! Copies one array layer into a staging buffer, waits for the map and
//! returns tightly packed rows.

use std::fmt;

use super::capture_errors;

/// Failure while mapping a staging buffer.
#[derive(Debug, Clone)]
pub enum ReadbackError {
    /// The map callback reported an error.
    Map(wgpu::BufferAsyncError),
    /// `device.poll` failed before the map completed.
    Poll(String),
    /// The map callback never ran.
    Disconnected,
    /// The device rejected the copy (e.g. depth copies on a downlevel backend).
    Rejected(String),
}

impl fmt::Display for ReadbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadbackError::Map(e) => write!(f, "buffer map failed: {e}"),
            ReadbackError::Poll(e) => write!(f, "device poll failed: {e}"),
            ReadbackError::Disconnected => write!(f, "buffer map callback dropped"),
            ReadbackError::Rejected(e) => write!(f, "copy rejected by the device: {e}"),
        }
    }
}

impl std::error::Error for ReadbackError {}

/// Row pitch for a texture-to-buffer copy, rounded up to
/// `COPY_BYTES_PER_ROW_ALIGNMENT` (256).
pub fn padded_bytes_per_row(width: u32, bytes_per_texel: u32) -> u32 {
    let unpadded = width * bytes_per_texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding of a mapped copy.
pub fn strip_row_padding(data: &[u8], row_bytes: usize, padded_row_bytes: usize, rows: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row_bytes * rows);
    for row in 0..rows {
        let start = row * padded_row_bytes;
        out.extend_from_slice(&data[start..start + row_bytes]);
    }
    out
}

/// What to copy out of a texture.
#[derive(Debug, Clone, Copy)]
pub struct LayerCopy {
    pub width: u32,
    pub height: u32,
    pub layer: u32,
    pub bytes_per_texel: u32,
    pub aspect: wgpu::TextureAspect,
}

/// Copies `copy.layer` of `texture` to the host. Stalls until the GPU is done.
pub fn read_texture_layer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    copy: LayerCopy,
) -> Result<Vec<u8>, ReadbackError> {
    let padded = padded_bytes_per_row(copy.width, copy.bytes_per_texel);
    let staging = capture_errors(device, || encode_copy(device, queue, texture, copy, padded))
        .map_err(|e| ReadbackError::Rejected(e.to_string()))?;

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        // Receiver outlives the poll below; a failed send only means we already gave up.
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| ReadbackError::Poll(e.to_string()))?;
    rx.recv()
        .map_err(|_| ReadbackError::Disconnected)?
        .map_err(ReadbackError::Map)?;

    let row_bytes = (copy.width * copy.bytes_per_texel) as usize;
    let out = {
        let data = slice.get_mapped_range();
        strip_row_padding(&data, row_bytes, padded as usize, copy.height as usize)
    };
    staging.unmap();
    Ok(out)
}

/// Records and submits the copy into a fresh staging buffer.
fn encode_copy(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    copy: LayerCopy,
    padded: u32,
) -> wgpu::Buffer {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("umbra readback staging"),
        size: u64::from(padded) * u64::from(copy.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("umbra readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: copy.layer },
            aspect: copy.aspect,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(copy.height),
            },
        },
        wgpu::Extent3d {
            width: copy.width,
            height: copy.height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));
    staging
}
