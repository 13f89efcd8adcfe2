use std::path::Path;

use anyhow::{Context, Result, ensure};
use image::{ImageBuffer, Luma};

pub type DepthImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Depth values as a 16-bit grayscale image, stretched over the range of
/// covered texels. Uncovered texels (depth 1.0) stay white.
pub fn depth_image(depth: &[f32], width: u32, height: u32) -> Result<DepthImage> {
    ensure!(
        depth.len() == width as usize * height as usize,
        "depth buffer has {} values, expected {width}x{height}",
        depth.len()
    );

    let covered = || depth.iter().copied().filter(|d| *d < 1.0);
    let lo = covered().fold(f32::INFINITY, f32::min);
    let hi = covered().fold(f32::NEG_INFINITY, f32::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let pixels = depth
        .iter()
        .map(|&d| {
            if d >= 1.0 {
                u16::MAX
            } else {
                (((d - lo) / span).clamp(0.0, 1.0) * f32::from(u16::MAX - 1)) as u16
            }
        })
        .collect();

    ImageBuffer::from_raw(width, height, pixels).context("depth image buffer size mismatch")
}

pub fn write_depth_png(path: &Path, depth: &[f32], width: u32, height: u32) -> Result<()> {
    let image = depth_image(depth, width, height)?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
