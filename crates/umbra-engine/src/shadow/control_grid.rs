//! The 16 control points on the GPU: an 8×1 texture pair that is reset from
//! the canonical layout each run and relaxed by ping-pong passes.

use umbra_warp::ControlGrid;
use umbra_warp::grid::GRID_TEXELS;

use super::binder::{FullscreenPass, ResourceBinder};
use super::error::ShadowError;
use super::resources::{TextureDesc, TextureFormat};

pub const GRID_PING: &str = "warp.grid_ping";
pub const GRID_PONG: &str = "warp.grid_pong";

const GRID_DESC: TextureDesc = TextureDesc::new(GRID_TEXELS as u32, 1, TextureFormat::Rgba32Float);

#[derive(Debug, Clone, Default)]
pub struct GpuControlGrid {
    grid: ControlGrid,
    /// `false`: ping holds the current points.
    swapped: bool,
}

impl GpuControlGrid {
    pub fn new(grid: ControlGrid) -> Self {
        Self { grid, swapped: false }
    }

    /// CPU copy of the layout that [`Self::reset`] uploads.
    pub fn grid(&self) -> &ControlGrid {
        &self.grid
    }

    /// Texture holding the current points.
    pub fn current(&self) -> &'static str {
        if self.swapped { GRID_PONG } else { GRID_PING }
    }

    fn other(&self) -> &'static str {
        if self.swapped { GRID_PING } else { GRID_PONG }
    }

    pub fn ensure_textures<B>(&self, binder: &mut B) -> Result<(), ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        for name in [GRID_PING, GRID_PONG] {
            if binder.texture_desc(name) != Some(GRID_DESC) {
                binder.create_data_texture(name, GRID_DESC)?;
            }
        }
        Ok(())
    }

    /// Uploads the canonical points into ping and makes it current.
    pub fn reset<B>(&mut self, binder: &mut B) -> Result<(), ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        self.ensure_textures(binder)?;
        self.grid.reset();
        self.swapped = false;
        binder.upload_texels(GRID_PING, &self.grid.to_texels())
    }

    /// One relaxation pass: moves every point along `gradient` into the other
    /// texture, which then becomes current.
    pub fn relax<B>(&mut self, binder: &mut B, fbo: &str, gradient: &str, step: f32) -> Result<(), ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        let target = self.other();
        binder.attach_color_texture(fbo, target, 0)?;
        binder.require_complete(fbo)?;
        binder.render_fullscreen_pass(
            fbo,
            &FullscreenPass::RelaxPoints { points: self.current(), gradient, step },
        )?;
        self.swapped = !self.swapped;
        Ok(())
    }
}
