//! Alias-error analysis: from the scene seen by the light to a fitted warp.
//!
//! One [`ErrorPipeline::run`] walks the stages of [`ErrorStage`] strictly in
//! order. The targets are scratch shared by every light, sized for the light
//! being analysed, and reallocated when the resolution changes.

use glam::Mat4;
use umbra_warp::{ControlGrid, CoverageTable, PolynomialCoefficients, SampleGrid, fit};

use super::binder::{BlurAxis, FullscreenPass, ResourceBinder, ScenePass};
use super::config::ShadowConfig;
use super::control_grid::GpuControlGrid;
use super::error::ShadowError;
use super::resources::{TextureDesc, TextureFormat};
use super::stage::{ErrorStage, PassTrace};

pub const COORDS: &str = "warp.coords";
pub const COORDS_DEPTH: &str = "warp.coords_depth";
pub const OUTPUT: &str = "warp.output";
pub const PING: &str = "warp.ping";
pub const PONG: &str = "warp.pong";
pub const FUNC_VALUES: &str = "warp.func_values";

pub const FBO_COORDS: &str = "fbo.coords";
pub const FBO_POST: &str = "fbo.post";

/// Intermediate targets that can be shown for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTexture {
    /// Raw alias error.
    Output,
    Ping,
    Pong,
}

/// Per-frame camera data the analysis needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorInputs {
    /// View of the analysed hemisphere.
    pub light_view: Mat4,
    pub camera_view_proj: Mat4,
    /// Camera viewport in pixels.
    pub camera_viewport: [f32; 2],
}

#[derive(Debug, Clone, Default)]
pub struct ErrorPipeline {
    coverage: CoverageTable,
    grid: GpuControlGrid,
    /// Shadow resolution the scratch targets are allocated for.
    allocated: Option<u32>,
    last_trace: PassTrace,
}

impl ErrorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(coverage: CoverageTable, grid: ControlGrid) -> Self {
        Self { coverage, grid: GpuControlGrid::new(grid), ..Self::default() }
    }

    pub fn coverage(&self) -> &CoverageTable {
        &self.coverage
    }

    pub fn control_grid(&self) -> &GpuControlGrid {
        &self.grid
    }

    /// Stages of the most recent run, including a failed one.
    pub fn last_trace(&self) -> &PassTrace {
        &self.last_trace
    }

    pub fn texture_name(preview: PreviewTexture) -> &'static str {
        match preview {
            PreviewTexture::Output => OUTPUT,
            PreviewTexture::Ping => PING,
            PreviewTexture::Pong => PONG,
        }
    }

    /// Allocates the scratch targets for a `resolution`² shadow map.
    pub fn ensure_targets<B>(
        &mut self,
        binder: &mut B,
        resolution: u32,
        config: &ShadowConfig,
    ) -> Result<(), ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        let err = config.error_resolution(resolution);
        let wanted = [
            (COORDS, TextureDesc::new(resolution, resolution, TextureFormat::Rgba32Float)),
            (COORDS_DEPTH, TextureDesc::new(resolution, resolution, TextureFormat::Depth32Float)),
            (OUTPUT, TextureDesc::new(err, err, TextureFormat::Rgba16Float)),
            (PING, TextureDesc::new(err, err, TextureFormat::Rgba16Float)),
            (PONG, TextureDesc::new(err, err, TextureFormat::Rgba16Float)),
            (FUNC_VALUES, TextureDesc::new(4, 4, TextureFormat::Rgba32Float)),
        ];

        let stale = self.allocated != Some(resolution)
            || wanted.iter().any(|(name, desc)| binder.texture_desc(name) != Some(*desc));
        if !stale {
            return Ok(());
        }

        self.allocated = None;
        for (name, desc) in wanted {
            if binder.texture_desc(name) != Some(desc) {
                binder.create_data_texture(name, desc)?;
            }
        }
        self.grid.ensure_textures(binder)?;

        binder.create_framebuffer(FBO_COORDS)?;
        binder.attach_color_texture(FBO_COORDS, COORDS, 0)?;
        binder.attach_depth_texture(FBO_COORDS, COORDS_DEPTH, 0)?;
        binder.require_complete(FBO_COORDS)?;
        binder.create_framebuffer(FBO_POST)?;

        log::debug!("error targets allocated: {resolution}² coords, {err}² error field");
        self.allocated = Some(resolution);
        Ok(())
    }

    /// Runs every stage and returns the fitted coefficients.
    ///
    /// Any failure aborts the run; [`Self::last_trace`] ends at the stage that
    /// failed. Blocks once, on the 4×4 readback.
    pub fn run<B>(
        &mut self,
        binder: &mut B,
        scene: &B::Scene,
        inputs: &ErrorInputs,
        resolution: u32,
        config: &ShadowConfig,
    ) -> Result<PolynomialCoefficients, ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        let mut trace = PassTrace::new();
        let result = self.run_stages(binder, scene, inputs, resolution, config, &mut trace);
        if let Err(e) = &result {
            let stage = trace.last().unwrap_or(ErrorStage::Idle);
            log::warn!("error analysis aborted in {stage}: {e}");
        }
        self.last_trace = trace;
        result
    }

    fn run_stages<B>(
        &mut self,
        binder: &mut B,
        scene: &B::Scene,
        inputs: &ErrorInputs,
        resolution: u32,
        config: &ShadowConfig,
        trace: &mut PassTrace,
    ) -> Result<PolynomialCoefficients, ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        self.ensure_targets(binder, resolution, config)?;

        trace.enter(ErrorStage::ProjectLightSpace);
        binder.require_complete(FBO_COORDS)?;
        binder.render_scene_pass(
            FBO_COORDS,
            &ScenePass::LightSpaceCoords {
                light_view: inputs.light_view,
                camera_view_proj: inputs.camera_view_proj,
                near_far: config.near_far(),
                clear: config.coords_clear,
            },
            scene,
        )?;

        trace.enter(ErrorStage::ComputeError);
        post_pass(
            binder,
            OUTPUT,
            &FullscreenPass::AliasError {
                coords: COORDS,
                coverage: &self.coverage,
                camera_viewport: inputs.camera_viewport,
                downsample: config.downsample,
            },
        )?;

        trace.enter(ErrorStage::BlurHorizontal);
        post_pass(binder, PING, &FullscreenPass::Blur { axis: BlurAxis::Horizontal, source: OUTPUT })?;

        trace.enter(ErrorStage::BlurVertical);
        post_pass(binder, PONG, &FullscreenPass::Blur { axis: BlurAxis::Vertical, source: PING })?;

        trace.enter(ErrorStage::ExtractGradient);
        post_pass(binder, PING, &FullscreenPass::Gradient { source: PONG })?;

        trace.enter(ErrorStage::SampleGrid);
        self.grid.reset(binder)?;
        for _ in 0..config.relax_iterations {
            self.grid.relax(binder, FBO_POST, PING, config.relax_step)?;
            trace.count_relax();
        }
        post_pass(
            binder,
            FUNC_VALUES,
            &FullscreenPass::SampleGrid { points: self.grid.current(), gradient: PING },
        )?;

        trace.enter(ErrorStage::Fitted);
        let values = binder.read_back_rg(FUNC_VALUES)?;
        let samples = SampleGrid::try_from_slice(&values)?;
        let coefficients = fit(&samples);
        trace.finish();
        log::trace!("fitted warp: {coefficients:?}");
        Ok(coefficients)
    }
}

/// Points the post framebuffer at `target` and runs `pass` into it.
fn post_pass<B>(binder: &mut B, target: &str, pass: &FullscreenPass<'_>) -> Result<(), ShadowError>
where
    B: ResourceBinder + ?Sized,
{
    binder.attach_color_texture(FBO_POST, target, 0)?;
    binder.require_complete(FBO_POST)?;
    binder.render_fullscreen_pass(FBO_POST, pass)
}
