//! The contract between the shadow pipeline and whatever owns GPU resources.
//!
//! Everything is addressed by name. Passes are described as data
//! ([`FullscreenPass`], [`ScenePass`]) so a backend decides how to bind them
//! and tests can record them.

use glam::Mat4;
use umbra_warp::{CoverageTable, PolynomialCoefficients};

use super::error::{FramebufferStatus, ShadowError};
use super::resources::TextureDesc;

/// Direction of a separable blur pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

/// A pass that covers its whole target with one triangle.
#[derive(Debug, Clone, PartialEq)]
pub enum FullscreenPass<'a> {
    /// Per-texel alias error at the downsampled resolution.
    AliasError {
        coords: &'a str,
        coverage: &'a CoverageTable,
        camera_viewport: [f32; 2],
        downsample: u32,
    },
    Blur { axis: BlurAxis, source: &'a str },
    /// Central-difference gradient of the blurred error.
    Gradient { source: &'a str },
    /// Moves every control point along the gradient (8×1 target).
    RelaxPoints { points: &'a str, gradient: &'a str, step: f32 },
    /// Gradient at the 16 control points into a 4×4 target.
    SampleGrid { points: &'a str, gradient: &'a str },
}

impl FullscreenPass<'_> {
    pub fn kind(&self) -> FullscreenKind {
        match self {
            FullscreenPass::AliasError { .. } => FullscreenKind::AliasError,
            FullscreenPass::Blur { axis: BlurAxis::Horizontal, .. } => FullscreenKind::BlurHorizontal,
            FullscreenPass::Blur { axis: BlurAxis::Vertical, .. } => FullscreenKind::BlurVertical,
            FullscreenPass::Gradient { .. } => FullscreenKind::Gradient,
            FullscreenPass::RelaxPoints { .. } => FullscreenKind::RelaxPoints,
            FullscreenPass::SampleGrid { .. } => FullscreenKind::SampleGrid,
        }
    }

    /// Textures the pass reads, in binding order.
    pub fn inputs(&self) -> [&str; 2] {
        match self {
            FullscreenPass::AliasError { coords, .. } => [*coords, *coords],
            FullscreenPass::Blur { source, .. } | FullscreenPass::Gradient { source } => [*source, *source],
            FullscreenPass::RelaxPoints { points, gradient, .. }
            | FullscreenPass::SampleGrid { points, gradient } => [*points, *gradient],
        }
    }
}

/// Identifies the shader program of a [`FullscreenPass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenKind {
    AliasError,
    BlurHorizontal,
    BlurVertical,
    Gradient,
    RelaxPoints,
    SampleGrid,
}

/// A pass that draws the shadow casters.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenePass<'a> {
    /// Camera-space position and paraboloid cosine per light-space texel.
    LightSpaceCoords {
        light_view: Mat4,
        camera_view_proj: Mat4,
        near_far: [f32; 2],
        clear: f32,
    },
    /// Paraboloid depth with the polynomial warp applied in the vertex stage.
    Depth {
        light_view: Mat4,
        coefficients: &'a PolynomialCoefficients,
        strength: f32,
        near_far: [f32; 2],
        wireframe: bool,
    },
}

/// Resource and pass operations the shadow pipeline needs.
///
/// Calls are executed in order. A failing call leaves earlier work in
/// place; callers abort their sequence on the first error.
pub trait ResourceBinder {
    /// Geometry accepted by [`ResourceBinder::render_scene_pass`].
    type Scene: ?Sized;

    /// Creates or replaces a named texture.
    fn create_data_texture(&mut self, name: &str, desc: TextureDesc) -> Result<(), ShadowError>;

    fn texture_desc(&self, name: &str) -> Option<TextureDesc>;

    /// Creates or resets a named framebuffer with no attachments.
    fn create_framebuffer(&mut self, name: &str) -> Result<(), ShadowError>;

    fn attach_color_texture(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError>;

    fn attach_depth_texture(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError>;

    fn detach_depth(&mut self, fbo: &str) -> Result<(), ShadowError>;

    fn check_framebuffer_complete(&self, fbo: &str) -> FramebufferStatus;

    /// Writes RGBA texels to layer 0, row-major.
    fn upload_texels(&mut self, texture: &str, texels: &[[f32; 4]]) -> Result<(), ShadowError>;

    fn render_fullscreen_pass(&mut self, fbo: &str, pass: &FullscreenPass<'_>) -> Result<(), ShadowError>;

    fn render_scene_pass(
        &mut self,
        fbo: &str,
        pass: &ScenePass<'_>,
        scene: &Self::Scene,
    ) -> Result<(), ShadowError>;

    /// Reads the red/green channels of layer 0, row-major and interleaved.
    /// Blocks until the GPU has finished all submitted work.
    fn read_back_rg(&mut self, texture: &str) -> Result<Vec<f32>, ShadowError>;

    /// Completeness check as a `Result`, logging the failure.
    fn require_complete(&self, fbo: &str) -> Result<(), ShadowError> {
        let status = self.check_framebuffer_complete(fbo);
        if status.is_complete() {
            return Ok(());
        }
        log::warn!("framebuffer '{fbo}' not usable: {status}");
        Err(ShadowError::IncompleteFramebuffer { framebuffer: fbo.to_string(), status })
    }
}
