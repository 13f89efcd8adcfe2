use bytemuck::{Pod, Zeroable};
use umbra_warp::grid::REFERENCE_SIZE;

use crate::shadow::binder::{FullscreenPass, ScenePass};

// ── fullscreen passes ─────────────────────────────────────────────────────

/// Uniform shared by all fullscreen passes (`fullscreen.wgsl`).
///
/// `params` per pass:
/// - alias error: `(viewport.x, viewport.y, downsample, 0)`
/// - relax: `(step, reference size, 0, 0)`
/// - sample grid: `(0, reference size, 0, 0)`
/// - blur / gradient: unused
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct PassUniform {
    pub coverage: [[f32; 4]; 25],
    pub params: [f32; 4],
}

impl PassUniform {
    pub fn for_pass(pass: &FullscreenPass<'_>) -> Self {
        let mut u = Self::zeroed();
        match pass {
            FullscreenPass::AliasError { coverage, camera_viewport, downsample, .. } => {
                u.coverage = coverage.packed();
                u.params = [camera_viewport[0], camera_viewport[1], *downsample as f32, 0.0];
            }
            FullscreenPass::RelaxPoints { step, .. } => {
                u.params = [*step, REFERENCE_SIZE, 0.0, 0.0];
            }
            FullscreenPass::SampleGrid { .. } => {
                u.params = [0.0, REFERENCE_SIZE, 0.0, 0.0];
            }
            FullscreenPass::Blur { .. } | FullscreenPass::Gradient { .. } => {}
        }
        u
    }
}

// ── scene passes ──────────────────────────────────────────────────────────

/// Uniform of the scene passes (`paraboloid.wgsl`).
///
/// `params = (near, far, warp strength, clear value)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct SceneUniform {
    pub light_view: [[f32; 4]; 4],
    pub camera_view_proj: [[f32; 4]; 4],
    pub coeffs_x: [[f32; 4]; 4],
    pub coeffs_y: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl SceneUniform {
    pub fn for_pass(pass: &ScenePass<'_>) -> Self {
        let mut u = Self::zeroed();
        match pass {
            ScenePass::LightSpaceCoords { light_view, camera_view_proj, near_far, clear } => {
                u.light_view = light_view.to_cols_array_2d();
                u.camera_view_proj = camera_view_proj.to_cols_array_2d();
                u.params = [near_far[0], near_far[1], 0.0, *clear];
            }
            ScenePass::Depth { light_view, coefficients, strength, near_far, .. } => {
                u.light_view = light_view.to_cols_array_2d();
                u.coeffs_x = coefficients.x.to_cols_array_2d();
                u.coeffs_y = coefficients.y.to_cols_array_2d();
                u.params = [near_far[0], near_far[1], *strength, 0.0];
            }
        }
        u
    }
}
