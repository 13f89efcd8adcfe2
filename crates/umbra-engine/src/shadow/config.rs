use super::error::ShadowError;
use super::paraboloid::Hemisphere;

/// Tuning of the warped shadow pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    /// Paraboloid depth range.
    pub near: f32,
    pub far: f32,

    /// Control-grid relaxation passes per frame. `0` samples the canonical
    /// layout directly.
    pub relax_iterations: u32,

    /// Displacement per unit gradient in reference-viewport units.
    pub relax_step: f32,

    /// Scale applied to the fitted displacement in the depth pass.
    pub warp_strength: f32,

    /// Hemisphere whose view drives the error analysis.
    pub analysis_hemisphere: Hemisphere,

    /// Draw shadow casters as lines (visual only; needs `POLYGON_MODE_LINE`).
    pub wireframe: bool,

    /// Clear value of the light-space coordinate target (no geometry).
    pub coords_clear: f32,

    /// Error field resolution divisor.
    pub downsample: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            near: 1.0,
            far: 1000.0,
            relax_iterations: 1,
            relax_step: 15.0,
            warp_strength: 1.0,
            analysis_hemisphere: Hemisphere::NegativeX,
            wireframe: false,
            coords_clear: 99.0,
            downsample: 8,
        }
    }
}

impl ShadowConfig {
    #[inline]
    pub fn near_far(&self) -> [f32; 2] {
        [self.near, self.far]
    }

    /// Side of the error field for a shadow map of `resolution` texels.
    pub fn error_resolution(&self, resolution: u32) -> u32 {
        (resolution / self.downsample.max(1)).max(1)
    }

    pub fn validate(&self) -> Result<(), ShadowError> {
        fn invalid(field: &'static str, reason: &str) -> Result<(), ShadowError> {
            Err(ShadowError::InvalidConfig { field, reason: reason.to_string() })
        }

        if !(self.near.is_finite() && self.near > 0.0) {
            return invalid("near", "must be positive");
        }
        if !(self.far.is_finite() && self.far > self.near) {
            return invalid("far", "must be greater than near");
        }
        if !self.relax_step.is_finite() {
            return invalid("relax_step", "must be finite");
        }
        if !self.warp_strength.is_finite() {
            return invalid("warp_strength", "must be finite");
        }
        // The error pass treats anything outside the camera's NDC range as empty.
        if !(self.coords_clear.is_finite() && self.coords_clear.abs() > 1.5) {
            return invalid("coords_clear", "must lie well outside [-1, 1]");
        }
        if self.downsample == 0 {
            return invalid("downsample", "must be at least 1");
        }
        Ok(())
    }
}
