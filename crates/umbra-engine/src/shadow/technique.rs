//! Shadow techniques and the per-frame driver over all lights.

use glam::{Mat3, Mat4, Vec2, Vec3};
use umbra_warp::PolynomialCoefficients;

use super::binder::ResourceBinder;
use super::config::ShadowConfig;
use super::error::ShadowError;
use super::error_pipeline::{ErrorInputs, ErrorPipeline};
use super::light::{Light, ShadowMapEntry};
use super::paraboloid::hemisphere_views_along;
use super::warped_depth::WarpedDepthRenderer;

/// Camera state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub camera_view_proj: Mat4,
    /// Viewport in pixels.
    pub camera_viewport: [f32; 2],
}

/// How the warp of a rendered shadow map was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum WarpOutcome {
    /// The technique does not warp.
    Unwarped,
    /// Fitted this frame.
    Fitted,
    /// Analysis failed; the light's cached coefficients (or identity) were used.
    Stale(ShadowError),
}

/// A shadow map rendered this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedShadow {
    pub entry: ShadowMapEntry,
    pub views: [Mat4; 2],
    pub coefficients: PolynomialCoefficients,
    pub outcome: WarpOutcome,
}

/// Polynomial-warped dual paraboloid: the error analysis plus its scratch
/// state.
#[derive(Debug, Clone, Default)]
pub struct WarpedShadow {
    pipeline: ErrorPipeline,
}

impl WarpedShadow {
    pub fn new(pipeline: ErrorPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &ErrorPipeline {
        &self.pipeline
    }
}

#[derive(Debug, Clone)]
pub enum ShadowTechnique {
    /// Plain dual-paraboloid map.
    DualParaboloid,
    Warped(WarpedShadow),
    /// Dual paraboloid with the split plane rotated by `angle`
    /// (yaw about `+Y`, then pitch about `+Z`, radians).
    Cut { angle: Vec2 },
}

impl ShadowTechnique {
    pub fn warped() -> Self {
        ShadowTechnique::Warped(WarpedShadow::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShadowTechnique::DualParaboloid => "DPSM",
            ShadowTechnique::Warped(_) => "IPSM",
            ShadowTechnique::Cut { .. } => "CUT",
        }
    }

    /// Preprocessor defines a lighting shader needs to sample this technique.
    pub fn defines(&self) -> &'static str {
        match self {
            ShadowTechnique::DualParaboloid => "#define PARABOLOID\n",
            ShadowTechnique::Warped(_) => "#define PARABOLOID\n#define WARPED\n",
            ShadowTechnique::Cut { .. } => "#define PARABOLOID\n#define CUT\n",
        }
    }

    /// Hemisphere views of a light at `position`.
    pub fn views_for(&self, position: Vec3, config: &ShadowConfig) -> [Mat4; 2] {
        let axis = match self {
            ShadowTechnique::Cut { angle } => {
                Mat3::from_rotation_y(angle.x) * Mat3::from_rotation_z(angle.y) * Vec3::X
            }
            _ => Vec3::X,
        };
        hemisphere_views_along(position, axis, config.far)
    }

    /// Renders the shadow map of `light`, creating its targets on first use.
    ///
    /// `Err` means nothing was rendered: either setup failed (the light is
    /// now disabled) or a depth pass failed this frame. A failed analysis is
    /// not an error; it shows up as [`WarpOutcome::Stale`].
    pub fn compute_shadow<B>(
        &mut self,
        binder: &mut B,
        light: &mut Light,
        scene: &B::Scene,
        frame: &FrameInputs,
        config: &ShadowConfig,
    ) -> Result<ComputedShadow, ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        let entry = light.prepare_shadow(binder)?.clone();
        let views = self.views_for(light.position, config);

        let outcome = match self {
            ShadowTechnique::Warped(warped) => {
                let inputs = ErrorInputs {
                    light_view: views[config.analysis_hemisphere.layer() as usize],
                    camera_view_proj: frame.camera_view_proj,
                    camera_viewport: frame.camera_viewport,
                };
                match warped.pipeline.run(binder, scene, &inputs, entry.resolution, config) {
                    Ok(coefficients) => {
                        light.store_coefficients(coefficients);
                        WarpOutcome::Fitted
                    }
                    Err(e) => {
                        log::warn!("light {}: reusing previous warp: {e}", light.id);
                        WarpOutcome::Stale(e)
                    }
                }
            }
            ShadowTechnique::DualParaboloid | ShadowTechnique::Cut { .. } => WarpOutcome::Unwarped,
        };

        let coefficients = match outcome {
            WarpOutcome::Unwarped => PolynomialCoefficients::identity(),
            WarpOutcome::Fitted | WarpOutcome::Stale(_) => light.warp(),
        };
        WarpedDepthRenderer.render(binder, scene, &entry, &views, &coefficients, config)?;

        Ok(ComputedShadow { entry, views, coefficients, outcome })
    }
}

/// Result for one light in [`ShadowSystem::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowReport {
    pub light: u32,
    pub result: Result<ComputedShadow, ShadowError>,
}

/// Drives one technique over all lights, in order.
#[derive(Debug, Clone)]
pub struct ShadowSystem {
    technique: ShadowTechnique,
    config: ShadowConfig,
    enabled: bool,
}

impl ShadowSystem {
    pub fn new(technique: ShadowTechnique, config: ShadowConfig) -> Result<Self, ShadowError> {
        config.validate()?;
        log::info!("shadow technique: {}", technique.name());
        Ok(Self { technique, config, enabled: true })
    }

    pub fn technique(&self) -> &ShadowTechnique {
        &self.technique
    }

    pub fn set_technique(&mut self, technique: ShadowTechnique) {
        log::info!("shadow technique: {} -> {}", self.technique.name(), technique.name());
        self.technique = technique;
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ShadowConfig) -> Result<(), ShadowError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Renders every enabled light's shadow. Lights share scratch targets,
    /// so each one finishes before the next starts.
    pub fn render<B>(
        &mut self,
        binder: &mut B,
        lights: &mut [Light],
        scene: &B::Scene,
        frame: &FrameInputs,
    ) -> Vec<ShadowReport>
    where
        B: ResourceBinder + ?Sized,
    {
        if !self.enabled {
            return Vec::new();
        }

        let mut reports = Vec::with_capacity(lights.len());
        for light in lights.iter_mut().filter(|l| l.enabled) {
            let result = self.technique.compute_shadow(binder, light, scene, frame, &self.config);
            if let Err(e) = &result {
                log::warn!("light {}: no shadow this frame: {e}", light.id);
            }
            reports.push(ShadowReport { light: light.id, result });
        }
        reports
    }
}
