//! Point lights and their shadow-map state.

use glam::Vec3;
use umbra_warp::PolynomialCoefficients;

use super::binder::ResourceBinder;
use super::error::ShadowError;
use super::resources::{TextureDesc, TextureFormat};
use super::warped_depth::{FBO_WARPED, bind_layer};

/// The two-layer shadow targets of one light. Layer 0 is the `+axis`
/// hemisphere, layer 1 the `-axis` one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowMapEntry {
    pub depth: String,
    /// Debug colour copy of the depth.
    pub color: String,
    pub resolution: u32,
}

impl ShadowMapEntry {
    /// Creates both targets and checks that they form a complete
    /// [`FBO_WARPED`], the framebuffer the depth passes render through.
    pub fn create<B>(binder: &mut B, light_id: u32, resolution: u32) -> Result<Self, ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        let entry = Self {
            depth: format!("light{light_id}.shadow_depth"),
            color: format!("light{light_id}.shadow_color"),
            resolution,
        };
        binder.create_data_texture(
            &entry.depth,
            TextureDesc::layered(resolution, resolution, 2, TextureFormat::Depth32Float),
        )?;
        binder.create_data_texture(
            &entry.color,
            TextureDesc::layered(resolution, resolution, 2, TextureFormat::Rgba16Float),
        )?;

        binder.create_framebuffer(FBO_WARPED)?;
        bind_layer(binder, &entry, 0)?;
        Ok(entry)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShadowState {
    /// Targets not created yet.
    Pending,
    Ready(ShadowMapEntry),
    /// Setup failed; the light renders unshadowed.
    Disabled(ShadowError),
}

#[derive(Debug, Clone)]
pub struct Light {
    pub id: u32,
    pub position: Vec3,
    /// Lights with `enabled == false` are skipped entirely.
    pub enabled: bool,
    resolution: u32,
    shadow: ShadowState,
    /// Last successful fit. Reused when a frame's analysis fails.
    coefficients: Option<PolynomialCoefficients>,
}

impl Light {
    pub fn new(id: u32, position: Vec3, resolution: u32) -> Self {
        Self {
            id,
            position,
            enabled: true,
            resolution,
            shadow: ShadowState::Pending,
            coefficients: None,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Changing the resolution recreates the targets on the next frame.
    pub fn set_resolution(&mut self, resolution: u32) {
        if resolution != self.resolution {
            self.resolution = resolution;
            self.shadow = ShadowState::Pending;
        }
    }

    pub fn shadow(&self) -> &ShadowState {
        &self.shadow
    }

    pub fn entry(&self) -> Option<&ShadowMapEntry> {
        match &self.shadow {
            ShadowState::Ready(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_shadow_disabled(&self) -> bool {
        matches!(self.shadow, ShadowState::Disabled(_))
    }

    /// Gives a disabled light another setup attempt.
    pub fn retry_shadow(&mut self) {
        if self.is_shadow_disabled() {
            self.shadow = ShadowState::Pending;
        }
    }

    pub fn coefficients(&self) -> Option<&PolynomialCoefficients> {
        self.coefficients.as_ref()
    }

    /// Coefficients the depth pass should use: the cached fit, or identity.
    pub fn warp(&self) -> PolynomialCoefficients {
        self.coefficients.unwrap_or_default()
    }

    pub(crate) fn store_coefficients(&mut self, coefficients: PolynomialCoefficients) {
        self.coefficients = Some(coefficients);
    }

    /// Creates the shadow targets on first use.
    ///
    /// A failure disables the light's shadow until [`Self::retry_shadow`] or
    /// a resolution change.
    pub fn prepare_shadow<B>(&mut self, binder: &mut B) -> Result<&ShadowMapEntry, ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        if matches!(self.shadow, ShadowState::Pending) {
            self.shadow = match ShadowMapEntry::create(binder, self.id, self.resolution) {
                Ok(entry) => {
                    log::info!("light {}: shadow map {}² ready", self.id, self.resolution);
                    ShadowState::Ready(entry)
                }
                Err(e) => {
                    log::error!("light {}: shadows disabled: {e}", self.id);
                    ShadowState::Disabled(e)
                }
            };
        }

        match &self.shadow {
            ShadowState::Ready(entry) => Ok(entry),
            ShadowState::Disabled(e) => Err(e.clone()),
            ShadowState::Pending => Err(ShadowError::resource(
                format!("light{}", self.id),
                "shadow map not prepared",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::testing::{Call, RecordingBinder};

    #[test]
    fn entry_names_follow_light_id() {
        let mut binder = RecordingBinder::default();
        let entry = ShadowMapEntry::create(&mut binder, 3, 256).unwrap();
        assert_eq!(entry.depth, "light3.shadow_depth");
        assert_eq!(entry.color, "light3.shadow_color");
        let desc = binder.texture_desc(&entry.depth).unwrap();
        assert_eq!((desc.width, desc.layers, desc.format), (256, 2, TextureFormat::Depth32Float));
    }

    #[test]
    fn setup_binds_layer_zero_of_the_shared_framebuffer() {
        let mut binder = RecordingBinder::default();
        let entry = ShadowMapEntry::create(&mut binder, 5, 64).unwrap();
        assert!(binder.calls().contains(&Call::CreateFramebuffer(FBO_WARPED.to_string())));
        assert!(binder.calls().contains(&Call::AttachDepth {
            fbo: FBO_WARPED.to_string(),
            texture: entry.depth.clone(),
            layer: 0,
        }));
        assert!(!binder.calls().iter().any(|c| matches!(c, Call::CreateFramebuffer(name) if name.starts_with("light"))));
    }

    #[test]
    fn prepare_is_done_once() {
        let mut binder = RecordingBinder::default();
        let mut light = Light::new(0, Vec3::ZERO, 128);
        light.prepare_shadow(&mut binder).unwrap();
        let calls = binder.calls().len();
        light.prepare_shadow(&mut binder).unwrap();
        assert_eq!(binder.calls().len(), calls);
        assert!(light.entry().is_some());
    }

    #[test]
    fn setup_failure_disables_the_light() {
        let mut binder = RecordingBinder::default();
        binder.broken_textures.insert("light1.shadow_color".to_string());
        let mut light = Light::new(1, Vec3::ZERO, 128);

        assert!(light.prepare_shadow(&mut binder).is_err());
        assert!(light.is_shadow_disabled());

        // No further attempts until asked.
        binder.broken_textures.clear();
        assert!(light.prepare_shadow(&mut binder).is_err());
        light.retry_shadow();
        assert!(light.prepare_shadow(&mut binder).is_ok());
    }

    #[test]
    fn incomplete_setup_framebuffer_disables_the_light() {
        let mut binder = RecordingBinder::default();
        binder.broken_framebuffers.insert(FBO_WARPED.to_string());
        let mut light = Light::new(2, Vec3::ZERO, 128);
        assert!(matches!(
            light.prepare_shadow(&mut binder),
            Err(ShadowError::IncompleteFramebuffer { .. })
        ));
        assert!(light.is_shadow_disabled());
    }

    #[test]
    fn zero_resolution_is_a_setup_failure() {
        let mut binder = RecordingBinder::default();
        let mut light = Light::new(0, Vec3::ZERO, 0);
        assert!(matches!(
            light.prepare_shadow(&mut binder),
            Err(ShadowError::ResourceCreation { .. })
        ));
    }

    #[test]
    fn resolution_change_resets_state() {
        let mut binder = RecordingBinder::default();
        let mut light = Light::new(0, Vec3::ZERO, 128);
        light.prepare_shadow(&mut binder).unwrap();
        light.set_resolution(256);
        assert_eq!(light.shadow(), &ShadowState::Pending);
        assert_eq!(light.prepare_shadow(&mut binder).unwrap().resolution, 256);
    }

    #[test]
    fn warp_defaults_to_identity() {
        let mut light = Light::new(0, Vec3::ZERO, 128);
        assert!(light.coefficients().is_none());
        assert!(light.warp().is_identity());
        let mut c = PolynomialCoefficients::identity();
        c.x = umbra_warp::CoeffMatrix::from_rows([[1.0; 4]; 4]);
        light.store_coefficients(c);
        assert_eq!(light.warp(), c);
    }
}
