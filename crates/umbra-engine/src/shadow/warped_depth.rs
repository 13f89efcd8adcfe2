use glam::Mat4;
use umbra_warp::PolynomialCoefficients;

use super::binder::{ResourceBinder, ScenePass};
use super::config::ShadowConfig;
use super::error::ShadowError;
use super::light::ShadowMapEntry;
use super::paraboloid::Hemisphere;

pub const FBO_WARPED: &str = "fbo.warped";

/// Points [`FBO_WARPED`] at `layer` of both shadow targets and checks it.
pub(crate) fn bind_layer<B>(binder: &mut B, entry: &ShadowMapEntry, layer: u32) -> Result<(), ShadowError>
where
    B: ResourceBinder + ?Sized,
{
    binder.attach_color_texture(FBO_WARPED, &entry.color, layer)?;
    binder.attach_depth_texture(FBO_WARPED, &entry.depth, layer)?;
    binder.require_complete(FBO_WARPED)
}

/// Renders both paraboloid layers of a shadow map with a polynomial warp.
///
/// Zero coefficients reproduce the plain dual-paraboloid map. The shared
/// [`FBO_WARPED`] is created by [`ShadowMapEntry::create`]; the depth array
/// is detached again once both layers are drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarpedDepthRenderer;

impl WarpedDepthRenderer {
    pub fn render<B>(
        &self,
        binder: &mut B,
        scene: &B::Scene,
        entry: &ShadowMapEntry,
        views: &[Mat4; 2],
        coefficients: &PolynomialCoefficients,
        config: &ShadowConfig,
    ) -> Result<(), ShadowError>
    where
        B: ResourceBinder + ?Sized,
    {
        for hemisphere in Hemisphere::BOTH {
            let layer = hemisphere.layer();
            bind_layer(binder, entry, layer)?;
            binder.render_scene_pass(
                FBO_WARPED,
                &ScenePass::Depth {
                    light_view: views[layer as usize],
                    coefficients,
                    strength: config.warp_strength,
                    near_far: config.near_far(),
                    wireframe: config.wireframe,
                },
                scene,
            )?;
        }
        // Lighting samples the depth array; it must not stay bound as a target.
        binder.detach_depth(FBO_WARPED)
    }
}
