//! Warped dual-paraboloid shadows.
//!
//! Per light and frame:
//! - the scene is projected into the analysed hemisphere ([`ErrorPipeline`])
//! - alias error is blurred, differentiated and sampled at 16 control points
//! - the samples are fitted to a bicubic warp (`umbra_warp::fit`)
//! - both hemispheres are rendered with that warp ([`WarpedDepthRenderer`])
//!
//! All GPU work goes through [`ResourceBinder`]; [`GpuBinder`] is the wgpu
//! backend.

mod binder;
mod config;
mod control_grid;
mod error;
mod error_pipeline;
mod gpu;
mod light;
mod paraboloid;
mod resources;
mod stage;
mod technique;
mod warped_depth;

#[cfg(test)]
mod testing;

pub use binder::{BlurAxis, FullscreenKind, FullscreenPass, ResourceBinder, ScenePass};
pub use config::ShadowConfig;
pub use control_grid::{GRID_PING, GRID_PONG, GpuControlGrid};
pub use error::{FramebufferStatus, ShadowError};
pub use error_pipeline::{ErrorInputs, ErrorPipeline, PreviewTexture};
pub use gpu::GpuBinder;
pub use light::{Light, ShadowMapEntry, ShadowState};
pub use paraboloid::{
    Hemisphere, ParaboloidPoint, ShadowLookup, hemisphere_views, hemisphere_views_along, project,
    shadow_lookup,
};
pub use resources::{Attachment, FramebufferState, ResourceTable, TextureDesc, TextureFormat, framebuffer_status};
pub use stage::{ErrorStage, PassTrace};
pub use technique::{ComputedShadow, FrameInputs, ShadowReport, ShadowSystem, ShadowTechnique, WarpOutcome, WarpedShadow};
pub use warped_depth::WarpedDepthRenderer;
