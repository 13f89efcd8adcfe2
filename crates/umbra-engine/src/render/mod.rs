//! GPU rendering helpers shared by the shadow passes.
//!
//! Convention:
//! - Fullscreen passes draw one oversized triangle from `vertex_index`; no
//!   vertex buffers.
//! - Data textures are read with `textureLoad` (unfilterable float), so no
//!   samplers are bound.

mod ctx;
mod layout;

pub use ctx::RenderCtx;
pub use layout::{
    color_target, data_texture_entry, fullscreen_primitive, layer_view, uniform_entry,
    uniform_min_binding_size,
};
