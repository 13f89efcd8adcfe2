//! Named textures and framebuffers, independent of the GPU backend.
//!
//! A framebuffer here is just a record of what is attached where. Backends
//! keep a [`ResourceTable`] next to their real textures so completeness is
//! decided the same way everywhere.

use std::collections::HashMap;

use super::error::{FramebufferStatus, ShadowError};

/// Storage formats used by the shadow pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba32Float,
    Rgba16Float,
    Depth32Float,
}

impl TextureFormat {
    #[inline]
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }

    pub fn bytes_per_texel(self) -> u32 {
        match self {
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Depth32Float => 4,
        }
    }

    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub layers: u32,
    pub format: TextureFormat,
}

impl TextureDesc {
    pub const fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self { width, height, layers: 1, format }
    }

    pub const fn layered(width: u32, height: u32, layers: u32, format: TextureFormat) -> Self {
        Self { width, height, layers, format }
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub texture: String,
    pub layer: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramebufferState {
    pub color: Option<Attachment>,
    pub depth: Option<Attachment>,
}

/// Completeness of `fb`, resolving texture names with `lookup`.
pub fn framebuffer_status<F>(fb: &FramebufferState, lookup: F) -> FramebufferStatus
where
    F: Fn(&str) -> Option<TextureDesc>,
{
    if fb.color.is_none() && fb.depth.is_none() {
        return FramebufferStatus::MissingAttachment;
    }

    let resolve = |att: &Attachment, want_depth: bool| -> Option<TextureDesc> {
        let desc = lookup(&att.texture)?;
        (desc.format.is_depth() == want_depth && att.layer < desc.layers).then_some(desc)
    };

    let mut sizes = Vec::with_capacity(2);
    for (slot, want_depth) in [(&fb.color, false), (&fb.depth, true)] {
        if let Some(att) = slot {
            match resolve(att, want_depth) {
                Some(desc) => sizes.push((desc.width, desc.height)),
                None => return FramebufferStatus::IncompleteAttachment,
            }
        }
    }

    if sizes.windows(2).any(|w| w[0] != w[1]) {
        return FramebufferStatus::IncompleteDimensions;
    }
    FramebufferStatus::Complete
}

/// Name-keyed registry of texture descriptors and framebuffer attachments.
#[derive(Debug, Default)]
pub struct ResourceTable {
    textures: HashMap<String, TextureDesc>,
    framebuffers: HashMap<String, FramebufferState>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a texture. Rejects empty extents.
    pub fn insert_texture(&mut self, name: &str, desc: TextureDesc) -> Result<(), ShadowError> {
        if desc.width == 0 || desc.height == 0 || desc.layers == 0 {
            return Err(ShadowError::resource(
                name,
                format!("empty extent {}x{}x{}", desc.width, desc.height, desc.layers),
            ));
        }
        self.textures.insert(name.to_string(), desc);
        Ok(())
    }

    pub fn texture(&self, name: &str) -> Option<TextureDesc> {
        self.textures.get(name).copied()
    }

    /// Creates an empty framebuffer, dropping any previous attachments.
    pub fn create_framebuffer(&mut self, name: &str) {
        self.framebuffers.insert(name.to_string(), FramebufferState::default());
    }

    pub fn framebuffer(&self, name: &str) -> Option<&FramebufferState> {
        self.framebuffers.get(name)
    }

    fn framebuffer_mut(&mut self, name: &str) -> Result<&mut FramebufferState, ShadowError> {
        self.framebuffers
            .get_mut(name)
            .ok_or_else(|| ShadowError::resource(name, "no such framebuffer"))
    }

    /// Unknown textures are accepted here and reported by [`Self::status`].
    pub fn attach_color(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError> {
        self.framebuffer_mut(fbo)?.color = Some(Attachment { texture: texture.to_string(), layer });
        Ok(())
    }

    pub fn attach_depth(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError> {
        self.framebuffer_mut(fbo)?.depth = Some(Attachment { texture: texture.to_string(), layer });
        Ok(())
    }

    pub fn detach_depth(&mut self, fbo: &str) -> Result<(), ShadowError> {
        self.framebuffer_mut(fbo)?.depth = None;
        Ok(())
    }

    /// Unknown framebuffers count as having nothing attached.
    pub fn status(&self, fbo: &str) -> FramebufferStatus {
        match self.framebuffers.get(fbo) {
            Some(fb) => framebuffer_status(fb, |name| self.texture(name)),
            None => FramebufferStatus::MissingAttachment,
        }
    }

    /// Size of the render area of a complete framebuffer.
    pub fn extent(&self, fbo: &str) -> Option<(u32, u32)> {
        let fb = self.framebuffers.get(fbo)?;
        let att = fb.color.as_ref().or(fb.depth.as_ref())?;
        self.texture(&att.texture).map(|d| (d.width, d.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResourceTable {
        let mut t = ResourceTable::new();
        t.insert_texture("color", TextureDesc::layered(64, 64, 2, TextureFormat::Rgba16Float)).unwrap();
        t.insert_texture("depth", TextureDesc::layered(64, 64, 2, TextureFormat::Depth32Float)).unwrap();
        t.insert_texture("small", TextureDesc::new(8, 8, TextureFormat::Rgba32Float)).unwrap();
        t.create_framebuffer("fbo");
        t
    }

    #[test]
    fn empty_framebuffer_is_missing_attachment() {
        let t = table();
        assert_eq!(t.status("fbo"), FramebufferStatus::MissingAttachment);
        assert_eq!(t.status("nope"), FramebufferStatus::MissingAttachment);
    }

    #[test]
    fn matching_color_and_depth_is_complete() {
        let mut t = table();
        t.attach_color("fbo", "color", 1).unwrap();
        t.attach_depth("fbo", "depth", 1).unwrap();
        assert_eq!(t.status("fbo"), FramebufferStatus::Complete);
        assert_eq!(t.extent("fbo"), Some((64, 64)));
    }

    #[test]
    fn layer_out_of_range_is_incomplete() {
        let mut t = table();
        t.attach_color("fbo", "color", 2).unwrap();
        assert_eq!(t.status("fbo"), FramebufferStatus::IncompleteAttachment);
    }

    #[test]
    fn wrong_slot_kind_is_incomplete() {
        let mut t = table();
        t.attach_color("fbo", "depth", 0).unwrap();
        assert_eq!(t.status("fbo"), FramebufferStatus::IncompleteAttachment);
    }

    #[test]
    fn unknown_texture_is_incomplete() {
        let mut t = table();
        t.attach_color("fbo", "ghost", 0).unwrap();
        assert_eq!(t.status("fbo"), FramebufferStatus::IncompleteAttachment);
    }

    #[test]
    fn size_mismatch_is_incomplete_dimensions() {
        let mut t = table();
        t.attach_color("fbo", "small", 0).unwrap();
        t.attach_depth("fbo", "depth", 0).unwrap();
        assert_eq!(t.status("fbo"), FramebufferStatus::IncompleteDimensions);
        t.detach_depth("fbo").unwrap();
        assert_eq!(t.status("fbo"), FramebufferStatus::Complete);
    }

    #[test]
    fn attaching_to_unknown_framebuffer_fails() {
        let mut t = table();
        assert!(matches!(
            t.attach_color("nope", "color", 0),
            Err(ShadowError::ResourceCreation { .. })
        ));
    }

    #[test]
    fn zero_sized_texture_rejected() {
        let mut t = ResourceTable::new();
        assert!(t.insert_texture("z", TextureDesc::new(0, 4, TextureFormat::Rgba32Float)).is_err());
        assert!(t.texture("z").is_none());
    }
}
