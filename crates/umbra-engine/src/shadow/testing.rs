//! Recording [`ResourceBinder`] for orchestration tests.

use std::collections::HashSet;

use glam::Mat4;
use umbra_warp::PolynomialCoefficients;

use super::binder::{FullscreenKind, FullscreenPass, ResourceBinder, ScenePass};
use super::error::{FramebufferStatus, ShadowError};
use super::resources::{ResourceTable, TextureDesc};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture { name: String, desc: TextureDesc },
    CreateFramebuffer(String),
    AttachColor { fbo: String, texture: String, layer: u32 },
    AttachDepth { fbo: String, texture: String, layer: u32 },
    DetachDepth(String),
    Upload { texture: String, texels: Vec<[f32; 4]> },
    Fullscreen { fbo: String, kind: FullscreenKind, inputs: [String; 2], target: String },
    Coords { fbo: String, light_view: Mat4, layer: u32 },
    Depth { fbo: String, light_view: Mat4, coefficients: PolynomialCoefficients, layer: u32 },
    ReadBack(String),
}

#[derive(Debug, Default)]
pub struct RecordingBinder {
    table: ResourceTable,
    calls: Vec<Call>,
    /// Returned by `read_back_rg`; 32 zeros when empty.
    pub readback: Vec<f32>,
    /// Framebuffers reported incomplete regardless of attachments.
    pub broken_framebuffers: HashSet<String>,
    /// Textures whose creation fails.
    pub broken_textures: HashSet<String>,
    pub fail_readback: bool,
}

impl RecordingBinder {
    pub fn with_readback(values: Vec<f32>) -> Self {
        Self { readback: values, ..Self::default() }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn uploads(&self) -> impl Iterator<Item = (&str, &[[f32; 4]])> {
        self.calls.iter().filter_map(|c| match c {
            Call::Upload { texture, texels } => Some((texture.as_str(), texels.as_slice())),
            _ => None,
        })
    }

    pub fn fullscreen_kinds(&self) -> Vec<FullscreenKind> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Fullscreen { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn depth_coefficients(&self) -> Vec<PolynomialCoefficients> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Depth { coefficients, .. } => Some(*coefficients),
                _ => None,
            })
            .collect()
    }

    pub fn color_of(&self, fbo: &str) -> Option<String> {
        self.table.framebuffer(fbo)?.color.as_ref().map(|a| a.texture.clone())
    }

    fn color_attachment(&self, fbo: &str) -> (String, u32) {
        self.table
            .framebuffer(fbo)
            .and_then(|fb| fb.color.as_ref())
            .map(|a| (a.texture.clone(), a.layer))
            .unwrap_or_default()
    }
}

impl ResourceBinder for RecordingBinder {
    type Scene = ();

    fn create_data_texture(&mut self, name: &str, desc: TextureDesc) -> Result<(), ShadowError> {
        self.calls.push(Call::CreateTexture { name: name.to_string(), desc });
        if self.broken_textures.contains(name) {
            return Err(ShadowError::resource(name, "out of memory"));
        }
        self.table.insert_texture(name, desc)
    }

    fn texture_desc(&self, name: &str) -> Option<TextureDesc> {
        self.table.texture(name)
    }

    fn create_framebuffer(&mut self, name: &str) -> Result<(), ShadowError> {
        self.calls.push(Call::CreateFramebuffer(name.to_string()));
        self.table.create_framebuffer(name);
        Ok(())
    }

    fn attach_color_texture(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError> {
        self.calls.push(Call::AttachColor { fbo: fbo.to_string(), texture: texture.to_string(), layer });
        self.table.attach_color(fbo, texture, layer)
    }

    fn attach_depth_texture(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError> {
        self.calls.push(Call::AttachDepth { fbo: fbo.to_string(), texture: texture.to_string(), layer });
        self.table.attach_depth(fbo, texture, layer)
    }

    fn detach_depth(&mut self, fbo: &str) -> Result<(), ShadowError> {
        self.calls.push(Call::DetachDepth(fbo.to_string()));
        self.table.detach_depth(fbo)
    }

    fn check_framebuffer_complete(&self, fbo: &str) -> FramebufferStatus {
        if self.broken_framebuffers.contains(fbo) {
            return FramebufferStatus::IncompleteAttachment;
        }
        self.table.status(fbo)
    }

    fn upload_texels(&mut self, texture: &str, texels: &[[f32; 4]]) -> Result<(), ShadowError> {
        self.calls.push(Call::Upload { texture: texture.to_string(), texels: texels.to_vec() });
        Ok(())
    }

    fn render_fullscreen_pass(&mut self, fbo: &str, pass: &FullscreenPass<'_>) -> Result<(), ShadowError> {
        self.require_complete(fbo)?;
        let (target, _) = self.color_attachment(fbo);
        let [a, b] = pass.inputs();
        self.calls.push(Call::Fullscreen {
            fbo: fbo.to_string(),
            kind: pass.kind(),
            inputs: [a.to_string(), b.to_string()],
            target,
        });
        Ok(())
    }

    fn render_scene_pass(&mut self, fbo: &str, pass: &ScenePass<'_>, _scene: &()) -> Result<(), ShadowError> {
        self.require_complete(fbo)?;
        let (_, layer) = self.color_attachment(fbo);
        let call = match pass {
            ScenePass::LightSpaceCoords { light_view, .. } => {
                Call::Coords { fbo: fbo.to_string(), light_view: *light_view, layer }
            }
            ScenePass::Depth { light_view, coefficients, .. } => Call::Depth {
                fbo: fbo.to_string(),
                light_view: *light_view,
                coefficients: **coefficients,
                layer,
            },
        };
        self.calls.push(call);
        Ok(())
    }

    fn read_back_rg(&mut self, texture: &str) -> Result<Vec<f32>, ShadowError> {
        self.calls.push(Call::ReadBack(texture.to_string()));
        if self.fail_readback {
            return Err(ShadowError::Readback { reason: "map failed".to_string() });
        }
        if self.readback.is_empty() {
            return Ok(vec![0.0; 32]);
        }
        Ok(self.readback.clone())
    }
}
