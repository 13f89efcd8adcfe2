use std::collections::HashMap;

use super::pipelines::{PipelineKey, Pipelines, SceneKind};
use super::uniforms::{PassUniform, SceneUniform};
use crate::device::readback::{LayerCopy, read_texture_layer};
use crate::render::{RenderCtx, layer_view};
use crate::scene::ShadowCasters;
use crate::shadow::binder::{FullscreenPass, ResourceBinder, ScenePass};
use crate::shadow::error::{FramebufferStatus, ShadowError};
use crate::shadow::resources::{Attachment, ResourceTable, TextureDesc, TextureFormat};

/// wgpu implementation of [`ResourceBinder`].
///
/// Every pass records into its own encoder and is submitted immediately, so
/// uniform writes and passes stay in call order on the queue.
pub struct GpuBinder<'g> {
    ctx: RenderCtx<'g>,
    table: ResourceTable,
    textures: HashMap<String, wgpu::Texture>,
    pipelines: Pipelines,
    pass_ubo: Option<wgpu::Buffer>,
    scene_ubo: Option<wgpu::Buffer>,
    warned_wireframe: bool,
}

impl<'g> GpuBinder<'g> {
    pub fn new(ctx: RenderCtx<'g>) -> Self {
        Self {
            ctx,
            table: ResourceTable::new(),
            textures: HashMap::new(),
            pipelines: Pipelines::default(),
            pass_ubo: None,
            scene_ubo: None,
            warned_wireframe: false,
        }
    }

    pub fn ctx(&self) -> &RenderCtx<'g> {
        &self.ctx
    }

    /// Reads one layer of a depth texture as normalized depth values.
    pub fn read_depth_layer(&self, name: &str, layer: u32) -> Result<Vec<f32>, ShadowError> {
        let desc = self.desc_of(name)?;
        if desc.format != TextureFormat::Depth32Float || layer >= desc.layers {
            return Err(ShadowError::Readback {
                reason: format!("'{name}' layer {layer} is not a readable depth layer"),
            });
        }
        let bytes = self.read_layer(name, desc, layer, wgpu::TextureAspect::DepthOnly)?;
        Ok(bytes_to_f32(&bytes))
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn desc_of(&self, name: &str) -> Result<TextureDesc, ShadowError> {
        self.table
            .texture(name)
            .ok_or_else(|| ShadowError::resource(name, "no such texture"))
    }

    fn gpu_texture(&self, name: &str) -> Result<&wgpu::Texture, ShadowError> {
        self.textures
            .get(name)
            .ok_or_else(|| ShadowError::resource(name, "no such texture"))
    }

    fn attachment_view(&self, att: &Attachment) -> Result<wgpu::TextureView, ShadowError> {
        Ok(layer_view(self.gpu_texture(&att.texture)?, att.layer))
    }

    fn read_layer(
        &self,
        name: &str,
        desc: TextureDesc,
        layer: u32,
        aspect: wgpu::TextureAspect,
    ) -> Result<Vec<u8>, ShadowError> {
        let texture = self.gpu_texture(name)?;
        let copy = LayerCopy {
            width: desc.width,
            height: desc.height,
            layer,
            bytes_per_texel: desc.format.bytes_per_texel(),
            aspect,
        };
        read_texture_layer(self.ctx.device, self.ctx.queue, texture, copy)
            .map_err(|e| ShadowError::Readback { reason: e.to_string() })
    }

    fn check_limits(&self, name: &str, desc: &TextureDesc) -> Result<(), ShadowError> {
        let limits = self.ctx.device.limits();
        let max = limits.max_texture_dimension_2d;
        if desc.width > max || desc.height > max {
            return Err(ShadowError::resource(
                name,
                format!("{}x{} exceeds the device limit of {max}", desc.width, desc.height),
            ));
        }
        if desc.layers > limits.max_texture_array_layers {
            return Err(ShadowError::resource(
                name,
                format!("{} layers exceeds the device limit of {}", desc.layers, limits.max_texture_array_layers),
            ));
        }
        Ok(())
    }

    /// Builds `key` if missing. A pipeline the device rejects is not cached.
    fn build_pipeline(&mut self, key: PipelineKey, fbo: &str) -> Result<(), ShadowError> {
        let ctx = self.ctx;
        let pipelines = &mut self.pipelines;
        if let Err(e) = ctx.validated(|| pipelines.ensure(ctx.device, key)) {
            self.pipelines.evict(key);
            return Err(ShadowError::resource(fbo, format!("pipeline {key:?} rejected: {e}")));
        }
        Ok(())
    }

    fn ensure_ubo<T>(slot: &mut Option<wgpu::Buffer>, device: &wgpu::Device, label: &'static str) {
        if slot.is_some() {
            return;
        }
        *slot = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<T>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
    }

    fn wireframe_for(&mut self, requested: bool) -> bool {
        if !requested {
            return false;
        }
        if self.ctx.supports_wireframe() {
            return true;
        }
        if !self.warned_wireframe {
            log::warn!("wireframe requested but POLYGON_MODE_LINE is unavailable; drawing filled");
            self.warned_wireframe = true;
        }
        false
    }
}

impl ResourceBinder for GpuBinder<'_> {
    type Scene = dyn ShadowCasters;

    fn create_data_texture(&mut self, name: &str, desc: TextureDesc) -> Result<(), ShadowError> {
        self.check_limits(name, &desc)?;

        let usage = if desc.format.is_depth() {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST
        };

        let device = self.ctx.device;
        let texture = self
            .ctx
            .validated(|| {
                device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(name),
                    size: wgpu::Extent3d {
                        width: desc.width,
                        height: desc.height,
                        depth_or_array_layers: desc.layers,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: desc.format.to_wgpu(),
                    usage,
                    view_formats: &[],
                })
            })
            .map_err(|e| ShadowError::resource(name, e.to_string()))?;

        self.table.insert_texture(name, desc)?;
        log::debug!("texture '{name}': {}x{}x{} {:?}", desc.width, desc.height, desc.layers, desc.format);
        self.textures.insert(name.to_string(), texture);
        Ok(())
    }

    fn texture_desc(&self, name: &str) -> Option<TextureDesc> {
        self.table.texture(name)
    }

    fn create_framebuffer(&mut self, name: &str) -> Result<(), ShadowError> {
        self.table.create_framebuffer(name);
        Ok(())
    }

    fn attach_color_texture(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError> {
        self.table.attach_color(fbo, texture, layer)
    }

    fn attach_depth_texture(&mut self, fbo: &str, texture: &str, layer: u32) -> Result<(), ShadowError> {
        self.table.attach_depth(fbo, texture, layer)
    }

    fn detach_depth(&mut self, fbo: &str) -> Result<(), ShadowError> {
        self.table.detach_depth(fbo)
    }

    fn check_framebuffer_complete(&self, fbo: &str) -> FramebufferStatus {
        self.table.status(fbo)
    }

    fn upload_texels(&mut self, texture: &str, texels: &[[f32; 4]]) -> Result<(), ShadowError> {
        let desc = self.desc_of(texture)?;
        if desc.format != TextureFormat::Rgba32Float {
            return Err(ShadowError::resource(texture, "texel upload needs an Rgba32Float texture"));
        }
        if texels.len() != desc.texel_count() {
            return Err(ShadowError::resource(
                texture,
                format!("expected {} texels, got {}", desc.texel_count(), texels.len()),
            ));
        }

        let target = self.gpu_texture(texture)?;
        self.ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(desc.width * desc.format.bytes_per_texel()),
                rows_per_image: Some(desc.height),
            },
            wgpu::Extent3d { width: desc.width, height: desc.height, depth_or_array_layers: 1 },
        );
        Ok(())
    }

    fn render_fullscreen_pass(&mut self, fbo: &str, pass: &FullscreenPass<'_>) -> Result<(), ShadowError> {
        self.require_complete(fbo)?;
        let color = self
            .table
            .framebuffer(fbo)
            .and_then(|fb| fb.color.clone())
            .ok_or_else(|| ShadowError::resource(fbo, "fullscreen pass needs a colour attachment"))?;

        let inputs = pass.inputs();
        if inputs.contains(&color.texture.as_str()) {
            return Err(ShadowError::resource(fbo, format!("pass reads its own target '{}'", color.texture)));
        }

        let format = self.desc_of(&color.texture)?.format;
        let key = PipelineKey::Fullscreen { kind: pass.kind(), color: format };
        let ctx = self.ctx;
        let device = ctx.device;
        self.build_pipeline(key, fbo)?;
        Self::ensure_ubo::<PassUniform>(&mut self.pass_ubo, device, "umbra pass ubo");

        let target = self.attachment_view(&color)?;
        let input_a = layer_view(self.gpu_texture(inputs[0])?, 0);
        let input_b = layer_view(self.gpu_texture(inputs[1])?, 0);

        let (Some(pipeline), Some(bgl), Some(ubo)) =
            (self.pipelines.get(key), self.pipelines.fullscreen_bgl(), self.pass_ubo.as_ref())
        else {
            return Err(ShadowError::resource(fbo, "fullscreen pipeline unavailable"));
        };

        ctx.validated(|| {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&PassUniform::for_pass(pass)));

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("umbra fullscreen bg"),
                layout: bgl,
                entries: &[
                    wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&input_a) },
                    wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&input_b) },
                ],
            });

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("umbra fullscreen encoder"),
            });
            {
                let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("umbra fullscreen pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
            ctx.submit(encoder);
        })
        .map_err(|e| ShadowError::resource(fbo, e.to_string()))?;
        log::trace!("fullscreen {:?} -> '{fbo}'", pass.kind());
        Ok(())
    }

    fn render_scene_pass(
        &mut self,
        fbo: &str,
        pass: &ScenePass<'_>,
        scene: &Self::Scene,
    ) -> Result<(), ShadowError> {
        self.require_complete(fbo)?;
        let (color, depth) = match self.table.framebuffer(fbo) {
            Some(fb) => match (fb.color.clone(), fb.depth.clone()) {
                (Some(c), Some(d)) => (c, d),
                _ => return Err(ShadowError::resource(fbo, "scene pass needs colour and depth attachments")),
            },
            None => return Err(ShadowError::resource(fbo, "no such framebuffer")),
        };

        let (kind, wireframe, clear) = match pass {
            ScenePass::LightSpaceCoords { clear, .. } => (SceneKind::Coords, false, f64::from(*clear)),
            ScenePass::Depth { wireframe, .. } => (SceneKind::Depth, self.wireframe_for(*wireframe), 1.0),
        };

        let format = self.desc_of(&color.texture)?.format;
        let key = PipelineKey::Scene { kind, color: format, wireframe };
        let ctx = self.ctx;
        let device = ctx.device;
        self.build_pipeline(key, fbo)?;
        Self::ensure_ubo::<SceneUniform>(&mut self.scene_ubo, device, "umbra scene ubo");

        let color_view = self.attachment_view(&color)?;
        let depth_view = self.attachment_view(&depth)?;

        let (Some(pipeline), Some(bgl), Some(ubo)) =
            (self.pipelines.get(key), self.pipelines.scene_bgl(), self.scene_ubo.as_ref())
        else {
            return Err(ShadowError::resource(fbo, "scene pipeline unavailable"));
        };

        ctx.validated(|| {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&SceneUniform::for_pass(pass)));

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("umbra scene bg"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
            });

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("umbra scene encoder"),
            });
            {
                let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("umbra scene pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color { r: clear, g: clear, b: clear, a: clear }),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &bind_group, &[]);
                scene.draw(&mut rpass);
            }
            ctx.submit(encoder);
        })
        .map_err(|e| ShadowError::resource(fbo, e.to_string()))?;
        log::trace!("scene {kind:?} -> '{fbo}' (layer {})", color.layer);
        Ok(())
    }

    fn read_back_rg(&mut self, texture: &str) -> Result<Vec<f32>, ShadowError> {
        let desc = self.desc_of(texture)?;
        if desc.format != TextureFormat::Rgba32Float {
            return Err(ShadowError::Readback {
                reason: format!("'{texture}' is not an Rgba32Float texture"),
            });
        }
        let bytes = self.read_layer(texture, desc, 0, wgpu::TextureAspect::All)?;
        let rgba = bytes_to_f32(&bytes);
        Ok(rgba.chunks_exact(4).flat_map(|t| [t[0], t[1]]).collect())
    }
}

fn bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Gpu, GpuInit};
    use crate::scene::{GpuScene, Mesh};
    use glam::Vec3;

    #[test]
    fn bytes_decode_little_endian() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-2.0f32).to_le_bytes());
        assert_eq!(bytes_to_f32(&bytes), vec![1.5, -2.0]);
    }

    // ── device tests (need an adapter) ─────────────────────────────────────

    /// Downlevel backends (GL) refuse float render targets and depth copies.
    /// Those refusals must come back as errors; the tests below stop there.
    fn supported<T>(result: Result<T, ShadowError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e @ (ShadowError::ResourceCreation { .. } | ShadowError::Readback { .. })) => {
                eprintln!("adapter refused: {e}");
                None
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn uploaded_texels_read_back_as_rg_pairs() {
        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let mut binder = GpuBinder::new(RenderCtx::from_gpu(&gpu));
        let desc = TextureDesc::new(2, 1, TextureFormat::Rgba32Float);
        if supported(binder.create_data_texture("grid", desc)).is_none() {
            return;
        }
        binder.upload_texels("grid", &[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]).unwrap();
        assert_eq!(binder.read_back_rg("grid").unwrap(), vec![1.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn refused_texture_is_not_registered() {
        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let mut binder = GpuBinder::new(RenderCtx::from_gpu(&gpu));
        let too_wide = gpu.device().limits().max_texture_dimension_2d + 1;
        let result = binder.create_data_texture("wide", TextureDesc::new(too_wide, 1, TextureFormat::Rgba16Float));
        assert!(matches!(result, Err(ShadowError::ResourceCreation { .. })));
        assert_eq!(binder.texture_desc("wide"), None);

        // Whatever the adapter decides, the binder and the table agree.
        let result = binder.create_data_texture("coords", TextureDesc::new(16, 16, TextureFormat::Rgba32Float));
        assert_eq!(result.is_ok(), binder.texture_desc("coords").is_some());
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn fullscreen_pass_rejects_reading_its_target() {
        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let mut binder = GpuBinder::new(RenderCtx::from_gpu(&gpu));
        binder
            .create_data_texture("t", TextureDesc::new(4, 4, TextureFormat::Rgba16Float))
            .unwrap();
        binder.create_framebuffer("fbo").unwrap();
        binder.attach_color_texture("fbo", "t", 0).unwrap();
        let pass = FullscreenPass::Gradient { source: "t" };
        assert!(binder.render_fullscreen_pass("fbo", &pass).is_err());
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn depth_pass_writes_paraboloid_depth() {
        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let ctx = RenderCtx::from_gpu(&gpu);
        let scene = GpuScene::upload(&ctx, &Mesh::cuboid(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0)));
        let mut binder = GpuBinder::new(ctx);
        binder
            .create_data_texture("c", TextureDesc::layered(64, 64, 2, TextureFormat::Rgba16Float))
            .unwrap();
        binder
            .create_data_texture("d", TextureDesc::layered(64, 64, 2, TextureFormat::Depth32Float))
            .unwrap();
        binder.create_framebuffer("fbo").unwrap();
        binder.attach_color_texture("fbo", "c", 0).unwrap();
        binder.attach_depth_texture("fbo", "d", 0).unwrap();

        let views = crate::shadow::hemisphere_views(Vec3::ZERO, 1000.0);
        let identity = umbra_warp::PolynomialCoefficients::identity();
        let pass = ScenePass::Depth {
            light_view: views[0],
            coefficients: &identity,
            strength: 1.0,
            near_far: [1.0, 1000.0],
            wireframe: false,
        };
        binder.render_scene_pass("fbo", &pass, &scene).unwrap();
        let Some(depth) = supported(binder.read_depth_layer("d", 0)) else {
            return;
        };
        assert!(depth.iter().any(|d| *d < 1.0));
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn warped_system_reports_on_any_adapter() {
        use crate::shadow::{FrameInputs, Light, ShadowConfig, ShadowSystem, ShadowTechnique};
        use glam::Mat4;

        let gpu = Gpu::new_blocking(GpuInit::default()).unwrap();
        let ctx = RenderCtx::from_gpu(&gpu);
        let scene = GpuScene::upload(&ctx, &Mesh::plane(Vec3::new(0.0, -2.0, 0.0), 20.0));
        let casters: &(dyn ShadowCasters + 'static) = &scene;
        let mut binder = GpuBinder::new(ctx);
        let mut system = ShadowSystem::new(ShadowTechnique::warped(), ShadowConfig::default()).unwrap();
        let mut lights = vec![Light::new(0, Vec3::new(0.0, 5.0, 0.0), 64)];
        let frame = FrameInputs {
            camera_view_proj: Mat4::perspective_rh(1.0, 1.0, 0.5, 100.0)
                * Mat4::look_at_rh(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO, Vec3::Y),
            camera_viewport: [64.0, 64.0],
        };

        let reports = system.render(&mut binder, &mut lights, casters, &frame);
        assert_eq!(reports.len(), 1);
        if let Err(e) = &reports[0].result {
            assert!(matches!(e, ShadowError::ResourceCreation { .. } | ShadowError::Readback { .. }), "{e}");
        }
    }
}
