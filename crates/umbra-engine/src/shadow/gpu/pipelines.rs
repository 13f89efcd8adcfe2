use std::collections::HashMap;

use super::uniforms::{PassUniform, SceneUniform};
use crate::render::{color_target, data_texture_entry, fullscreen_primitive, uniform_entry};
use crate::scene::Vertex;
use crate::shadow::binder::FullscreenKind;
use crate::shadow::resources::TextureFormat;

const FULLSCREEN_PRELUDE: &str = include_str!("../shaders/fullscreen.wgsl");
const SCENE_PRELUDE: &str = include_str!("../shaders/paraboloid.wgsl");

/// Which scene program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum SceneKind {
    Coords,
    Depth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum PipelineKey {
    Fullscreen { kind: FullscreenKind, color: TextureFormat },
    Scene { kind: SceneKind, color: TextureFormat, wireframe: bool },
}

impl FullscreenKind {
    fn shader(self) -> (&'static str, &'static str) {
        match self {
            FullscreenKind::AliasError => (include_str!("../shaders/alias_error.wgsl"), "fs_alias_error"),
            FullscreenKind::BlurHorizontal => (include_str!("../shaders/blur.wgsl"), "fs_blur_horizontal"),
            FullscreenKind::BlurVertical => (include_str!("../shaders/blur.wgsl"), "fs_blur_vertical"),
            FullscreenKind::Gradient => (include_str!("../shaders/gradient.wgsl"), "fs_gradient"),
            FullscreenKind::RelaxPoints => (include_str!("../shaders/relax.wgsl"), "fs_relax"),
            FullscreenKind::SampleGrid => (include_str!("../shaders/sample_grid.wgsl"), "fs_sample_grid"),
        }
    }
}

impl SceneKind {
    fn shader(self) -> (&'static str, &'static str, &'static str) {
        match self {
            SceneKind::Coords => (include_str!("../shaders/coords.wgsl"), "vs_coords", "fs_coords"),
            SceneKind::Depth => (include_str!("../shaders/depth.wgsl"), "vs_depth", "fs_depth"),
        }
    }
}

/// Lazily built layouts and a pipeline per (program, target format).
#[derive(Default)]
pub(super) struct Pipelines {
    fullscreen_bgl: Option<wgpu::BindGroupLayout>,
    fullscreen_layout: Option<wgpu::PipelineLayout>,
    scene_bgl: Option<wgpu::BindGroupLayout>,
    scene_layout: Option<wgpu::PipelineLayout>,
    cache: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn fullscreen_bgl(&self) -> Option<&wgpu::BindGroupLayout> {
        self.fullscreen_bgl.as_ref()
    }

    pub fn scene_bgl(&self) -> Option<&wgpu::BindGroupLayout> {
        self.scene_bgl.as_ref()
    }

    pub fn get(&self, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.cache.get(&key)
    }

    /// Builds the pipeline for `key` (and the layouts it needs) if missing.
    /// Drops a cached pipeline the device rejected, so the next pass rebuilds it.
    pub fn evict(&mut self, key: PipelineKey) {
        self.cache.remove(&key);
    }

    pub fn ensure(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.cache.contains_key(&key) {
            return;
        }
        self.ensure_layouts(device);

        let pipeline = match key {
            PipelineKey::Fullscreen { kind, color } => self.build_fullscreen(device, kind, color),
            PipelineKey::Scene { kind, color, wireframe } => self.build_scene(device, kind, color, wireframe),
        };
        if let Some(pipeline) = pipeline {
            log::debug!("shadow pipeline built: {key:?}");
            self.cache.insert(key, pipeline);
        }
    }

    fn ensure_layouts(&mut self, device: &wgpu::Device) {
        if self.fullscreen_layout.is_none() {
            let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("umbra fullscreen bgl"),
                entries: &[
                    uniform_entry::<PassUniform>(0, wgpu::ShaderStages::FRAGMENT),
                    data_texture_entry(1),
                    data_texture_entry(2),
                ],
            });
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("umbra fullscreen pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });
            self.fullscreen_bgl = Some(bgl);
            self.fullscreen_layout = Some(layout);
        }

        if self.scene_layout.is_none() {
            let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("umbra scene bgl"),
                entries: &[uniform_entry::<SceneUniform>(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("umbra scene pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });
            self.scene_bgl = Some(bgl);
            self.scene_layout = Some(layout);
        }
    }

    fn build_fullscreen(
        &self,
        device: &wgpu::Device,
        kind: FullscreenKind,
        color: TextureFormat,
    ) -> Option<wgpu::RenderPipeline> {
        let layout = self.fullscreen_layout.as_ref()?;
        let (body, fs_entry) = kind.shader();
        let source = format!("{FULLSCREEN_PRELUDE}\n{body}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(fs_entry),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(fs_entry),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(fs_entry),
                compilation_options: Default::default(),
                targets: &[color_target(color.to_wgpu())],
            }),
            primitive: fullscreen_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }

    fn build_scene(
        &self,
        device: &wgpu::Device,
        kind: SceneKind,
        color: TextureFormat,
        wireframe: bool,
    ) -> Option<wgpu::RenderPipeline> {
        let layout = self.scene_layout.as_ref()?;
        let (body, vs_entry, fs_entry) = kind.shader();
        let source = format!("{SCENE_PRELUDE}\n{body}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(vs_entry),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(vs_entry),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(vs_entry),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(fs_entry),
                compilation_options: Default::default(),
                targets: &[color_target(color.to_wgpu())],
            }),
            // Render back faces only, like the rest of the shadow pipeline.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Front),
                polygon_mode: if wireframe { wgpu::PolygonMode::Line } else { wgpu::PolygonMode::Fill },
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }
}
