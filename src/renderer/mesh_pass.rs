//! Scene mesh drawing: opaque meshes first, then transparent meshes sorted
//! back to front.
//!
//! Bind group 0 holds the camera and lights, group 1 the material, group 2
//! the per-object matrices at a dynamic offset into one shared buffer.
//! Pipelines are created lazily per (shader, side, blend, transparency).

use std::num::NonZeroU64;

use glam::Mat4;
use rustc_hash::FxHashMap;

use super::gpu_scene::GpuScene;
use super::lights::LightsUniform;
use crate::camera::CameraUniform;
use crate::error::SceneError;
use crate::gpu::dynamic_buffer::{align_to, DynamicBuffer};
use crate::gpu::pipeline_helpers::{
    filtering_sampler, linear_sampler, repeat_sampler, texture_2d, texture_cube,
    uniform_buffer_visible, ADDITIVE_BLEND,
};
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{upload_cubemap, upload_texture, DEPTH_FORMAT, HDR_FORMAT};
use crate::scene::{
    Blending, CubemapData, MaterialHandle, MeshHandle, NodeId, NodeKind, Scene,
    Shading, Side, TextureData, Vertex,
};

/// Shader program a material is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Metal/roughness.
    Standard,
    /// Diffuse only.
    Lambert,
    /// Unlit.
    Basic,
    /// Lava planet surface.
    Planet,
    /// Fresnel rim shell.
    Glow,
}

impl ShaderKind {
    /// Program for a shading model.
    #[must_use]
    pub fn of(shading: &Shading) -> Self {
        match shading {
            Shading::Standard => Self::Standard,
            Shading::Lambert => Self::Lambert,
            Shading::Basic => Self::Basic,
            Shading::Planet { .. } => Self::Planet,
            Shading::Glow { .. } => Self::Glow,
        }
    }
}

/// Everything that selects a distinct render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// Shader program.
    pub shader: ShaderKind,
    /// Face culling.
    pub side: Side,
    /// Blend mode.
    pub blending: Blending,
    /// Blended pass without depth writes.
    pub transparent: bool,
}

/// Model and normal matrices. Must match `ObjectUniform` in the raster
/// shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

const OBJECT_SIZE: u64 = size_of::<ObjectUniform>() as u64;

/// One draw call.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    /// Geometry.
    pub mesh: MeshHandle,
    /// Surface.
    pub material: MaterialHandle,
    /// Pipeline.
    pub key: PipelineKey,
    /// View-space distance, used to sort transparent items.
    pub depth: f32,
    /// Byte offset of this item's object uniform.
    pub offset: u32,
}

/// Draw calls in submission order.
#[derive(Debug, Default)]
pub struct DrawList {
    /// Opaque items followed by back-to-front transparent items.
    pub items: Vec<DrawItem>,
}

/// Order draw items: opaque in scene order, then transparent far to near.
pub fn sort_draw_items(items: &mut Vec<DrawItem>) {
    let (mut opaque, mut transparent): (Vec<_>, Vec<_>) =
        items.drain(..).partition(|item| !item.key.transparent);
    transparent.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    opaque.append(&mut transparent);
    *items = opaque;
}

/// Pipelines, layouts and per-frame buffers for drawing scene meshes.
pub struct MeshPass {
    material_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,

    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    objects: DynamicBuffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,

    standard_shader: wgpu::ShaderModule,
    planet_shader: wgpu::ShaderModule,
    glow_shader: wgpu::ShaderModule,
    pipelines: FxHashMap<PipelineKey, wgpu::RenderPipeline>,

    white: wgpu::TextureView,
    fallback_cube: wgpu::TextureView,
    repeat_sampler: wgpu::Sampler,
    clamp_sampler: wgpu::Sampler,
}

impl MeshPass {
    /// Compose the raster shaders and create the shared layouts.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if a raster shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, SceneError> {
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Layout"),
                entries: &[
                    uniform_buffer_visible(0, both, false),
                    uniform_buffer_visible(1, wgpu::ShaderStages::FRAGMENT, false),
                ],
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Layout"),
                entries: &[
                    uniform_buffer_visible(0, both, false),
                    texture_2d(1),
                    texture_2d(2),
                    texture_cube(3),
                    filtering_sampler(4),
                ],
            });
        let object_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Object Layout"),
                entries: &[uniform_buffer_visible(0, both, true)],
            });
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[&frame_layout, &material_layout, &object_layout],
                push_constant_ranges: &[],
            });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform"),
            size: size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lights Uniform"),
            size: size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let object_stride = align_to(
            OBJECT_SIZE,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let objects = DynamicBuffer::new(
            device,
            "Object Uniforms",
            object_stride * 64,
            wgpu::BufferUsages::UNIFORM,
        );
        let object_bind_group =
            Self::create_object_bind_group(device, &object_layout, objects.buffer());

        let standard_shader = shader_composer.compose(
            device,
            "Standard Shader",
            include_str!("../../assets/shaders/raster/standard.wgsl"),
            "standard.wgsl",
        )?;
        let planet_shader = shader_composer.compose(
            device,
            "Planet Shader",
            include_str!("../../assets/shaders/raster/planet.wgsl"),
            "planet.wgsl",
        )?;
        let glow_shader = shader_composer.compose(
            device,
            "Glow Shader",
            include_str!("../../assets/shaders/raster/glow.wgsl"),
            "glow.wgsl",
        )?;

        let white = upload_texture(device, queue, "White Texture", &TextureData::white());
        let fallback_cube =
            upload_cubemap(device, queue, "Fallback Cubemap", &CubemapData::placeholder());

        Ok(Self {
            material_layout,
            object_layout,
            pipeline_layout,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            objects,
            object_bind_group,
            object_stride,
            standard_shader,
            planet_shader,
            glow_shader,
            pipelines: FxHashMap::default(),
            white,
            fallback_cube,
            repeat_sampler: repeat_sampler(device, "Material Repeat Sampler"),
            clamp_sampler: linear_sampler(device, "Material Clamp Sampler"),
        })
    }

    fn create_object_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: NonZeroU64::new(OBJECT_SIZE),
                }),
            }],
        })
    }

    /// 1×1 white texture bound where a material has no map.
    #[must_use]
    pub(crate) fn white_view(&self) -> &wgpu::TextureView {
        &self.white
    }

    /// Grey cubemap bound where a material has no env map.
    #[must_use]
    pub(crate) fn fallback_cube_view(&self) -> &wgpu::TextureView {
        &self.fallback_cube
    }

    /// Material bind group in the shared group-1 layout.
    #[must_use]
    pub(crate) fn material_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &wgpu::Buffer,
        map: &wgpu::TextureView,
        aux: &wgpu::TextureView,
        env: &wgpu::TextureView,
        repeat: bool,
    ) -> wgpu::BindGroup {
        let sampler = if repeat {
            &self.repeat_sampler
        } else {
            &self.clamp_sampler
        };
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(map),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(aux),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(env),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Upload camera, lights and object matrices for `scene` seen through
    /// `camera`, and make sure every needed pipeline exists.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        gpu: &GpuScene,
        camera: NodeId,
    ) -> DrawList {
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_from_scene(scene, camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));
        let lights = LightsUniform::from_scene(scene);
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(&lights));

        let view = scene.view_matrix(camera);
        let mut items = Vec::new();
        let mut matrices: Vec<Mat4> = Vec::new();
        for (id, node) in scene.iter() {
            let NodeKind::Mesh { mesh, material } = node.kind else {
                continue;
            };
            if gpu.mesh(mesh).is_none() || !scene.is_visible(id) {
                continue;
            }
            let model = scene.world_matrix(id);
            // Zero scale (a closed wormhole) has nothing to draw.
            if model.determinant().abs() < 1e-12 {
                continue;
            }
            let m = scene.material(material);
            let depth = -view.transform_point3(model.w_axis.truncate()).z;
            items.push(DrawItem {
                mesh,
                material,
                key: PipelineKey {
                    shader: ShaderKind::of(&m.shading),
                    side: m.side,
                    blending: m.blending,
                    transparent: m.transparent,
                },
                depth,
                offset: matrices.len() as u32,
            });
            matrices.push(model);
        }
        sort_draw_items(&mut items);

        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; matrices.len().max(1) * stride];
        for (i, model) in matrices.iter().enumerate() {
            let object = ObjectUniform {
                model: model.to_cols_array_2d(),
                normal: model.inverse().transpose().to_cols_array_2d(),
            };
            let start = i * stride;
            bytes[start..start + OBJECT_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&object));
        }
        for item in &mut items {
            item.offset *= self.object_stride as u32;
        }
        if self.objects.write_bytes(device, queue, &bytes) {
            self.object_bind_group = Self::create_object_bind_group(
                device,
                &self.object_layout,
                self.objects.buffer(),
            );
        }

        for item in &items {
            if !self.pipelines.contains_key(&item.key) {
                let pipeline = self.create_pipeline(device, item.key);
                let _ = self.pipelines.insert(item.key, pipeline);
            }
        }

        DrawList { items }
    }

    /// Record the draw calls of `list`.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        gpu: &GpuScene,
        list: &DrawList,
    ) {
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        let mut current: Option<PipelineKey> = None;
        for item in &list.items {
            let (Some(mesh), Some(material), Some(pipeline)) = (
                gpu.mesh(item.mesh),
                gpu.material(item.material),
                self.pipelines.get(&item.key),
            ) else {
                continue;
            };
            if current != Some(item.key) {
                pass.set_pipeline(pipeline);
                current = Some(item.key);
            }
            pass.set_bind_group(1, &material.bind_group, &[]);
            pass.set_bind_group(2, &self.object_bind_group, &[item.offset]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        let (module, entry) = match key.shader {
            ShaderKind::Standard => (&self.standard_shader, "fs_standard"),
            ShaderKind::Lambert => (&self.standard_shader, "fs_lambert"),
            ShaderKind::Basic => (&self.standard_shader, "fs_basic"),
            ShaderKind::Planet => (&self.planet_shader, "fs_main"),
            ShaderKind::Glow => (&self.glow_shader, "fs_main"),
        };
        let cull_mode = match key.side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        };
        let blend = match (key.blending, key.transparent) {
            (Blending::Additive, _) => Some(ADDITIVE_BLEND),
            (Blending::Normal, true) => Some(wgpu::BlendState::ALPHA_BLENDING),
            (Blending::Normal, false) => None,
        };
        let label = format!("{:?} {:?} Pipeline", key.shader, key.side);
        log::debug!("creating {label}");

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: !key.transparent,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::scene::{Material, MeshData};

    fn item(transparent: bool, depth: f32, offset: u32) -> DrawItem {
        let mut scene = Scene::new();
        DrawItem {
            mesh: scene.add_mesh_data(Arc::new(MeshData::cube(1.0))),
            material: scene.add_material(Material::standard()),
            key: PipelineKey {
                shader: ShaderKind::Standard,
                side: Side::Front,
                blending: Blending::Normal,
                transparent,
            },
            depth,
            offset,
        }
    }

    #[test]
    fn transparent_items_follow_opaque_far_to_near() {
        let mut items = vec![
            item(true, 5.0, 0),
            item(false, 1.0, 1),
            item(true, 50.0, 2),
            item(false, 100.0, 3),
            item(true, 20.0, 4),
        ];
        sort_draw_items(&mut items);
        let order: Vec<u32> = items.iter().map(|i| i.offset).collect();
        assert_eq!(order, vec![1, 3, 2, 4, 0]);
    }

    #[test]
    fn object_uniform_fits_dynamic_stride() {
        assert_eq!(OBJECT_SIZE, 128);
        assert_eq!(align_to(OBJECT_SIZE, 256), 256);
    }

    #[test]
    fn shader_kind_follows_shading() {
        assert_eq!(ShaderKind::of(&Shading::Lambert), ShaderKind::Lambert);
        assert_eq!(
            ShaderKind::of(&Shading::Glow {
                c: 0.1,
                p: 7.0,
                view_vector: Vec3::ZERO
            }),
            ShaderKind::Glow
        );
    }
}
