//! GPU copies of a scene's meshes, textures, cubemaps and materials.
//!
//! One `GpuScene` mirrors one [`Scene`]. Registries only grow, so syncing
//! uploads whatever was registered since the last frame; textures are
//! re-uploaded when their revision changes and material uniforms are
//! rewritten every frame (tweens animate opacity, planet time and uv
//! offsets).

use wgpu::util::DeviceExt;

use super::mesh_pass::MeshPass;
use crate::gpu::texture::{upload_cubemap, upload_texture};
use crate::scene::{
    CubemapHandle, Material, MaterialHandle, MeshHandle, Scene, Shading, Side,
    TextureHandle,
};

/// Per-material uniform. Field meaning depends on the shading model and must
/// match the material structs in the raster shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Standard: rgb color, a opacity. Planet: uv scale, time, fog
    /// density. Glow: rgb color.
    pub color: [f32; 4],
    /// Standard: rgb emissive, w metalness. Planet: fog color. Glow: view
    /// vector.
    pub emissive: [f32; 4],
    /// Standard: uv offset, uv rotation, flat flag. Glow: c, p.
    pub uv_transform: [f32; 4],
    /// Standard: roughness, fog flag, env strength, double-sided flag.
    pub params: [f32; 4],
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl MaterialUniform {
    /// Pack a material for its shader.
    #[must_use]
    pub fn from_material(material: &Material) -> Self {
        match &material.shading {
            Shading::Planet {
                time,
                fog_density,
                uv_scale,
                ..
            } => Self {
                color: [uv_scale.x, uv_scale.y, *time, *fog_density],
                emissive: [0.0, 0.0, 0.0, 1.0],
                uv_transform: [0.0; 4],
                params: [0.0; 4],
            },
            Shading::Glow { c, p, view_vector } => Self {
                color: [material.color[0], material.color[1], material.color[2], 1.0],
                emissive: view_vector.extend(0.0).to_array(),
                uv_transform: [*c, *p, 0.0, 0.0],
                params: [0.0; 4],
            },
            Shading::Standard | Shading::Lambert | Shading::Basic => {
                let opacity = if material.transparent {
                    material.opacity
                } else {
                    1.0
                };
                let [r, g, b] = material.color;
                let [er, eg, eb] = material.emissive;
                Self {
                    color: [r, g, b, opacity],
                    emissive: [er, eg, eb, material.metalness],
                    uv_transform: [
                        material.uv_offset.x,
                        material.uv_offset.y,
                        material.uv_rotation,
                        flag(material.flat),
                    ],
                    params: [
                        material.roughness,
                        flag(material.fog),
                        flag(material.env_map.is_some()),
                        flag(material.side == Side::Double),
                    ],
                }
            }
        }
    }
}

/// Vertex and index buffers of one mesh.
pub(crate) struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

struct GpuTexture {
    view: wgpu::TextureView,
    revision: u32,
}

/// Which uploads a material bind group was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundTextures {
    map: Option<(usize, u32)>,
    aux: Option<(usize, u32)>,
    env: Option<usize>,
    repeat: bool,
}

impl BoundTextures {
    fn of(material: &Material, scene: &Scene) -> Self {
        let (map, aux) = match &material.shading {
            Shading::Planet { cloud, surface, .. } => (Some(*cloud), Some(*surface)),
            Shading::Glow { .. } => (None, None),
            _ => (material.map, None),
        };
        let revision = |h: TextureHandle| (h.index(), scene.texture(h).revision);
        Self {
            map: map.map(revision),
            aux: aux.map(revision),
            env: material.env_map.map(CubemapHandle::index),
            repeat: map.is_some_and(|h| scene.texture(h).repeat),
        }
    }
}

pub(crate) struct GpuMaterial {
    uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    bound: BoundTextures,
}

/// GPU mirror of one scene.
#[derive(Default)]
pub struct GpuScene {
    meshes: Vec<Option<GpuMesh>>,
    textures: Vec<GpuTexture>,
    cubemaps: Vec<wgpu::TextureView>,
    materials: Vec<GpuMaterial>,
}

impl GpuScene {
    /// Empty mirror; everything is uploaded by the first [`sync`](Self::sync).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload new or changed resources and refresh material uniforms.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &MeshPass,
        scene: &Scene,
    ) {
        for index in self.meshes.len()..scene.mesh_count() {
            let data = scene.mesh(MeshHandle::from_index(index));
            self.meshes.push((!data.is_empty()).then(|| GpuMesh {
                vertex_buffer: device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("Mesh Vertices"),
                        contents: bytemuck::cast_slice(&data.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                ),
                index_buffer: device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("Mesh Indices"),
                        contents: bytemuck::cast_slice(&data.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    },
                ),
                index_count: data.indices.len() as u32,
            }));
        }

        for index in 0..scene.texture_count() {
            let slot = scene.texture(TextureHandle::from_index(index));
            match self.textures.get_mut(index) {
                Some(existing) if existing.revision == slot.revision => {}
                Some(existing) => {
                    existing.view = upload_texture(device, queue, "Scene Texture", &slot.data);
                    existing.revision = slot.revision;
                }
                None => self.textures.push(GpuTexture {
                    view: upload_texture(device, queue, "Scene Texture", &slot.data),
                    revision: slot.revision,
                }),
            }
        }

        for index in self.cubemaps.len()..scene.cubemap_count() {
            let data = scene.cubemap(CubemapHandle::from_index(index));
            self.cubemaps.push(upload_cubemap(device, queue, "Scene Cubemap", data));
        }

        for (index, material) in scene.materials().iter().enumerate() {
            let uniform = MaterialUniform::from_material(material);
            let bound = BoundTextures::of(material, scene);
            if let Some(existing) = self.materials.get_mut(index) {
                queue.write_buffer(&existing.uniform, 0, bytemuck::bytes_of(&uniform));
                if existing.bound != bound {
                    existing.bind_group = bind_material(
                        device,
                        pass,
                        &self.textures,
                        &self.cubemaps,
                        &existing.uniform,
                        bound,
                    );
                    existing.bound = bound;
                }
                continue;
            }
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniform"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group =
                bind_material(device, pass, &self.textures, &self.cubemaps, &buffer, bound);
            self.materials.push(GpuMaterial {
                uniform: buffer,
                bind_group,
                bound,
            });
        }
    }

    #[must_use]
    pub(crate) fn mesh(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.index()).and_then(Option::as_ref)
    }

    #[must_use]
    pub(crate) fn material(&self, handle: MaterialHandle) -> Option<&GpuMaterial> {
        self.materials.get(handle.index())
    }
}

fn bind_material(
    device: &wgpu::Device,
    pass: &MeshPass,
    textures: &[GpuTexture],
    cubemaps: &[wgpu::TextureView],
    uniform: &wgpu::Buffer,
    bound: BoundTextures,
) -> wgpu::BindGroup {
    let view = |slot: Option<(usize, u32)>| {
        slot.and_then(|(i, _)| textures.get(i))
            .map_or(pass.white_view(), |t| &t.view)
    };
    let env = bound
        .env
        .and_then(|i| cubemaps.get(i))
        .unwrap_or(pass.fallback_cube_view());
    pass.material_bind_group(device, uniform, view(bound.map), view(bound.aux), env, bound.repeat)
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::scene::TextureData;
    use std::sync::Arc;

    #[test]
    fn opaque_material_ignores_opacity() {
        let mut material = Material::standard().with_metalness(1.0);
        material.opacity = 0.3;
        let packed = MaterialUniform::from_material(&material);
        assert_eq!(packed.color[3], 1.0);
        assert_eq!(packed.emissive[3], 1.0);
    }

    #[test]
    fn transparent_double_sided_material_packs_flags() {
        let mut scene = Scene::new();
        let cube = scene.add_cubemap(Arc::new(crate::scene::CubemapData::placeholder()));
        let material = Material::standard()
            .with_env_map(cube)
            .with_side(Side::Double)
            .with_opacity(0.5)
            .with_flat_shading();
        let packed = MaterialUniform::from_material(&material);
        assert_eq!(packed.color[3], 0.5);
        assert_eq!(packed.uv_transform[3], 1.0);
        assert_eq!(packed.params[2], 1.0);
        assert_eq!(packed.params[3], 1.0);
    }

    #[test]
    fn planet_packs_time_and_fog() {
        let mut scene = Scene::new();
        let tex = scene.add_texture(Arc::new(TextureData::white()), true);
        let material = Material {
            shading: Shading::Planet {
                cloud: tex,
                surface: tex,
                time: 0.1,
                fog_density: 0.03,
                uv_scale: Vec2::ONE,
            },
            ..Material::default()
        };
        let packed = MaterialUniform::from_material(&material);
        assert_eq!(packed.color, [1.0, 1.0, 0.1, 0.03]);
        let bound = BoundTextures::of(&material, &scene);
        assert!(bound.repeat);
        assert_eq!(bound.map, Some((0, 0)));
        assert_eq!(bound.aux, Some((0, 0)));
    }

    #[test]
    fn glow_packs_rim_parameters() {
        let material = Material {
            shading: Shading::Glow {
                c: 0.1,
                p: 7.0,
                view_vector: Vec3::new(0.0, -50.0, -50.0),
            },
            ..Material::default()
        };
        let packed = MaterialUniform::from_material(&material);
        assert_eq!(packed.emissive, [0.0, -50.0, -50.0, 0.0]);
        assert_eq!(packed.uv_transform[..2], [0.1, 7.0]);
    }

    #[test]
    fn texture_replacement_changes_binding() {
        let mut scene = Scene::new();
        let tex = scene.add_texture(Arc::new(TextureData::white()), false);
        let material = Material::basic().with_map(tex);
        let before = BoundTextures::of(&material, &scene);
        scene.replace_texture(tex, Arc::new(TextureData::placeholder()));
        assert_ne!(before, BoundTextures::of(&material, &scene));
    }
}
