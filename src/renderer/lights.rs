//! Packing scene lights into the fixed-size GPU light array.

use glam::Vec3;

use crate::scene::{LightKind, NodeKind, Scene};

/// Capacity of the GPU light array.
pub const MAX_LIGHTS: usize = 16;

const KIND_DIRECTIONAL: f32 = 0.0;
const KIND_POINT: f32 = 1.0;
const KIND_SPOT: f32 = 2.0;

/// One non-ambient light. Must match `GpuLight` in `lighting.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// xyz world position, w kind.
    pub position: [f32; 4],
    /// xyz travel direction, w range.
    pub direction: [f32; 4],
    /// rgb color × intensity, w cosine of the cone angle.
    pub color: [f32; 4],
    /// x cosine where the penumbra starts.
    pub params: [f32; 4],
}

/// Ambient term plus up to [`MAX_LIGHTS`] lights.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    /// Summed ambient color.
    pub ambient: [f32; 3],
    /// Number of valid entries in `lights`.
    pub count: u32,
    /// Light array.
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for LightsUniform {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

fn scaled(color: [f32; 3], intensity: f32) -> [f32; 3] {
    color.map(|c| c * intensity)
}

impl LightsUniform {
    /// Gather every visible light node. Ambient lights are summed; lights
    /// beyond the array capacity are dropped with a debug log.
    #[must_use]
    pub fn from_scene(scene: &Scene) -> Self {
        let mut out = Self::default();
        let mut ambient = Vec3::ZERO;
        let mut dropped = 0usize;

        for (id, node) in scene.iter() {
            let NodeKind::Light(light) = &node.kind else {
                continue;
            };
            if !scene.is_visible(id) {
                continue;
            }
            let color = scaled(light.color, light.intensity);
            if light.kind == LightKind::Ambient {
                ambient += Vec3::from(color);
                continue;
            }
            let slot = out.count as usize;
            if slot >= MAX_LIGHTS {
                dropped += 1;
                continue;
            }
            let position = scene.world_position(id);
            out.lights[slot] = match light.kind {
                LightKind::Directional { target } => {
                    let dir = (target - position).normalize_or(Vec3::NEG_Y);
                    GpuLight {
                        position: position.extend(KIND_DIRECTIONAL).to_array(),
                        direction: dir.extend(0.0).to_array(),
                        color: Vec3::from(color).extend(0.0).to_array(),
                        params: [0.0; 4],
                    }
                }
                LightKind::Point { range } => GpuLight {
                    position: position.extend(KIND_POINT).to_array(),
                    direction: [0.0, -1.0, 0.0, range],
                    color: Vec3::from(color).extend(0.0).to_array(),
                    params: [0.0; 4],
                },
                LightKind::Spot {
                    target,
                    range,
                    angle,
                    penumbra,
                } => {
                    let dir = (target - position).normalize_or(Vec3::NEG_Y);
                    GpuLight {
                        position: position.extend(KIND_SPOT).to_array(),
                        direction: dir.extend(range).to_array(),
                        color: Vec3::from(color).extend(angle.cos()).to_array(),
                        params: [(angle * (1.0 - penumbra)).cos(), 0.0, 0.0, 0.0],
                    }
                }
                LightKind::Ambient => continue,
            };
            out.count += 1;
        }

        if dropped > 0 {
            log::debug!("{dropped} lights exceed the GPU light array");
        }
        out.ambient = ambient.to_array();
        out
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use super::*;
    use crate::scene::Light;

    #[test]
    fn ambient_lights_are_summed() {
        let mut scene = Scene::new();
        let _ = scene.add_light(None, "a", Vec3::ZERO, Light::new(LightKind::Ambient, 0x80_80_80, 1.0));
        let _ = scene.add_light(None, "b", Vec3::ZERO, Light::new(LightKind::Ambient, 0x80_80_80, 1.0));
        let lights = LightsUniform::from_scene(&scene);
        assert_eq!(lights.count, 0);
        assert!((lights.ambient[0] - 2.0 * 128.0 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn spot_light_packs_cone() {
        let mut scene = Scene::new();
        let _ = scene.add_light(
            None,
            "spot",
            Vec3::new(10.0, 3.0, 10.0),
            Light::new(
                LightKind::Spot {
                    target: Vec3::new(10.0, -7.0, 10.0),
                    range: 1000.0,
                    angle: FRAC_PI_3,
                    penumbra: 0.8,
                },
                0xff_ff_ff,
                2.0,
            ),
        );
        let lights = LightsUniform::from_scene(&scene);
        assert_eq!(lights.count, 1);
        let spot = lights.lights[0];
        assert_eq!(spot.position[3], KIND_SPOT);
        assert!((spot.direction[1] + 1.0).abs() < 1e-5);
        assert_eq!(spot.direction[3], 1000.0);
        assert_eq!(spot.color[0], 2.0);
        assert!((spot.color[3] - 0.5).abs() < 1e-5);
        assert!(spot.params[0] > spot.color[3]);
    }

    #[test]
    fn hidden_lights_are_skipped() {
        let mut scene = Scene::new();
        let id = scene.add_light(
            None,
            "p",
            Vec3::ZERO,
            Light::new(LightKind::Point { range: 0.0 }, 0x00_bf_ff, 1.0),
        );
        scene.set_visible(id, false);
        assert_eq!(LightsUniform::from_scene(&scene).count, 0);
    }

    #[test]
    fn overflow_is_capped() {
        let mut scene = Scene::new();
        for _ in 0..MAX_LIGHTS + 4 {
            let _ = scene.add_light(
                None,
                "p",
                Vec3::ZERO,
                Light::new(LightKind::Point { range: 10.0 }, 0xff_ff_ff, 1.0),
            );
        }
        assert_eq!(LightsUniform::from_scene(&scene).count as usize, MAX_LIGHTS);
    }

    #[test]
    fn uniform_matches_wgsl_size() {
        assert_eq!(size_of::<LightsUniform>(), 16 + 64 * MAX_LIGHTS);
    }
}
