//! Scene lighting: ambient fill, an orbiting sun, a spot on the planet, a
//! circling blue point light and the hologram projector's light.

use std::f32::consts::FRAC_PI_3;

use glam::Vec3;

use crate::scene::{Light, LightKind, NodeId, Scene};
use crate::util::frames;

const SUN_START: Vec3 = Vec3::new(-1.0, 3.0, -5.0);
const SUN_ORBIT: f32 = 10.0;
const SUN_SPEED: f32 = 0.001;

const MOVING_CENTRE: Vec3 = Vec3::new(0.0, 1.0, 100.0);
const MOVING_RADIUS: f32 = 1.0;
const MOVING_SPEED: f32 = 0.99;

/// The scene's lights and their per-frame motion.
#[derive(Debug)]
pub struct LightRig {
    sun: NodeId,
    spot: NodeId,
    moving: NodeId,
    sun_angle: f32,
    moving_angle: f32,
}

impl LightRig {
    /// Add every light to `scene`, aiming the sun and spot at `focus`.
    pub fn new(scene: &mut Scene, focus: Vec3) -> Self {
        let _ = scene.add_light(
            None,
            "ambient",
            Vec3::ZERO,
            Light::new(LightKind::Ambient, 0x80_80_80, 1.0),
        );
        let sun = scene.add_light(
            None,
            "sun",
            SUN_START,
            Light::new(LightKind::Directional { target: focus }, 0xED_C6_18, 1.0),
        );
        let spot = scene.add_light(
            None,
            "spot",
            Vec3::new(10.0, 3.0, 10.0),
            Light::new(
                LightKind::Spot {
                    target: focus,
                    range: 1000.0,
                    angle: FRAC_PI_3,
                    penumbra: 0.8,
                },
                0x76_C6_E8,
                1.0,
            ),
        );
        let moving = scene.add_light(
            None,
            "moving",
            Vec3::ZERO,
            Light::new(
                LightKind::Point {
                    range: MOVING_CENTRE.z + 5.0,
                },
                0x00_BF_FF,
                1.0,
            ),
        );
        let _ = scene.add_light(
            None,
            "projection",
            Vec3::new(0.0, 0.5, 0.5),
            Light::new(LightKind::Point { range: 0.0 }, 0x00_BF_FF, 1.0),
        );
        Self {
            sun,
            spot,
            moving,
            sun_angle: 0.0,
            moving_angle: 0.0,
        }
    }

    /// Move the sun and the circling light, and re-aim at `focus`.
    pub fn animate(&mut self, dt: f32, scene: &mut Scene, focus: Vec3) {
        let steps = frames(dt);

        if let Some(light) = scene.light_mut(self.spot) {
            if let LightKind::Spot { target, .. } = &mut light.kind {
                *target = focus;
            }
        }

        let p = &mut scene.transform_mut(self.moving).position;
        p.x = MOVING_RADIUS * self.moving_angle.sin();
        p.y = MOVING_CENTRE.y;
        p.z = MOVING_CENTRE.z + MOVING_RADIUS * self.moving_angle.cos();
        self.moving_angle += MOVING_SPEED * steps;

        self.sun_angle += SUN_SPEED * steps;
        let p = &mut scene.transform_mut(self.sun).position;
        p.x = SUN_ORBIT * self.sun_angle.sin();
        p.y = SUN_ORBIT * self.sun_angle.cos();
        if let Some(light) = scene.light_mut(self.sun) {
            light.kind = LightKind::Directional { target: focus };
        }
    }

    /// Node of the sun.
    #[must_use]
    pub fn sun(&self) -> NodeId {
        self.sun
    }

    /// Node of the circling point light.
    #[must_use]
    pub fn moving(&self) -> NodeId {
        self.moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::lights::LightsUniform;

    const PLANET: Vec3 = Vec3::new(-33.0, -35.0, -60.0);

    #[test]
    fn rig_adds_five_lights() {
        let mut scene = Scene::new();
        let _ = LightRig::new(&mut scene, PLANET);
        let packed = LightsUniform::from_scene(&scene);
        assert_eq!(packed.count, 4);
        assert!(packed.ambient[0] > 0.0);
    }

    #[test]
    fn sun_orbits_and_keeps_depth() {
        let mut scene = Scene::new();
        let mut rig = LightRig::new(&mut scene, PLANET);
        for _ in 0..60 {
            rig.animate(1.0 / 60.0, &mut scene, PLANET);
        }
        let p = scene.transform(rig.sun()).position;
        assert!((p.x - 10.0 * 0.06f32.sin()).abs() < 1e-3);
        assert!((p.y - 10.0 * 0.06f32.cos()).abs() < 1e-3);
        assert_eq!(p.z, SUN_START.z);
    }

    #[test]
    fn moving_light_circles_its_centre() {
        let mut scene = Scene::new();
        let mut rig = LightRig::new(&mut scene, PLANET);
        for _ in 0..37 {
            rig.animate(1.0 / 60.0, &mut scene, PLANET);
            let p = scene.transform(rig.moving()).position;
            assert!(((p - MOVING_CENTRE).length() - MOVING_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn spot_follows_focus() {
        let mut scene = Scene::new();
        let mut rig = LightRig::new(&mut scene, PLANET);
        let focus = Vec3::new(1.0, 2.0, 3.0);
        rig.animate(0.0, &mut scene, focus);
        let spot = scene.iter().find_map(|(_, n)| match &n.kind {
            crate::scene::NodeKind::Light(Light {
                kind: LightKind::Spot { target, .. },
                ..
            }) => Some(*target),
            _ => None,
        });
        assert_eq!(spot, Some(focus));
    }
}
