//! The lava planet, its rim glow and three stacked rings.

use std::sync::Arc;

use glam::{Vec2, Vec3};

use super::AssetBinder;
use crate::scene::{
    Blending, Material, MaterialHandle, MeshData, NodeId, Scene, Shading, Side, Transform,
};
use crate::util::frames;

/// Planet centre.
pub const PLANET_POSITION: Vec3 = Vec3::new(-33.0, -35.0, -60.0);
/// Planet radius.
pub const PLANET_RADIUS: f32 = 40.0;

const GLOW_RADIUS: f32 = 40.1;
const RING_SCALE: f32 = 8.0;
/// Ring y offsets from the ring plane and their yaw per reference frame.
const RINGS: [(f32, f32); 3] = [(0.0, 0.0001), (-0.5, 0.0002), (0.5, 0.0003)];

const TIME_RATE: f32 = 0.05;
const SPIN_RATE: f32 = 0.025;

/// The lava planet, its glow shell and its three rings.
#[derive(Debug)]
pub struct Planet {
    mesh: NodeId,
    material: MaterialHandle,
    rings: [NodeId; 3],
}

impl Planet {
    /// Add the planet, glow and rings below the bridge.
    pub fn new(scene: &mut Scene, assets: &mut AssetBinder<'_>) -> Self {
        let cloud = assets.texture(scene, "planetcloud", true);
        let surface = assets.texture(scene, "planetsurface", true);
        let material = scene.add_material(Material {
            shading: Shading::Planet {
                cloud,
                surface,
                time: 0.1,
                fog_density: 0.03,
                uv_scale: Vec2::ONE,
            },
            ..Material::default()
        });
        let sphere = scene.add_mesh_data(Arc::new(MeshData::sphere(PLANET_RADIUS, 64, 64)));
        let mesh = scene.add_mesh(
            None,
            "planet",
            Transform::at(PLANET_POSITION),
            sphere,
            material,
        );

        let glow_material = scene.add_material(Material {
            shading: Shading::Glow {
                c: 0.1,
                p: 7.0,
                view_vector: Vec3::new(0.0, -50.0, -50.0),
            },
            color: crate::util::rgb(0x93_cf_ef),
            side: Side::Back,
            blending: Blending::Additive,
            transparent: true,
            ..Material::default()
        });
        let glow_sphere = scene.add_mesh_data(Arc::new(MeshData::sphere(GLOW_RADIUS, 64, 64)));
        let _ = scene.add_mesh(
            Some(mesh),
            "planet glow",
            Transform::default(),
            glow_sphere,
            glow_material,
        );

        let ring_map = assets.texture(scene, "planet_ring", false);
        let env = assets.cubemap(scene, "ship");
        let ring_material = scene.add_material(
            Material::standard()
                .with_map(ring_map)
                .with_env_map(env)
                .with_metalness(1.0)
                .with_side(Side::Double)
                .with_opacity(0.5),
        );
        let ring_mesh = assets.model(scene, "planet_ring");
        let ring_base = PLANET_POSITION + Vec3::Y * (PLANET_RADIUS / 2.0);
        let rings = RINGS.map(|(dy, _)| {
            scene.add_mesh(
                None,
                "planet ring",
                Transform {
                    position: ring_base + Vec3::Y * dy,
                    scale: Vec3::splat(RING_SCALE),
                    ..Transform::default()
                },
                ring_mesh,
                ring_material,
            )
        });

        Self {
            mesh,
            material,
            rings,
        }
    }

    /// Advance the surface clock and spin the planet and rings.
    pub fn animate(&self, dt: f32, scene: &mut Scene) {
        if let Shading::Planet { time, .. } = &mut scene.material_mut(self.material).shading {
            *time += TIME_RATE * dt;
        }
        scene.transform_mut(self.mesh).rotation.y += SPIN_RATE * dt;
        let steps = frames(dt);
        for (ring, (_, rate)) in self.rings.iter().zip(RINGS) {
            scene.transform_mut(*ring).rotation.y -= rate * steps;
        }
    }

    /// World position of the planet centre.
    #[must_use]
    pub fn position(&self, scene: &Scene) -> Vec3 {
        scene.world_position(self.mesh)
    }

    /// Planet node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;

    #[test]
    fn rings_stack_above_the_equator() {
        let store = AssetStore::new();
        let mut scene = Scene::new();
        let planet = Planet::new(&mut scene, &mut AssetBinder::new(&store));
        let ys: Vec<f32> = planet
            .rings
            .iter()
            .map(|r| scene.transform(*r).position.y)
            .collect();
        assert_eq!(ys, vec![-15.0, -15.5, -14.5]);
        assert_eq!(planet.position(&scene), PLANET_POSITION);
    }

    #[test]
    fn animate_advances_time_and_rotations() {
        let store = AssetStore::new();
        let mut scene = Scene::new();
        let planet = Planet::new(&mut scene, &mut AssetBinder::new(&store));
        planet.animate(1.0, &mut scene);
        match scene.material(planet.material).shading {
            Shading::Planet { time, .. } => assert!((time - 0.15).abs() < 1e-6),
            _ => panic!("planet lost its shading"),
        }
        assert!((scene.transform(planet.node()).rotation.y - 0.025).abs() < 1e-6);
        let r0 = scene.transform(planet.rings[0]).rotation.y;
        let r2 = scene.transform(planet.rings[2]).rotation.y;
        assert!((r0 + 0.006).abs() < 1e-5);
        assert!((r2 + 0.018).abs() < 1e-5);
    }
}
