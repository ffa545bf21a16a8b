//! A thousand rocks, either circling the planet or drifting through a cube.

use glam::Vec3;

use super::planet::{PLANET_POSITION, PLANET_RADIUS};
use super::AssetBinder;
use crate::options::{AsteroidMode, SceneOptions};
use crate::scene::{Blending, Material, NodeId, Scene, Side, Transform};
use crate::util::frames;
use crate::util::random::Dice;

const BOUND: i32 = 1000;
const ORBIT_SPEED: f32 = 0.01;
const MODELS: [&str; 3] = ["asteroid1", "asteroid2", "asteroid3"];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Asteroid {
    node: NodeId,
    velocity: Vec3,
    /// Orbit angle in degrees.
    angle: f32,
}

fn random_velocity(dice: &mut Dice) -> Vec3 {
    Vec3::new(
        dice.int_f(-100, 100) / 100.0,
        dice.int_f(-100, 100) / 100.0,
        dice.int_f(-100, 100) / 100.0,
    )
}

fn random_position(dice: &mut Dice) -> Vec3 {
    Vec3::new(
        dice.int_f(-BOUND, BOUND),
        dice.int_f(-BOUND, BOUND),
        dice.int_f(-BOUND, BOUND),
    )
}

/// Position on the ring around the planet for `angle` degrees.
#[must_use]
pub fn orbit_position(velocity: Vec3, angle: f32, y: f32) -> Vec3 {
    let (sin, cos) = angle.to_radians().sin_cos();
    Vec3::new(
        PLANET_POSITION.x + (PLANET_RADIUS + velocity.x) * sin,
        y,
        PLANET_POSITION.z + (PLANET_RADIUS + velocity.z) * cos,
    )
}

fn out_of_bounds(p: Vec3) -> bool {
    let b = BOUND as f32;
    p.x.abs() > b || p.y.abs() > b || p.z.abs() > b
}

/// Every asteroid in the scene and how they move.
#[derive(Debug)]
pub struct AsteroidField {
    asteroids: Vec<Asteroid>,
    mode: AsteroidMode,
}

impl AsteroidField {
    /// Scatter `options.asteroid_count` rocks with random models, sizes and
    /// velocities. Orbiting rocks start on the ring plane above the planet.
    pub fn new(
        scene: &mut Scene,
        assets: &mut AssetBinder<'_>,
        dice: &mut Dice,
        options: &SceneOptions,
    ) -> Self {
        let material = scene.add_material(
            Material::standard()
                .with_color(0x08_08_08)
                .with_flat_shading()
                .with_side(Side::Front)
                .with_blending(Blending::Additive)
                .with_metalness(0.0),
        );
        let models = MODELS.map(|name| assets.model(scene, name));
        let mode = options.asteroid_mode;

        let asteroids = (0..options.asteroid_count)
            .map(|_| {
                let mesh = models[dice.index(models.len())];
                let mut position = random_position(dice);
                let velocity = random_velocity(dice);
                let scale = dice.int_f(1, 20) / 100.0;
                if mode == AsteroidMode::Orbit {
                    position.y = PLANET_POSITION.y + PLANET_RADIUS / 2.0;
                }
                let node = scene.add_mesh(
                    None,
                    "asteroid",
                    Transform {
                        position,
                        scale: Vec3::splat(scale),
                        ..Transform::default()
                    },
                    mesh,
                    material,
                );
                Asteroid {
                    node,
                    velocity,
                    angle: dice.int_f(0, 360),
                }
            })
            .collect::<Vec<_>>();
        log::debug!("{} asteroids in {mode:?} mode", asteroids.len());
        Self { asteroids, mode }
    }

    /// Advance every rock by `dt` seconds.
    pub fn animate(&mut self, dt: f32, scene: &mut Scene, dice: &mut Dice) {
        let steps = frames(dt);
        match self.mode {
            AsteroidMode::Orbit => {
                for rock in &mut self.asteroids {
                    let t = scene.transform_mut(rock.node);
                    t.position = orbit_position(rock.velocity, rock.angle, t.position.y);
                    rock.angle -= ORBIT_SPEED * steps;
                }
            }
            AsteroidMode::Drift => {
                for rock in &self.asteroids {
                    let t = scene.transform_mut(rock.node);
                    if out_of_bounds(t.position) {
                        t.position = random_position(dice);
                    } else {
                        t.position += rock.velocity * steps;
                        t.rotation += rock.velocity * steps;
                    }
                }
            }
        }
    }

    /// Number of rocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    /// Whether the field holds no rocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;

    fn field(mode: AsteroidMode, count: usize) -> (Scene, AsteroidField, Dice) {
        let store = AssetStore::new();
        let mut scene = Scene::new();
        let mut dice = Dice::new(Some(12));
        let options = SceneOptions {
            asteroid_count: count,
            asteroid_mode: mode,
            ..SceneOptions::default()
        };
        let field = AsteroidField::new(&mut scene, &mut AssetBinder::new(&store), &mut dice, &options);
        (scene, field, dice)
    }

    #[test]
    fn spawn_ranges() {
        let (scene, field, _) = field(AsteroidMode::Drift, 200);
        assert_eq!(field.len(), 200);
        for rock in &field.asteroids {
            let t = scene.transform(rock.node);
            assert!(!out_of_bounds(t.position));
            assert!((0.01..=0.2).contains(&t.scale.x));
            assert!(rock.velocity.abs().max_element() <= 1.0);
            assert!((0.0..=360.0).contains(&rock.angle));
        }
    }

    #[test]
    fn orbiting_rocks_ride_the_ring_plane() {
        let (mut scene, mut field, mut dice) = field(AsteroidMode::Orbit, 50);
        for _ in 0..30 {
            field.animate(1.0 / 60.0, &mut scene, &mut dice);
        }
        for rock in &field.asteroids {
            let p = scene.transform(rock.node).position;
            assert_eq!(p.y, -15.0);
            let r = Vec3::new(p.x - PLANET_POSITION.x, 0.0, p.z - PLANET_POSITION.z).length();
            assert!((39.0 - 1e-3..=41.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn orbit_angle_decreases() {
        let (mut scene, mut field, mut dice) = field(AsteroidMode::Orbit, 1);
        let before = field.asteroids[0].angle;
        field.animate(1.0 / 60.0, &mut scene, &mut dice);
        assert!((before - field.asteroids[0].angle - 0.01).abs() < 1e-4);
    }

    #[test]
    fn drifting_rocks_respawn_inside_the_cube() {
        let (mut scene, mut field, mut dice) = field(AsteroidMode::Drift, 1);
        let node = field.asteroids[0].node;
        scene.transform_mut(node).position = Vec3::new(1500.0, 0.0, 0.0);
        field.animate(1.0 / 60.0, &mut scene, &mut dice);
        let respawned = *scene.transform(node);
        assert!(!out_of_bounds(respawned.position));

        let v = field.asteroids[0].velocity;
        field.animate(1.0 / 60.0, &mut scene, &mut dice);
        let t = scene.transform(node);
        assert!((t.position - (respawned.position + v)).length() < 1e-3);
        assert!((t.rotation - (respawned.rotation + v)).length() < 1e-5);
    }

    #[test]
    fn drifting_rocks_move_and_tumble_by_their_velocity() {
        let (mut scene, mut field, mut dice) = field(AsteroidMode::Drift, 1);
        let node = field.asteroids[0].node;
        let v = field.asteroids[0].velocity;
        scene.transform_mut(node).position = Vec3::new(10.0, -20.0, 30.0);
        scene.transform_mut(node).rotation = Vec3::ZERO;
        field.animate(1.0 / 60.0, &mut scene, &mut dice);
        let t = scene.transform(node);
        assert!((t.position - (Vec3::new(10.0, -20.0, 30.0) + v)).length() < 1e-4);
        assert!((t.rotation - v).length() < 1e-6);

        field.animate(1.0 / 60.0, &mut scene, &mut dice);
        let t = scene.transform(node);
        assert!((t.position - (Vec3::new(10.0, -20.0, 30.0) + v * 2.0)).length() < 1e-4);
        assert!((t.rotation - v * 2.0).length() < 1e-6);
    }
}
