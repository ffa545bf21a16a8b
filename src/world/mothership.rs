//! The mothership: spinning rings, a glowing core and a swarm of drones
//! shuttling between the hangar and deep space.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;

use super::AssetBinder;
use crate::animation::{Axes, BezierKind, Channel, Tween, Tweens};
use crate::scene::{Light, LightKind, Material, MaterialHandle, MeshData, NodeId, Scene, Transform};
use crate::util::easing::EasingFunction;
use crate::util::frames;
use crate::util::random::Dice;

const POSITION: Vec3 = Vec3::new(6.0, -15.0, -42.0);
const SCALE: f32 = 2.0;
const YAW_DEGREES: f32 = -30.0;
const RING_SPIN: f32 = 0.12;

const DRONE_RADIUS: f32 = 0.075;
const DRONE_HOME: Vec3 = Vec3::new(0.0, 0.0, 4.0);

/// Completion cue of a drone trip; carries the drone index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneCue {
    /// The drone finished a leave or dock trip.
    TripDone(usize),
}

/// A rolled drone trip.
#[derive(Debug, Clone, PartialEq)]
pub struct DroneTrip {
    /// Position set before the tween starts; `y` is left untouched.
    pub start: Vec3,
    /// Soft Bezier control points in the xz plane.
    pub waypoints: Vec<Vec3>,
    /// Seconds of flight.
    pub duration: f32,
    /// Seconds before take-off.
    pub delay: f32,
    /// Power2 in when leaving, out when docking.
    pub ease: EasingFunction,
    /// `true` when flying out of the hangar.
    pub leaving: bool,
}

/// Roll the next trip for a drone.
#[must_use]
pub fn plan_trip(dice: &mut Dice) -> DroneTrip {
    let upper = dice.coin();
    let haven_z = if upper { 6.0 } else { 4.0 };
    // The lower bay starts drones slightly ahead of the haven.
    let start_z = if upper { 6.0 } else { 4.5 };
    let leaving = dice.coin();

    let (start, waypoints) = if leaving {
        let points = vec![
            Vec3::new(dice.int_f(5, 10), 0.0, haven_z),
            Vec3::new(dice.int_f(50, 500), 0.0, dice.int_f(-500, 500)),
            Vec3::new(dice.int_f(500, 1000), 0.0, dice.int_f(-1000, 1000)),
        ];
        (Vec3::new(0.0, 0.0, start_z), points)
    } else {
        let points = vec![
            Vec3::new(dice.int_f(500, 1000), 0.0, dice.int_f(-1000, 1000)),
            Vec3::new(dice.int_f(100, 500), 0.0, dice.int_f(-500, 500)),
            Vec3::new(dice.int_f(5, 10), 0.0, haven_z),
            Vec3::new(0.0, 0.0, haven_z),
        ];
        (points[0], points)
    };

    let duration = dice.seconds(10, 20);
    let delay = dice.seconds(5, 20);
    DroneTrip {
        start,
        waypoints,
        duration,
        delay,
        ease: if leaving {
            EasingFunction::Power2In
        } else {
            EasingFunction::Power2Out
        },
        leaving,
    }
}

/// The carrier parked off the bridge, its spinning rings and its drones.
#[derive(Debug)]
pub struct Mothership {
    hull: NodeId,
    rings: [NodeId; 2],
    drones: Vec<NodeId>,
}

impl Mothership {
    /// Build the mothership and `drone_count` drones, all docked.
    pub fn new(
        scene: &mut Scene,
        assets: &mut AssetBinder<'_>,
        material: MaterialHandle,
        drone_count: usize,
    ) -> Self {
        let model = assets.model(scene, "mothership");
        let hull = scene.add_mesh(
            None,
            "mothership",
            Transform {
                position: POSITION,
                rotation: Vec3::new(0.0, YAW_DEGREES * PI / 180.0, 0.0),
                scale: Vec3::splat(SCALE),
            },
            model,
            material,
        );
        let _ = scene.add_light(
            Some(hull),
            "mothership light",
            Vec3::ZERO,
            Light::new(LightKind::Point { range: 0.0 }, 0x00_BF_FF, 1.0),
        );

        let ring1 = assets.model(scene, "mothership_ring1");
        let ring2 = assets.model(scene, "mothership_ring2");
        let rings = [
            scene.add_mesh(Some(hull), "mothership ring", Transform::default(), ring1, material),
            scene.add_mesh(Some(hull), "mothership ring", Transform::default(), ring2, material),
        ];

        let core = assets.model(scene, "mothership_sphere");
        let white = scene.add_material(Material::basic().with_color(0xff_ff_ff));
        let _ = scene.add_mesh(Some(hull), "mothership core", Transform::default(), core, white);

        let sphere = scene.add_mesh_data(Arc::new(MeshData::sphere(DRONE_RADIUS, 4, 4)));
        let drones = (0..drone_count)
            .map(|_| scene.add_mesh(Some(hull), "drone", Transform::at(DRONE_HOME), sphere, material))
            .collect();

        Self { hull, rings, drones }
    }

    /// Send every drone on its first trip.
    pub fn launch_drones<C: From<DroneCue>>(
        &self,
        scene: &mut Scene,
        tweens: &mut Tweens<C>,
        dice: &mut Dice,
    ) {
        for index in 0..self.drones.len() {
            self.send_drone(index, scene, tweens, dice);
        }
    }

    /// A drone came home or left: roll its next trip.
    pub fn handle<C: From<DroneCue>>(
        &self,
        cue: DroneCue,
        scene: &mut Scene,
        tweens: &mut Tweens<C>,
        dice: &mut Dice,
    ) {
        let DroneCue::TripDone(index) = cue;
        self.send_drone(index, scene, tweens, dice);
    }

    fn send_drone<C: From<DroneCue>>(
        &self,
        index: usize,
        scene: &mut Scene,
        tweens: &mut Tweens<C>,
        dice: &mut Dice,
    ) {
        let Some(&drone) = self.drones.get(index) else {
            log::warn!("no drone #{index}");
            return;
        };
        let trip = plan_trip(dice);
        let position = &mut scene.transform_mut(drone).position;
        *position = Axes::XZ.merge(*position, trip.start);
        let _ = tweens.add(
            Tween::on(drone, Channel::Position)
                .delay(trip.delay)
                .bezier(BezierKind::Soft, trip.waypoints, Axes::XZ, trip.duration, trip.ease)
                .with_cue(C::from(DroneCue::TripDone(index))),
        );
    }

    /// Spin the rings.
    pub fn animate(&self, dt: f32, scene: &mut Scene) {
        let step = RING_SPIN * frames(dt);
        scene.transform_mut(self.rings[0]).rotation.z += step;
        scene.transform_mut(self.rings[1]).rotation.x -= step;
    }

    /// Hull node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.hull
    }

    /// Drone nodes.
    #[must_use]
    pub fn drones(&self) -> &[NodeId] {
        &self.drones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Cue(DroneCue);

    impl From<DroneCue> for Cue {
        fn from(c: DroneCue) -> Self {
            Self(c)
        }
    }

    #[test]
    fn trips_stay_in_range() {
        let mut dice = Dice::new(Some(8));
        let (mut leaves, mut docks) = (0, 0);
        for _ in 0..300 {
            let trip = plan_trip(&mut dice);
            assert!((10.0..=20.0).contains(&trip.duration));
            assert!((5.0..=20.0).contains(&trip.delay));
            assert!(trip.start.z == 4.5 || trip.start.z == 6.0 || trip.start.x >= 500.0);
            let last = trip.waypoints[trip.waypoints.len() - 1];
            if trip.leaving {
                leaves += 1;
                assert_eq!(trip.start.x, 0.0);
                assert_eq!(trip.waypoints.len(), 3);
                assert!((500.0..=1000.0).contains(&last.x));
                assert_eq!(trip.ease, EasingFunction::Power2In);
            } else {
                docks += 1;
                assert_eq!(trip.start, trip.waypoints[0]);
                assert_eq!(last.x, 0.0);
                assert!(last.z == 4.0 || last.z == 6.0);
                assert_eq!(trip.ease, EasingFunction::Power2Out);
            }
        }
        assert!(leaves > 0 && docks > 0);
    }

    #[test]
    fn rings_spin_in_opposite_senses() {
        let store = AssetStore::new();
        let mut scene = Scene::new();
        let hull = scene.add_material(Material::standard());
        let ship = Mothership::new(&mut scene, &mut AssetBinder::new(&store), hull, 10);
        ship.animate(1.0 / 60.0, &mut scene);
        assert!((scene.transform(ship.rings[0]).rotation.z - 0.12).abs() < 1e-5);
        assert!((scene.transform(ship.rings[1]).rotation.x + 0.12).abs() < 1e-5);
        assert_eq!(ship.drones().len(), 10);
    }

    #[test]
    fn drones_cycle_forever() {
        let store = AssetStore::new();
        let mut scene = Scene::new();
        let hull = scene.add_material(Material::standard());
        let ship = Mothership::new(&mut scene, &mut AssetBinder::new(&store), hull, 10);
        let mut tweens: Tweens<Cue> = Tweens::new();
        let mut dice = Dice::new(Some(1));
        ship.launch_drones(&mut scene, &mut tweens, &mut dice);
        assert_eq!(tweens.len(), 10);

        let mut trips = 0;
        for _ in 0..(45 * 10) {
            for Cue(cue) in tweens.update(0.1, &mut scene) {
                trips += 1;
                ship.handle(cue, &mut scene, &mut tweens, &mut dice);
            }
        }
        assert!(trips >= 10);
        assert_eq!(tweens.len(), 10);
    }
}
