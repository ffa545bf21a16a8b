//! The bridge ship and the fly-by ship that jumps in and out through a
//! wormhole.
//!
//! A fly-by run starts at one side of the view, opens the wormhole at its
//! entry point, flies one or two Bezier legs, opens the wormhole again at
//! the exit, hides the ship and waits a few seconds before the next run.

use std::sync::Arc;

use glam::Vec3;

use super::AssetBinder;
use crate::animation::{Axes, BezierKind, Channel, Tween, Tweens};
use crate::scene::{
    Light, LightKind, Material, MaterialHandle, MeshData, NodeId, Scene, Side, Transform,
};
use crate::util::easing::EasingFunction;
use crate::util::random::Dice;

const X_MIN: i32 = -50;
const X_MAX: i32 = 50;
const Y_MIN: i32 = -10;
const Y_MAX: i32 = 0;
const Z_MIN: i32 = -10;
const Z_MAX: i32 = -2;

/// Where the fly-by ship waits between runs.
pub const HIDDEN: Vec3 = Vec3::splat(-10000.0);

const WORMHOLE_HALF: f32 = 0.5;
const WORMHOLE_SPIN: f32 = 20.0;

/// The shared hull material plus the bridge ship and its canopy.
#[derive(Debug)]
pub struct Ship {
    hull: MaterialHandle,
    body: NodeId,
}

impl Ship {
    /// Add the bridge ship and its glass canopy at the origin.
    pub fn new(scene: &mut Scene, assets: &mut AssetBinder<'_>) -> Self {
        let env = assets.cubemap(scene, "ship");
        let hull_map = assets.texture(scene, "ship", false);
        let hull = scene.add_material(
            Material::standard()
                .with_map(hull_map)
                .with_env_map(env)
                .with_metalness(1.0)
                .with_side(Side::Double),
        );
        let ship_mesh = assets.model(scene, "ship");
        let body = scene.add_mesh(None, "ship", Transform::default(), ship_mesh, hull);

        let glass_map = assets.texture(scene, "glas", false);
        let glass = scene.add_material(
            Material::standard()
                .with_map(glass_map)
                .with_env_map(env)
                .with_metalness(1.0)
                .with_side(Side::Double)
                .with_opacity(1.0),
        );
        let glass_mesh = assets.model(scene, "glas");
        let _ = scene.add_mesh(None, "glass", Transform::default(), glass_mesh, glass);

        Self { hull, body }
    }

    /// Material shared by every hull in the scene.
    #[must_use]
    pub fn hull(&self) -> MaterialHandle {
        self.hull
    }

    /// Bridge ship node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.body
    }
}

/// Completion cues of the fly-by choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlybyCue {
    /// The ship reached its exit point.
    Arrived,
    /// The pause between runs is over.
    Relaunch,
}

/// Flight plane of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plane {
    Xz,
    Xy,
}

impl Plane {
    fn axes(self) -> Axes {
        match self {
            Self::Xz => Axes::XZ,
            Self::Xy => Axes::XY,
        }
    }

    fn range(self) -> (i32, i32) {
        match self {
            Self::Xz => (Z_MIN, Z_MAX),
            Self::Xy => (Y_MIN, Y_MAX),
        }
    }

    fn point(self, x: f32, other: f32) -> Vec3 {
        match self {
            Self::Xz => Vec3::new(x, 0.0, other),
            Self::Xy => Vec3::new(x, other, 0.0),
        }
    }
}

/// One Bezier leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    /// Waypoints after the current position.
    pub waypoints: Vec<Vec3>,
    /// Components written.
    pub axes: Axes,
    /// Seconds.
    pub duration: f32,
    /// Progress curve.
    pub ease: EasingFunction,
}

/// A fully rolled fly-by run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    /// Entry point.
    pub start: Vec3,
    /// One leg for straight passes, two for curved ones.
    pub legs: Vec<Leg>,
}

/// Leg durations: a long first leg when flying left to right, a long
/// second leg otherwise.
fn leg_times(dice: &mut Dice, left_to_right: bool) -> (f32, f32) {
    if left_to_right {
        (dice.seconds(2, 10), dice.seconds(1, 2))
    } else {
        (dice.seconds(1, 2), dice.seconds(2, 10))
    }
}

/// Roll a random run.
#[must_use]
pub fn plan_flight(dice: &mut Dice) -> FlightPlan {
    let y = dice.int_f(Y_MIN, Y_MAX);
    let z = dice.int_f(Z_MIN, Z_MAX);
    let kind = dice.int(0, 3);
    let left_to_right = dice.int(0, 1) == 0;
    let (mut time1, mut time2) = leg_times(dice, left_to_right);

    let (from, to) = if left_to_right { (X_MIN, X_MAX) } else { (X_MAX, X_MIN) };
    let start = Vec3::new(from as f32, y, z);
    let plane = if kind == 1 || kind == 2 { Plane::Xy } else { Plane::Xz };
    let (lo, hi) = plane.range();
    let roll = |x: i32, dice: &mut Dice| plane.point(x as f32, dice.int_f(lo, hi));

    let waypoints: Vec<Vec3> = if kind < 2 {
        let centre = dice.int(-2, 2);
        vec![roll(centre, dice), roll(to, dice)]
    } else {
        let q1 = dice.int(from / 2 - 2, from / 2 + 2);
        let p1 = roll(q1, dice);
        let p2 = roll(dice.int(-2, 2), dice);
        let q3 = dice.int(to / 2 - 2, to / 2 + 2);
        let p3 = roll(q3, dice);
        let p4 = roll(to, dice);
        vec![p1, p2, p3, p4]
    };

    let shoot_away = dice.coin();
    if kind < 2 {
        return FlightPlan {
            start,
            legs: vec![Leg {
                waypoints,
                axes: plane.axes(),
                duration: time1,
                ease: EasingFunction::Power2InOut,
            }],
        };
    }

    let second = if shoot_away {
        let outward = dice.int(0, 1) == 0;
        (time1, time2) = leg_times(dice, outward);
        let points = if outward {
            vec![
                Vec3::new(10.0, 0.0, -dice.int_f(30, 70)),
                Vec3::new(dice.int_f(1, 5), 0.0, -1000.0),
            ]
        } else {
            vec![Vec3::new(-70.0, 0.0, -50.0), Vec3::new(-50.0, 0.0, -1000.0)]
        };
        Leg {
            waypoints: points,
            axes: Axes::XZ,
            duration: time2,
            ease: EasingFunction::Power2In,
        }
    } else {
        Leg {
            waypoints: waypoints[2..].to_vec(),
            axes: plane.axes(),
            duration: time2,
            ease: EasingFunction::Power2In,
        }
    };
    FlightPlan {
        start,
        legs: vec![
            Leg {
                waypoints: waypoints[..2].to_vec(),
                axes: plane.axes(),
                duration: time1,
                ease: EasingFunction::Power2Out,
            },
            second,
        ],
    }
}

/// The fly-by ship, its wormhole and the wormhole's light.
#[derive(Debug)]
pub struct FlybyShip {
    ship: NodeId,
    wormhole: NodeId,
    wormhole_light: NodeId,
    runs: u32,
}

impl FlybyShip {
    /// Add the fly-by ship, parked out of sight, and its closed wormhole.
    pub fn new(scene: &mut Scene, assets: &mut AssetBinder<'_>, hull: MaterialHandle) -> Self {
        let mesh = assets.model(scene, "ship_complete");
        let ship = scene.add_mesh(
            None,
            "flyby ship",
            Transform {
                position: Vec3::new(-50.0, -5.0, -19.0),
                scale: Vec3::splat(0.1),
                ..Transform::default()
            },
            mesh,
            hull,
        );

        let map = assets.texture(scene, "wormhole", false);
        let material = scene.add_material(
            Material::standard()
                .with_map(map)
                .with_metalness(1.0)
                .with_side(Side::Double)
                .with_opacity(1.0),
        );
        let plane = scene.add_mesh_data(Arc::new(MeshData::plane(10.0, 10.0)));
        let wormhole = scene.add_mesh(
            None,
            "wormhole",
            Transform {
                scale: Vec3::ZERO,
                ..Transform::default()
            },
            plane,
            material,
        );
        let wormhole_light = scene.add_light(
            Some(wormhole),
            "wormhole light",
            Vec3::ZERO,
            Light::new(LightKind::Point { range: 0.0 }, 0xff_ff_ff, 0.0),
        );

        Self {
            ship,
            wormhole,
            wormhole_light,
            runs: 0,
        }
    }

    /// Start a run.
    pub fn launch<C: From<FlybyCue>>(
        &mut self,
        scene: &mut Scene,
        tweens: &mut Tweens<C>,
        dice: &mut Dice,
    ) {
        let plan = plan_flight(dice);
        self.runs += 1;
        log::debug!(
            "fly-by run {} from {:?} with {} leg(s)",
            self.runs,
            plan.start,
            plan.legs.len()
        );
        scene.transform_mut(self.ship).position = plan.start;
        self.open_wormhole(scene, tweens);

        let mut tween = Tween::on(self.ship, Channel::Position);
        for leg in plan.legs {
            tween = tween.bezier(BezierKind::Thru, leg.waypoints, leg.axes, leg.duration, leg.ease);
        }
        let _ = tweens.add(tween.with_cue(C::from(FlybyCue::Arrived)));
    }

    /// React to a completed fly-by tween.
    pub fn handle<C: From<FlybyCue>>(
        &mut self,
        cue: FlybyCue,
        scene: &mut Scene,
        tweens: &mut Tweens<C>,
        dice: &mut Dice,
    ) {
        match cue {
            FlybyCue::Arrived => {
                self.open_wormhole(scene, tweens);
                scene.transform_mut(self.ship).position = HIDDEN;
                let pause = dice.int_f(2000, 10000) / 1000.0;
                let _ = tweens.add(Tween::wait(pause).with_cue(C::from(FlybyCue::Relaunch)));
            }
            FlybyCue::Relaunch => self.launch(scene, tweens, dice),
        }
    }

    /// Flash the wormhole at the ship's current position.
    fn open_wormhole<C>(&self, scene: &mut Scene, tweens: &mut Tweens<C>) {
        let at = scene.transform(self.ship).position;
        let t = scene.transform_mut(self.wormhole);
        t.scale = Vec3::ZERO;
        t.rotation = Vec3::new(0.0, 90f32.to_radians(), 0.0);
        t.position = at;

        let _ = tweens.add(
            Tween::on(self.wormhole, Channel::Scale)
                .to(Vec3::ONE, Axes::XYZ, WORMHOLE_HALF, EasingFunction::Power2Out)
                .to(Vec3::ZERO, Axes::XYZ, WORMHOLE_HALF, EasingFunction::Power2In),
        );
        let _ = tweens.add(
            Tween::on(self.wormhole_light, Channel::LightIntensity)
                .to_scalar(1.0, WORMHOLE_HALF, EasingFunction::Power2Out)
                .to_scalar(0.0, WORMHOLE_HALF, EasingFunction::Power2In),
        );
        let _ = tweens.add(
            Tween::on(self.wormhole, Channel::Rotation).to(
                Vec3::X * WORMHOLE_SPIN,
                Axes::X,
                2.0 * WORMHOLE_HALF,
                EasingFunction::Power2InOut,
            ),
        );
    }

    /// Fly-by ship node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.ship
    }

    /// Wormhole node.
    #[must_use]
    pub fn wormhole(&self) -> NodeId {
        self.wormhole
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;

    #[test]
    fn plans_respect_bounds() {
        let mut dice = Dice::new(Some(11));
        for _ in 0..500 {
            let plan = plan_flight(&mut dice);
            assert!(plan.start.x == -50.0 || plan.start.x == 50.0);
            assert!((-10.0..=0.0).contains(&plan.start.y));
            assert!((-10.0..=-2.0).contains(&plan.start.z));
            assert!(matches!(plan.legs.len(), 1 | 2));
            for leg in &plan.legs {
                assert!(leg.duration >= 1.0 && leg.duration <= 10.0);
                assert_eq!(leg.duration.fract(), 0.0);
            }
            let last = plan.legs.last().and_then(|l| l.waypoints.last()).copied();
            let last = last.unwrap_or(Vec3::ZERO);
            assert!(last.x.abs() == 50.0 || last.z == -1000.0);
        }
    }

    #[test]
    fn straight_runs_cross_the_view() {
        let mut dice = Dice::new(Some(3));
        let mut seen = 0;
        for _ in 0..200 {
            let plan = plan_flight(&mut dice);
            if plan.legs.len() != 1 {
                continue;
            }
            seen += 1;
            let leg = &plan.legs[0];
            assert_eq!(leg.waypoints.len(), 2);
            assert_eq!(leg.waypoints[1].x, -plan.start.x);
            assert!(leg.waypoints[0].x.abs() <= 2.0);
            assert_eq!(leg.ease, EasingFunction::Power2InOut);
        }
        assert!(seen > 0);
    }

    #[test]
    fn curved_runs_may_shoot_away() {
        let mut dice = Dice::new(Some(21));
        let (mut away, mut across) = (0, 0);
        for _ in 0..400 {
            let plan = plan_flight(&mut dice);
            if plan.legs.len() != 2 {
                continue;
            }
            assert_eq!(plan.legs[0].ease, EasingFunction::Power2Out);
            assert_eq!(plan.legs[1].ease, EasingFunction::Power2In);
            if plan.legs[1].waypoints[1].z == -1000.0 {
                away += 1;
                assert_eq!(plan.legs[1].axes, Axes::XZ);
            } else {
                across += 1;
                assert_eq!(plan.legs[1].waypoints[1].x, -plan.start.x);
            }
        }
        assert!(away > 0 && across > 0);
    }

    #[test]
    fn run_ends_hidden_and_relaunches() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Cue(FlybyCue);
        impl From<FlybyCue> for Cue {
            fn from(c: FlybyCue) -> Self {
                Self(c)
            }
        }

        let store = AssetStore::new();
        let mut scene = Scene::new();
        let mut assets = AssetBinder::new(&store);
        let ship = Ship::new(&mut scene, &mut assets);
        let mut flyby = FlybyShip::new(&mut scene, &mut assets, ship.hull());
        let mut tweens: Tweens<Cue> = Tweens::new();
        let mut dice = Dice::new(Some(4));
        flyby.launch(&mut scene, &mut tweens, &mut dice);

        let mut arrivals = 0;
        for _ in 0..(60 * 60) {
            for Cue(cue) in tweens.update(1.0 / 60.0, &mut scene) {
                if cue == FlybyCue::Arrived {
                    arrivals += 1;
                    flyby.handle(cue, &mut scene, &mut tweens, &mut dice);
                    assert_eq!(scene.transform(flyby.node()).position, HIDDEN);
                    assert_eq!(scene.transform(flyby.wormhole()).scale, Vec3::ZERO);
                } else {
                    flyby.handle(cue, &mut scene, &mut tweens, &mut dice);
                }
            }
        }
        assert!(arrivals >= 2);
        assert!(flyby.runs >= 2);
    }
}
