//! The three fixed viewpoints, the intro zoom and the idle jitter.

use glam::{Vec2, Vec3};

use crate::animation::{Axes, BezierKind, Channel, Tween, Tweens};
use crate::options::CameraOptions;
use crate::scene::{NodeId, PerspectiveCamera, Scene};
use crate::util::easing::EasingFunction;
use crate::util::random::Dice;

/// World point the bridge cameras look at.
const BRIDGE_TARGET: Vec3 = Vec3::ZERO;
/// Planet centre, framed by the third camera.
const PLANET_TARGET: Vec3 = Vec3::new(-33.0, -35.0, -60.0);

/// Selectable viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraSlot {
    /// Bridge view; the HUD panels are only shown from here.
    Bridge,
    /// Outside view of the ship.
    Outside,
    /// View toward the planet.
    Planet,
}

impl CameraSlot {
    fn index(self) -> usize {
        match self {
            Self::Bridge => 0,
            Self::Outside => 1,
            Self::Planet => 2,
        }
    }
}

/// Completion cues of camera tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCue {
    /// A jitter leg finished; start the next one.
    Jitter,
}

/// Owns the camera nodes and the active selection.
#[derive(Debug)]
pub struct CameraRig {
    cameras: [NodeId; 3],
    /// Position each camera had when first jittered.
    anchors: [Option<Vec3>; 3],
    active: CameraSlot,
    options: CameraOptions,
}

impl CameraRig {
    /// Create the three cameras in `scene`.
    pub fn new(scene: &mut Scene, aspect: f32, options: &CameraOptions) -> Self {
        let projection = PerspectiveCamera {
            fov: options.fovy,
            aspect,
            near: options.znear,
            far: options.zfar,
        };
        let placements = [
            ("cam1", Vec3::new(0.0, 2.0, 2.0), BRIDGE_TARGET),
            ("cam2", Vec3::new(20.0, 5.0, -20.0), BRIDGE_TARGET),
            ("cam3", Vec3::new(15.0, -10.0, -40.0), PLANET_TARGET),
        ];
        let cameras = placements.map(|(name, position, target)| {
            let node = scene.add_camera(name, position, projection);
            scene.look_at(node, target);
            node
        });
        Self {
            cameras,
            anchors: [None; 3],
            active: CameraSlot::Bridge,
            options: options.clone(),
        }
    }

    /// Currently selected viewpoint.
    #[must_use]
    pub fn active(&self) -> CameraSlot {
        self.active
    }

    /// Node of the selected camera.
    #[must_use]
    pub fn active_node(&self) -> NodeId {
        self.cameras[self.active.index()]
    }

    /// Node of a specific camera.
    #[must_use]
    pub fn node(&self, slot: CameraSlot) -> NodeId {
        self.cameras[slot.index()]
    }

    /// Switch viewpoints.
    pub fn select(&mut self, slot: CameraSlot) {
        if slot != self.active {
            log::debug!("camera → {slot:?}");
        }
        self.active = slot;
    }

    /// Select the bridge camera and widen it for the zoom-in.
    pub fn before_intro(&mut self, scene: &mut Scene) {
        self.select(CameraSlot::Bridge);
        if let Some(cam) = scene.camera_mut(self.node(CameraSlot::Bridge)) {
            cam.fov = self.options.intro_fov;
        }
    }

    /// Zoom the bridge camera back to its resting field of view.
    pub fn intro<C>(&self, tweens: &mut Tweens<C>) {
        let _ = tweens.add(
            Tween::on(self.node(CameraSlot::Bridge), Channel::Fov)
                .delay(self.options.intro_delay)
                .to_scalar(
                    self.options.fovy,
                    self.options.intro_duration,
                    EasingFunction::QuadraticOut,
                ),
        );
    }

    /// Start one idle-jitter leg on the active camera.
    ///
    /// The leg curves through two random points within the jitter distance
    /// of the camera's anchor position and reports [`CameraCue::Jitter`]
    /// when done.
    pub fn jitter<C: From<CameraCue>>(
        &mut self,
        scene: &Scene,
        tweens: &mut Tweens<C>,
        dice: &mut Dice,
    ) {
        let slot = self.active.index();
        let node = self.cameras[slot];
        let anchor = *self.anchors[slot].get_or_insert(scene.transform(node).position);
        let d = self.options.jitter_distance;
        let mut pick = |centre: f32| {
            let lo = ((centre - d) * 1000.0).round() as i32;
            let hi = ((centre + d) * 1000.0).round() as i32;
            dice.int_f(lo, hi) / 1000.0
        };
        let waypoints = vec![
            Vec3::new(pick(anchor.x), pick(anchor.y), 0.0),
            Vec3::new(pick(anchor.x), pick(anchor.y), 0.0),
        ];
        let duration = dice.seconds(1, 3);
        let _ = tweens.add(
            Tween::on(node, Channel::Position)
                .bezier(
                    BezierKind::Thru,
                    waypoints,
                    Axes::XY,
                    duration,
                    EasingFunction::Power2InOut,
                )
                .with_cue(C::from(CameraCue::Jitter)),
        );
    }

    /// Set the aspect ratio of all three cameras.
    pub fn resize(&self, scene: &mut Scene, width: u32, height: u32) {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        for node in self.cameras {
            if let Some(cam) = scene.camera_mut(node) {
                cam.aspect = aspect;
            }
        }
    }

    /// Pixel coordinates of `world` through the active camera.
    #[must_use]
    pub fn project(&self, scene: &Scene, world: Vec3, size: Vec2) -> Vec2 {
        super::core::project(scene, self.active_node(), world, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Scene, CameraRig) {
        let mut scene = Scene::new();
        let rig = CameraRig::new(&mut scene, 1.5, &CameraOptions::default());
        (scene, rig)
    }

    #[test]
    fn intro_zooms_from_wide_to_resting_fov() {
        let (mut scene, mut rig) = rig();
        let mut tweens: Tweens<CameraCue> = Tweens::new();
        rig.before_intro(&mut scene);
        let cam = rig.node(CameraSlot::Bridge);
        assert_eq!(scene.camera(cam).map(|c| c.fov), Some(200.0));
        rig.intro(&mut tweens);
        let _ = tweens.update(0.4, &mut scene);
        assert_eq!(scene.camera(cam).map(|c| c.fov), Some(200.0));
        for _ in 0..100 {
            let _ = tweens.update(1.0 / 60.0, &mut scene);
        }
        assert_eq!(scene.camera(cam).map(|c| c.fov), Some(75.0));
        assert!(tweens.is_empty());
    }

    #[test]
    fn jitter_stays_near_anchor_and_repeats() {
        let (mut scene, mut rig) = rig();
        let mut tweens: Tweens<CameraCue> = Tweens::new();
        let mut dice = Dice::new(Some(7));
        let cam = rig.active_node();
        let anchor = scene.transform(cam).position;
        rig.jitter(&scene, &mut tweens, &mut dice);
        let mut cycles = 0;
        for _ in 0..(60 * 10) {
            for cue in tweens.update(1.0 / 60.0, &mut scene) {
                assert_eq!(cue, CameraCue::Jitter);
                cycles += 1;
                rig.jitter(&scene, &mut tweens, &mut dice);
            }
            let p = scene.transform(cam).position;
            assert!((p.x - anchor.x).abs() < 0.05);
            assert!((p.y - anchor.y).abs() < 0.05);
            assert_eq!(p.z, anchor.z);
        }
        assert!(cycles >= 3);
    }

    #[test]
    fn select_changes_projection_camera() {
        let (scene, mut rig) = rig();
        let size = Vec2::new(1000.0, 600.0);
        rig.select(CameraSlot::Planet);
        let centre = rig.project(&scene, PLANET_TARGET, size);
        assert!((centre - size / 2.0).length() < 0.5);
        rig.select(CameraSlot::Bridge);
        let origin = rig.project(&scene, Vec3::ZERO, size);
        assert!((origin - size / 2.0).length() < 0.5);
    }

    #[test]
    fn resize_updates_every_camera() {
        let (mut scene, rig) = rig();
        rig.resize(&mut scene, 800, 800);
        for slot in [CameraSlot::Bridge, CameraSlot::Outside, CameraSlot::Planet] {
            assert_eq!(scene.camera(rig.node(slot)).map(|c| c.aspect), Some(1.0));
        }
    }
}
