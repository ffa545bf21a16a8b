//! Tween scheduler: time-driven property animation on scene nodes.
//!
//! A [`Tween`] animates one `(node, channel)` pair through one or more
//! [`Segment`]s played back to back, optionally after a delay. The
//! [`Tweens`] scheduler advances every running tween by the frame delta and
//! returns the completion cues of tweens that finished during the step.
//! Cues replace completion callbacks: the owner matches on them and starts
//! follow-up motion, which keeps every repeating choreography loop as plain
//! data.
//!
//! Start values are read from the scene when a segment begins, so a tween
//! queued behind a delay picks up wherever the node is at that moment. When
//! a segment begins it also kills any other running tween on the same node
//! and channel whose axes overlap; killed tweens never report their cue.

use glam::Vec3;

use super::bezier::{BezierKind, BezierPath};
use crate::scene::{NodeId, NodeKind, Scene};
use crate::util::easing::EasingFunction;

/// Animatable node property. Scalar channels use the `x` component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `transform.position`.
    Position,
    /// `transform.rotation` (Euler radians).
    Rotation,
    /// `transform.scale`.
    Scale,
    /// Light intensity of a light node.
    LightIntensity,
    /// Field of view (degrees) of a camera node.
    Fov,
    /// Opacity of a mesh node's material.
    Opacity,
}

impl Channel {
    /// Read the channel value from a node.
    #[must_use]
    pub fn read(self, scene: &Scene, node: NodeId) -> Vec3 {
        let n = scene.node(node);
        match self {
            Channel::Position => n.transform.position,
            Channel::Rotation => n.transform.rotation,
            Channel::Scale => n.transform.scale,
            Channel::LightIntensity => match &n.kind {
                NodeKind::Light(light) => Vec3::new(light.intensity, 0.0, 0.0),
                _ => Vec3::ZERO,
            },
            Channel::Fov => match &n.kind {
                NodeKind::Camera(camera) => Vec3::new(camera.fov, 0.0, 0.0),
                _ => Vec3::ZERO,
            },
            Channel::Opacity => scene
                .material_of(node)
                .map_or(Vec3::ZERO, |m| Vec3::new(scene.material(m).opacity, 0.0, 0.0)),
        }
    }

    /// Write the selected axes of `value` into a node.
    pub fn write(self, scene: &mut Scene, node: NodeId, value: Vec3, axes: Axes) {
        let slot = match self {
            Channel::Position => &mut scene.transform_mut(node).position,
            Channel::Rotation => &mut scene.transform_mut(node).rotation,
            Channel::Scale => &mut scene.transform_mut(node).scale,
            Channel::LightIntensity => {
                if let Some(light) = scene.light_mut(node) {
                    light.intensity = value.x;
                }
                return;
            }
            Channel::Fov => {
                if let Some(camera) = scene.camera_mut(node) {
                    camera.fov = value.x;
                }
                return;
            }
            Channel::Opacity => {
                if let Some(material) = scene.material_of(node) {
                    scene.material_mut(material).opacity = value.x;
                }
                return;
            }
        };
        *slot = axes.merge(*slot, value);
    }
}

/// Subset of vector components a segment writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Axes {
    /// Write `x`.
    pub x: bool,
    /// Write `y`.
    pub y: bool,
    /// Write `z`.
    pub z: bool,
}

impl Axes {
    /// `x` only (also used by scalar channels).
    pub const X: Self = Self::new(true, false, false);
    /// `y` only.
    pub const Y: Self = Self::new(false, true, false);
    /// `z` only.
    pub const Z: Self = Self::new(false, false, true);
    /// `x` and `y`.
    pub const XY: Self = Self::new(true, true, false);
    /// `x` and `z`.
    pub const XZ: Self = Self::new(true, false, true);
    /// All three.
    pub const XYZ: Self = Self::new(true, true, true);

    /// Build from flags.
    #[must_use]
    pub const fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    /// Take selected components from `value`, the rest from `base`.
    #[must_use]
    pub fn merge(self, base: Vec3, value: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { value.x } else { base.x },
            if self.y { value.y } else { base.y },
            if self.z { value.z } else { base.z },
        )
    }

    /// Whether the two sets share a component.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        (self.x && other.x) || (self.y && other.y) || (self.z && other.z)
    }
}

/// Shape of one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    /// Straight interpolation to a value.
    To(Vec3),
    /// Curve through / guided by waypoints (start value prepended).
    Bezier {
        /// Curve flavour.
        kind: BezierKind,
        /// Waypoints; unselected axes are ignored.
        waypoints: Vec<Vec3>,
    },
    /// Nothing moves (timers).
    Hold,
}

/// One timed leg of a tween.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Seconds.
    pub duration: f32,
    /// Progress curve.
    pub ease: EasingFunction,
    /// Geometry.
    pub path: Path,
    /// Components written.
    pub axes: Axes,
}

/// A scheduled animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<C> {
    target: Option<(NodeId, Channel)>,
    delay: f32,
    segments: Vec<Segment>,
    cue: Option<C>,
}

impl<C> Tween<C> {
    /// Start building a tween on a node property.
    #[must_use]
    pub fn on(node: NodeId, channel: Channel) -> Self {
        Self {
            target: Some((node, channel)),
            delay: 0.0,
            segments: Vec::new(),
            cue: None,
        }
    }

    /// A target-less timer that completes after `seconds`.
    #[must_use]
    pub fn wait(seconds: f32) -> Self {
        Self {
            target: None,
            delay: 0.0,
            segments: vec![Segment {
                duration: seconds.max(0.0),
                ease: EasingFunction::Linear,
                path: Path::Hold,
                axes: Axes::XYZ,
            }],
            cue: None,
        }
    }

    /// Wait `seconds` before the first segment starts.
    #[must_use]
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    /// Append a straight segment.
    #[must_use]
    pub fn to(mut self, value: Vec3, axes: Axes, duration: f32, ease: EasingFunction) -> Self {
        self.segments.push(Segment {
            duration: duration.max(0.0),
            ease,
            path: Path::To(value),
            axes,
        });
        self
    }

    /// Append a straight segment on a scalar channel.
    #[must_use]
    pub fn to_scalar(self, value: f32, duration: f32, ease: EasingFunction) -> Self {
        self.to(Vec3::new(value, 0.0, 0.0), Axes::X, duration, ease)
    }

    /// Append a Bezier segment.
    #[must_use]
    pub fn bezier(
        mut self,
        kind: BezierKind,
        waypoints: Vec<Vec3>,
        axes: Axes,
        duration: f32,
        ease: EasingFunction,
    ) -> Self {
        self.segments.push(Segment {
            duration: duration.max(0.0),
            ease,
            path: Path::Bezier { kind, waypoints },
            axes,
        });
        self
    }

    /// Report `cue` from [`Tweens::update`] when the tween completes.
    #[must_use]
    pub fn with_cue(mut self, cue: C) -> Self {
        self.cue = Some(cue);
        self
    }

    /// Total scheduled time including the delay.
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        self.delay + self.segments.iter().map(|s| s.duration).sum::<f32>()
    }
}

/// Identifier returned by [`Tweens::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

struct Running<C> {
    id: TweenId,
    tween: Tween<C>,
    delay_left: f32,
    segment: usize,
    elapsed: f32,
    /// Start value of the active segment once it has begun.
    start: Option<Vec3>,
    path: Option<BezierPath>,
    killed: bool,
    done: bool,
}

impl<C> Running<C> {
    fn active_axes(&self) -> Option<Axes> {
        if self.start.is_none() {
            return None;
        }
        self.tween.segments.get(self.segment).map(|s| s.axes)
    }
}

/// Scheduler owning every running tween of one scene.
pub struct Tweens<C> {
    running: Vec<Running<C>>,
    next_id: u64,
}

impl<C> std::fmt::Debug for Tweens<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tweens")
            .field("running", &self.running.len())
            .finish_non_exhaustive()
    }
}

impl<C> Default for Tweens<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Tweens<C> {
    /// Empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: Vec::with_capacity(32),
            next_id: 0,
        }
    }

    /// Schedule a tween. It begins on the next [`update`](Self::update).
    pub fn add(&mut self, tween: Tween<C>) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.running.push(Running {
            id,
            delay_left: tween.delay,
            tween,
            segment: 0,
            elapsed: 0.0,
            start: None,
            path: None,
            killed: false,
            done: false,
        });
        id
    }

    /// Stop a tween without reporting its cue. Returns whether it was
    /// running.
    pub fn kill(&mut self, id: TweenId) -> bool {
        let before = self.running.len();
        self.running.retain(|r| r.id != id);
        self.running.len() != before
    }

    /// Stop every tween targeting `node`.
    pub fn kill_node(&mut self, node: NodeId) {
        self.running
            .retain(|r| !matches!(r.tween.target, Some((n, _)) if n == node));
    }

    /// Whether a tween is still scheduled.
    #[must_use]
    pub fn is_active(&self, id: TweenId) -> bool {
        self.running.iter().any(|r| r.id == id)
    }

    /// Number of scheduled tweens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Advance all tweens by `dt` seconds and return the cues of those that
    /// completed, in scheduling order.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) -> Vec<C> {
        let mut cues = Vec::new();
        for i in 0..self.running.len() {
            if self.running[i].killed {
                continue;
            }
            self.advance(i, dt.max(0.0), scene);
        }

        let mut kept = Vec::with_capacity(self.running.len());
        for r in self.running.drain(..) {
            if r.killed {
                continue;
            }
            if r.done {
                if let Some(cue) = r.tween.cue {
                    cues.push(cue);
                }
            } else {
                kept.push(r);
            }
        }
        self.running = kept;
        cues
    }

    fn advance(&mut self, i: usize, dt: f32, scene: &mut Scene) {
        let mut remaining = dt;
        {
            let r = &mut self.running[i];
            if r.delay_left > 0.0 {
                if remaining < r.delay_left {
                    r.delay_left -= remaining;
                    return;
                }
                remaining -= r.delay_left;
                r.delay_left = 0.0;
            }
        }

        loop {
            if self.running[i].segment >= self.running[i].tween.segments.len() {
                self.running[i].done = true;
                return;
            }
            if self.running[i].start.is_none() {
                self.begin_segment(i, scene);
            }

            let r = &mut self.running[i];
            let seg = &r.tween.segments[r.segment];
            r.elapsed += remaining;
            if r.elapsed >= seg.duration {
                remaining = r.elapsed - seg.duration;
                write_progress(r, 1.0, scene);
                r.segment += 1;
                r.elapsed = 0.0;
                r.start = None;
                r.path = None;
            } else {
                let t = r.elapsed / seg.duration;
                write_progress(r, seg.ease.evaluate(t), scene);
                return;
            }
        }
    }

    fn begin_segment(&mut self, i: usize, scene: &Scene) {
        let (target, axes) = {
            let r = &self.running[i];
            (r.tween.target, r.tween.segments[r.segment].axes)
        };

        let start = target.map_or(Vec3::ZERO, |(node, channel)| channel.read(scene, node));

        if let Some(target) = target {
            for (j, other) in self.running.iter_mut().enumerate() {
                if j == i || other.killed || other.tween.target != Some(target) {
                    continue;
                }
                if other.active_axes().is_some_and(|a| a.overlaps(axes)) {
                    other.killed = true;
                }
            }
        }

        let r = &mut self.running[i];
        let seg = &r.tween.segments[r.segment];
        r.path = match &seg.path {
            Path::Bezier { kind, waypoints } => {
                let mut points = Vec::with_capacity(waypoints.len() + 1);
                points.push(start);
                points.extend(waypoints.iter().map(|w| seg.axes.merge(start, *w)));
                Some(BezierPath::new(*kind, &points))
            }
            Path::To(_) | Path::Hold => None,
        };
        r.start = Some(start);
    }
}

fn write_progress<C>(r: &Running<C>, eased: f32, scene: &mut Scene) {
    let Some((node, channel)) = r.tween.target else {
        return;
    };
    let Some(start) = r.start else {
        return;
    };
    let seg = &r.tween.segments[r.segment];
    let value = match (&seg.path, &r.path) {
        (Path::To(end), _) => start.lerp(seg.axes.merge(start, *end), eased),
        (Path::Bezier { .. }, Some(path)) => path.sample(eased),
        _ => return,
    };
    channel.write(scene, node, value, seg.axes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Light, LightKind, Transform};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Cue {
        A,
        B,
    }

    fn scene_with_node() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let node = scene.add_group(None, "n", Transform::default());
        (scene, node)
    }

    fn step(tweens: &mut Tweens<Cue>, scene: &mut Scene, seconds: f32) -> Vec<Cue> {
        let mut cues = Vec::new();
        let frames = (seconds * 60.0).round() as usize;
        for _ in 0..frames {
            cues.extend(tweens.update(1.0 / 60.0, scene));
        }
        cues
    }

    #[test]
    fn straight_tween_lands_exactly_and_cues_once() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(
            Tween::on(node, Channel::Position)
                .to(Vec3::new(10.0, 0.0, 0.0), Axes::X, 1.0, EasingFunction::Power2InOut)
                .with_cue(Cue::A),
        );
        let cues = step(&mut tweens, &mut scene, 0.5);
        assert!(cues.is_empty());
        let mid = scene.transform(node).position.x;
        assert!(mid > 4.0 && mid < 6.0);
        let cues = step(&mut tweens, &mut scene, 0.6);
        assert_eq!(cues, vec![Cue::A]);
        assert_eq!(scene.transform(node).position, Vec3::new(10.0, 0.0, 0.0));
        assert!(tweens.is_empty());
    }

    #[test]
    fn delay_defers_start_value_capture() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(
            Tween::on(node, Channel::Position)
                .delay(0.5)
                .to(Vec3::new(0.0, 0.0, 1.0), Axes::Z, 0.5, EasingFunction::Linear),
        );
        let _ = tweens.update(0.25, &mut scene);
        assert_eq!(scene.transform(node).position.z, 0.0);
        scene.transform_mut(node).position.z = -3.0;
        let _ = tweens.update(0.5, &mut scene);
        // 0.25s into the segment from -3 toward 1.
        assert!((scene.transform(node).position.z - (-1.0)).abs() < 1e-4);
    }

    #[test]
    fn overlapping_tween_overwrites_without_cue() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let first = tweens.add(
            Tween::on(node, Channel::Position)
                .to(Vec3::splat(5.0), Axes::XYZ, 2.0, EasingFunction::Linear)
                .with_cue(Cue::A),
        );
        let _ = tweens.update(0.5, &mut scene);
        let _ = tweens.add(
            Tween::on(node, Channel::Position)
                .to(Vec3::ZERO, Axes::X, 1.0, EasingFunction::Linear)
                .with_cue(Cue::B),
        );
        let cues = step(&mut tweens, &mut scene, 3.0);
        assert_eq!(cues, vec![Cue::B]);
        assert!(!tweens.is_active(first));
    }

    #[test]
    fn disjoint_axes_run_side_by_side() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(
            Tween::on(node, Channel::Rotation)
                .to(Vec3::new(20.0, 0.0, 0.0), Axes::X, 1.0, EasingFunction::Linear)
                .with_cue(Cue::A),
        );
        let _ = tweens.add(
            Tween::on(node, Channel::Rotation)
                .to(Vec3::new(0.0, 3.0, 0.0), Axes::Y, 1.0, EasingFunction::Linear)
                .with_cue(Cue::B),
        );
        let cues = step(&mut tweens, &mut scene, 1.1);
        assert_eq!(cues, vec![Cue::A, Cue::B]);
        assert_eq!(scene.transform(node).rotation, Vec3::new(20.0, 3.0, 0.0));
    }

    #[test]
    fn large_step_carries_into_next_segment() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(
            Tween::on(node, Channel::Position)
                .to(Vec3::new(0.0, 0.0, 1.0), Axes::Z, 0.5, EasingFunction::Power2Out)
                .to(Vec3::new(0.0, 0.0, 5.0), Axes::Z, 0.5, EasingFunction::Linear),
        );
        let _ = tweens.update(0.75, &mut scene);
        assert!((scene.transform(node).position.z - 3.0).abs() < 1e-4);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(
            Tween::on(node, Channel::Scale)
                .to(Vec3::ZERO, Axes::XYZ, 0.0, EasingFunction::Linear)
                .with_cue(Cue::A),
        );
        assert_eq!(tweens.update(0.0, &mut scene), vec![Cue::A]);
        assert_eq!(scene.transform(node).scale, Vec3::ZERO);
    }

    #[test]
    fn wait_is_a_timer() {
        let (mut scene, _) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(Tween::wait(2.0).with_cue(Cue::B));
        assert!(step(&mut tweens, &mut scene, 1.9).is_empty());
        assert_eq!(step(&mut tweens, &mut scene, 0.2), vec![Cue::B]);
    }

    #[test]
    fn killed_tween_reports_nothing() {
        let (mut scene, node) = scene_with_node();
        let mut tweens = Tweens::<Cue>::new();
        let id = tweens.add(
            Tween::on(node, Channel::Position)
                .to(Vec3::ONE, Axes::XYZ, 1.0, EasingFunction::Linear)
                .with_cue(Cue::A),
        );
        assert!(tweens.kill(id));
        assert!(!tweens.kill(id));
        assert!(step(&mut tweens, &mut scene, 2.0).is_empty());
    }

    #[test]
    fn bezier_leaves_unselected_axis_alone() {
        let (mut scene, node) = scene_with_node();
        scene.transform_mut(node).position = Vec3::new(-50.0, -7.0, -4.0);
        let mut tweens = Tweens::<Cue>::new();
        let _ = tweens.add(
            Tween::on(node, Channel::Position)
                .bezier(
                    BezierKind::Thru,
                    vec![Vec3::new(1.0, 0.0, -9.0), Vec3::new(50.0, 0.0, -2.0)],
                    Axes::XZ,
                    3.0,
                    EasingFunction::Power2InOut,
                )
                .with_cue(Cue::A),
        );
        let _ = step(&mut tweens, &mut scene, 1.0);
        assert_eq!(scene.transform(node).position.y, -7.0);
        let cues = step(&mut tweens, &mut scene, 2.5);
        assert_eq!(cues, vec![Cue::A]);
        assert!((scene.transform(node).position - Vec3::new(50.0, -7.0, -2.0)).length() < 1e-3);
    }

    #[test]
    fn scalar_channels_drive_light_and_fov() {
        let mut scene = Scene::new();
        let light = scene.add_light(
            None,
            "l",
            Vec3::ZERO,
            Light::new(LightKind::Point { range: 0.0 }, 0xff_ff_ff, 0.0),
        );
        let mut tweens: Tweens<Cue> = Tweens::new();
        let _ = tweens.add(
            Tween::on(light, Channel::LightIntensity)
                .to_scalar(1.0, 0.5, EasingFunction::Power2Out)
                .to_scalar(0.0, 0.5, EasingFunction::Power2In),
        );
        let _ = tweens.update(0.5, &mut scene);
        assert!((Channel::LightIntensity.read(&scene, light).x - 1.0).abs() < 1e-5);
        let _ = tweens.update(0.5, &mut scene);
        assert!(Channel::LightIntensity.read(&scene, light).x.abs() < 1e-5);
    }
}
