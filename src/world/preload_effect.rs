//! The loading tunnel: a water-textured tube flown through while assets
//! stream in, stretched and pushed past the camera when loading is done.
//!
//! The effect owns a separate [`Scene`] and its own tween queue so it can
//! run before any main-scene asset exists.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::Vec3;

use crate::animation::{Axes, Channel, Tween, Tweens};
use crate::scene::{
    Fog, Light, LightKind, Material, MaterialHandle, MeshData, NodeId, PerspectiveCamera, Scene,
    Side, TextureData, TextureHandle, Transform,
};
use crate::util::easing::EasingFunction;
use crate::util::frames;

const SCROLL_SPEED: f32 = 0.008;
const FOG_DENSITY: f32 = 0.15;

/// Completion cue of the exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadCue {
    /// The tunnel finished stretching; the main scene takes over.
    Finished,
}

/// Water tunnel shown while assets stream in.
///
/// Lives in its own [`Scene`] with its own camera and tweens, so it can be
/// drawn before anything of the main scene exists.
#[derive(Debug)]
pub struct PreloadEffect {
    scene: Scene,
    tweens: Tweens<PreloadCue>,
    camera: NodeId,
    tube: NodeId,
    material: MaterialHandle,
    water: TextureHandle,
    water_loaded: bool,
    destroying: bool,
    finished: bool,
}

impl PreloadEffect {
    /// Build the tunnel scene for a viewport of `aspect`.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let mut scene = Scene::new();
        let camera = scene.add_camera(
            "preload camera",
            Vec3::new(0.0, 0.0, 7.0),
            PerspectiveCamera {
                fov: 40.0,
                aspect,
                near: 0.1,
                far: 10000.0,
            },
        );
        scene.look_at(camera, Vec3::ZERO);

        for x in [1.0, -1.0] {
            let _ = scene.add_light(
                None,
                "preload directional",
                Vec3::new(x, 1.0, 0.0).normalize(),
                Light::new(LightKind::Directional { target: Vec3::ZERO }, 0xff_80_00, 1.5),
            );
        }
        let _ = scene.add_light(
            None,
            "preload green",
            Vec3::new(0.0, -3.0, 0.0),
            Light::new(LightKind::Point { range: 25.0 }, 0x44_FF_AA, 15.0),
        );
        let _ = scene.add_light(
            None,
            "preload orange",
            Vec3::new(3.0, 3.0, 0.0),
            Light::new(LightKind::Point { range: 30.0 }, 0xff_44_00, 20.0),
        );
        scene.fog = Some(Fog {
            color: [0.0; 3],
            density: FOG_DENSITY,
        });

        let water = scene.add_texture(Arc::new(TextureData::white()), true);
        let material = scene.add_material(
            Material::lambert()
                .with_color(0xFF_FF_FF)
                .with_map(water)
                .with_side(Side::Back),
        );
        let cylinder = scene.add_mesh_data(Arc::new(MeshData::open_cylinder(1.0, 1.0, 30.0, 32)));
        let tube = scene.add_mesh(
            None,
            "preload tube",
            Transform {
                position: Vec3::new(0.0, 0.5, 0.0),
                rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
                ..Transform::default()
            },
            cylinder,
            material,
        );

        Self {
            scene,
            tweens: Tweens::new(),
            camera,
            tube,
            material,
            water,
            water_loaded: false,
            destroying: false,
            finished: false,
        }
    }

    /// Swap in the real water image once it has been fetched.
    pub fn set_water(&mut self, data: Arc<TextureData>) {
        self.scene.replace_texture(self.water, data);
        self.water_loaded = true;
        log::debug!("preload tunnel texture loaded");
    }

    /// Whether [`Self::set_water`] has been called.
    #[must_use]
    pub fn has_water(&self) -> bool {
        self.water_loaded
    }

    /// Scroll the texture and advance the exit animation. Returns `true`
    /// on the frame the exit completes.
    pub fn animate(&mut self, dt: f32) -> bool {
        let offset = &mut self.scene.material_mut(self.material).uv_offset;
        offset.y = (offset.y - SCROLL_SPEED * frames(dt)) % 1.0;

        let done = self
            .tweens
            .update(dt, &mut self.scene)
            .contains(&PreloadCue::Finished);
        if done {
            self.finished = true;
            self.scene.set_visible(self.tube, false);
            log::info!("preload effect finished");
        }
        done
    }

    /// Start the exit: stretch the tube and push it past the camera.
    pub fn destroy(&mut self) {
        if self.destroying {
            return;
        }
        self.destroying = true;
        let _ = self.tweens.add(
            Tween::on(self.tube, Channel::Scale)
                .to(Vec3::Y * 3.0, Axes::Y, 1.0, EasingFunction::Power2Out)
                .with_cue(PreloadCue::Finished),
        );
        let _ = self.tweens.add(
            Tween::on(self.tube, Channel::Position)
                .to(Vec3::Z, Axes::Z, 0.5, EasingFunction::Power2Out)
                .to(Vec3::Z * 5.0, Axes::Z, 0.5, EasingFunction::Power2In),
        );
    }

    /// Whether the exit animation has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the exit animation has started.
    #[must_use]
    pub fn is_destroying(&self) -> bool {
        self.destroying
    }

    /// Match the tunnel camera to a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene
            .set_aspect(width.max(1) as f32 / height.max(1) as f32);
    }

    /// The tunnel scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The tunnel camera.
    #[must_use]
    pub fn camera(&self) -> NodeId {
        self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_scrolls_and_wraps() {
        let mut effect = PreloadEffect::new(1.0);
        for _ in 0..200 {
            let _ = effect.animate(1.0 / 60.0);
            let y = effect.scene().material(effect.material).uv_offset.y;
            assert!(y > -1.0 && y <= 0.0);
        }
        let y = effect.scene().material(effect.material).uv_offset.y;
        assert!((y - (-1.6f32 % 1.0)).abs() < 1e-3);
    }

    #[test]
    fn destroy_stretches_then_finishes() {
        let mut effect = PreloadEffect::new(1.0);
        effect.destroy();
        effect.destroy();
        let mut finished_frames = 0;
        for _ in 0..90 {
            if effect.animate(1.0 / 60.0) {
                finished_frames += 1;
            }
        }
        assert_eq!(finished_frames, 1);
        assert!(effect.is_finished());
        let t = effect.scene().transform(effect.tube);
        assert!((t.scale.y - 3.0).abs() < 1e-4);
        assert_eq!(t.scale.x, 1.0);
        assert!((t.position.z - 5.0).abs() < 1e-4);
        assert!(!effect.scene().is_visible(effect.tube));
    }

    #[test]
    fn water_swap_bumps_the_revision() {
        let mut effect = PreloadEffect::new(1.0);
        assert!(!effect.has_water());
        let before = effect.scene().texture(effect.water).revision;
        effect.set_water(Arc::new(TextureData::solid(2, 2, [0, 0, 255, 255])));
        assert!(effect.has_water());
        assert_eq!(effect.scene().texture(effect.water).revision, before + 1);
    }
}
