//! GPU-free side of the engine: the preload queue, both scenes, the
//! camera rig, every world controller and the tween queue that chains
//! their choreographies.

use glam::Vec2;

use super::{Cue, Stage};
use crate::animation::Tweens;
use crate::assets::{AssetFetcher, AssetStore, Manifest, Preloader};
use crate::camera::{CameraCue, CameraRig, CameraSlot};
use crate::options::Options;
use crate::renderer::TextBlock;
use crate::scene::Scene;
use crate::util::random::Dice;
use crate::world::{
    AssetBinder, AsteroidField, FlybyShip, LightRig, Mothership, Panels, Planet, PreloadEffect,
    Ship, Skybox,
};

/// Every controller of the main scene, built once preloading is done.
#[derive(Debug)]
struct World {
    planet: Planet,
    lights: LightRig,
    skybox: Skybox,
    flyby: FlybyShip,
    mothership: Mothership,
    panels: Panels,
    asteroids: AsteroidField,
}

impl World {
    /// Build the scene content in a fixed order: planet, lights, skybox,
    /// ships, panels, asteroids.
    fn build(scene: &mut Scene, store: &AssetStore, dice: &mut Dice, options: &Options) -> Self {
        let mut assets = AssetBinder::new(store);
        let planet = Planet::new(scene, &mut assets);
        let lights = LightRig::new(scene, planet.position(scene));
        let skybox = Skybox::new(scene, &mut assets, dice, &options.scene);
        let ship = Ship::new(scene, &mut assets);
        let flyby = FlybyShip::new(scene, &mut assets, ship.hull());
        let mothership = Mothership::new(scene, &mut assets, ship.hull(), options.scene.drone_count);
        let panels = Panels::new(scene, &mut assets);
        let asteroids = AsteroidField::new(scene, &mut assets, dice, &options.scene);
        log::info!(
            "scene built: {} nodes, {} meshes, {} textures",
            scene.len(),
            scene.mesh_count(),
            scene.texture_count()
        );
        Self {
            planet,
            lights,
            skybox,
            flyby,
            mothership,
            panels,
            asteroids,
        }
    }

    fn animate(&mut self, dt: f32, scene: &mut Scene, rig: &CameraRig, dice: &mut Dice) {
        self.skybox.animate(dt, scene);
        self.planet.animate(dt, scene);
        let focus = self.planet.position(scene);
        self.lights.animate(dt, scene, focus);
        self.mothership.animate(dt, scene);
        self.panels.animate(dt, scene, rig, dice);
        self.asteroids.animate(dt, scene, dice);
    }
}

/// Drives the show from first asset request to the running scene.
#[derive(Debug)]
pub struct Director {
    stage: Stage,
    options: Options,
    preloader: Preloader,
    preload: PreloadEffect,
    scene: Scene,
    rig: CameraRig,
    tweens: Tweens<Cue>,
    dice: Dice,
    world: Option<World>,
}

impl Director {
    /// Set up the preload tunnel and the main scene's cameras; the bridge
    /// camera starts wide and idles while assets stream in.
    #[must_use]
    pub fn new(options: Options, manifest: Manifest, width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let mut dice = Dice::new(options.scene.seed);
        let mut scene = Scene::new();
        let mut rig = CameraRig::new(&mut scene, aspect, &options.camera);
        let mut tweens = Tweens::new();
        rig.before_intro(&mut scene);
        rig.jitter(&scene, &mut tweens, &mut dice);

        log::info!("preloading {} assets", manifest.request_count());
        Self {
            stage: Stage::Preloading,
            preloader: Preloader::new(manifest),
            preload: PreloadEffect::new(aspect),
            scene,
            rig,
            tweens,
            dice,
            world: None,
            options,
        }
    }

    /// Advance one frame of `dt` seconds. Returns `true` on the frame the
    /// preload queue becomes ready.
    pub fn update(&mut self, dt: f32, fetcher: &mut dyn AssetFetcher) -> bool {
        let ready = self.stage == Stage::Preloading && self.pump(fetcher);
        if ready {
            self.reveal();
        }

        if self.stage != Stage::Running && self.preload.animate(dt) {
            self.stage = Stage::Running;
            log::info!("stage → {:?}", self.stage);
        }

        if let Some(world) = self.world.as_mut() {
            world.animate(dt, &mut self.scene, &self.rig, &mut self.dice);
        }
        for cue in self.tweens.update(dt, &mut self.scene) {
            self.dispatch(cue);
        }
        ready
    }

    fn pump(&mut self, fetcher: &mut dyn AssetFetcher) -> bool {
        let ready = self.preloader.pump(fetcher);
        if !self.preload.has_water() && self.preloader.store().has_texture("water") {
            self.preload.set_water(self.preloader.store().texture("water"));
        }
        ready
    }

    /// Assets are in: build the world, start the tunnel exit, the camera
    /// intro and the endless choreographies.
    fn reveal(&mut self) {
        let mut world = World::build(
            &mut self.scene,
            self.preloader.store(),
            &mut self.dice,
            &self.options,
        );
        world
            .flyby
            .launch(&mut self.scene, &mut self.tweens, &mut self.dice);
        world
            .mothership
            .launch_drones(&mut self.scene, &mut self.tweens, &mut self.dice);
        self.world = Some(world);

        self.preload.destroy();
        self.rig.intro(&mut self.tweens);
        self.stage = Stage::Revealing;
        log::info!("stage → {:?}", self.stage);
    }

    fn dispatch(&mut self, cue: Cue) {
        match cue {
            Cue::Camera(CameraCue::Jitter) => {
                self.rig.jitter(&self.scene, &mut self.tweens, &mut self.dice);
            }
            Cue::Flyby(cue) => {
                if let Some(world) = self.world.as_mut() {
                    world
                        .flyby
                        .handle(cue, &mut self.scene, &mut self.tweens, &mut self.dice);
                }
            }
            Cue::Drone(cue) => {
                if let Some(world) = self.world.as_ref() {
                    world
                        .mothership
                        .handle(cue, &mut self.scene, &mut self.tweens, &mut self.dice);
                }
            }
        }
    }

    /// Switch the active viewpoint.
    pub fn select_camera(&mut self, slot: CameraSlot) {
        self.rig.select(slot);
    }

    /// Update every camera's aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.rig.resize(&mut self.scene, width, height);
        self.preload.resize(width, height);
    }

    /// HUD text for a `width`×`height` viewport; empty until running.
    #[must_use]
    pub fn text_blocks(&self, width: u32, height: u32) -> Vec<TextBlock> {
        if self.stage != Stage::Running {
            return Vec::new();
        }
        let size = Vec2::new(width as f32, height as f32);
        self.world.as_ref().map_or_else(Vec::new, |w| {
            w.panels.text_blocks(&self.scene, &self.rig, size)
        })
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Options the show was created with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Fraction of the preload queue completed.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.preloader.progress()
    }

    /// Assets loaded so far.
    #[must_use]
    pub fn store(&self) -> &AssetStore {
        self.preloader.store()
    }

    /// The main scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The main scene's cameras.
    #[must_use]
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// The loading tunnel.
    #[must_use]
    pub fn preload(&self) -> &PreloadEffect {
        &self.preload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetRequest, FetchedAsset};
    use crate::options::SceneOptions;

    /// Answers every request immediately with a failure, so the queue runs
    /// on placeholders.
    #[derive(Default)]
    struct Offline {
        pending: Option<AssetRequest>,
        requests: Vec<String>,
    }

    impl AssetFetcher for Offline {
        fn fetch(&mut self, request: &AssetRequest) {
            self.requests.push(request.name.clone());
            self.pending = Some(request.clone());
        }

        fn poll(&mut self) -> Option<FetchedAsset> {
            self.pending.take().map(|request| FetchedAsset {
                files: Err(crate::assets::AssetError::Fetch {
                    file: request.files.join(","),
                    reason: "offline".to_owned(),
                }),
                request,
            })
        }
    }

    fn options() -> Options {
        Options {
            scene: SceneOptions {
                seed: Some(7),
                asteroid_count: 20,
                star_count: 10,
                star_texture_size: 64,
                ..SceneOptions::default()
            },
            ..Options::default()
        }
    }

    #[test]
    fn stages_advance_in_order() {
        let mut director = Director::new(options(), Manifest::default(), 800, 600);
        let mut fetcher = Offline::default();
        assert_eq!(director.stage(), Stage::Preloading);

        let mut ready_frames = 0;
        let mut seen = vec![director.stage()];
        for _ in 0..600 {
            if director.update(1.0 / 60.0, &mut fetcher) {
                ready_frames += 1;
            }
            if seen.last() != Some(&director.stage()) {
                seen.push(director.stage());
            }
        }
        assert_eq!(ready_frames, 1);
        assert_eq!(seen, vec![Stage::Preloading, Stage::Revealing, Stage::Running]);
        assert_eq!(fetcher.requests.first().map(String::as_str), Some("water"));
        assert!(director.world.is_some());
        assert!(director.preload().is_finished());
    }

    #[test]
    fn hud_text_only_when_running_on_the_bridge() {
        let mut director = Director::new(options(), Manifest::default(), 800, 600);
        let mut fetcher = Offline::default();
        assert!(director.text_blocks(800, 600).is_empty());
        for _ in 0..1200 {
            let _ = director.update(1.0 / 60.0, &mut fetcher);
        }
        assert_eq!(director.stage(), Stage::Running);
        assert_eq!(director.text_blocks(800, 600).len(), 2);
        director.select_camera(CameraSlot::Planet);
        assert!(director.text_blocks(800, 600).is_empty());
    }

    #[test]
    fn intro_restores_the_resting_fov() {
        let mut director = Director::new(options(), Manifest::default(), 800, 600);
        let mut fetcher = Offline::default();
        let bridge = director.rig().node(CameraSlot::Bridge);
        assert_eq!(director.scene().camera(bridge).map(|c| c.fov), Some(200.0));
        for _ in 0..600 {
            let _ = director.update(1.0 / 60.0, &mut fetcher);
        }
        let fov = director.scene().camera(bridge).map_or(0.0, |c| c.fov);
        assert!((fov - 75.0).abs() < 1e-3);
    }
}
