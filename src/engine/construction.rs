//! Engine construction and the per-frame update / render / resize cycle.

use std::path::Path;

use super::{Director, SceneEngine, Stage, TARGET_FPS};
use crate::assets::{AssetFetcher, Manifest};
use crate::error::SceneError;
use crate::gpu::render_context::RenderContext;
use crate::options::Options;
use crate::renderer::{GpuScene, Renderer};
use crate::util::frame_timing::FrameTiming;

/// The manifest named in the options, or the built-in one.
fn load_manifest(options: &Options) -> Result<Manifest, SceneError> {
    match options.scene.manifest.as_deref() {
        Some(path) => {
            log::info!("loading asset manifest from {path}");
            Ok(Manifest::load(Path::new(path))?)
        }
        None => Ok(Manifest::default()),
    }
}

impl SceneEngine {
    /// Create an engine drawing into `context`.
    ///
    /// The preload tunnel starts drawing immediately; assets are requested
    /// from `fetcher` one at a time from the first [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if a shader fails to compose, or
    /// [`SceneError::AssetLoad`] if a custom manifest cannot be read.
    pub fn new(
        context: RenderContext,
        options: Options,
        fetcher: Box<dyn AssetFetcher>,
    ) -> Result<Self, SceneError> {
        let manifest = load_manifest(&options)?;
        let renderer = Renderer::new(&context, &options.post_processing)?;
        let director = Director::new(options, manifest, context.width(), context.height());

        Ok(Self {
            context,
            renderer,
            preload_gpu: GpuScene::new(),
            scene_gpu: GpuScene::new(),
            director,
            fetcher,
            font_loaded: false,
            frame_timing: FrameTiming::new(TARGET_FPS),
        })
    }

    /// Advance the show by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let ready = self.director.update(dt, self.fetcher.as_mut());
        if ready && !self.font_loaded {
            let Some(font) = self.director.store().font() else {
                log::warn!("no HUD font loaded; panel text is hidden");
                return;
            };
            self.renderer.set_font(font.as_ref().clone());
            self.font_loaded = true;
        }
    }

    /// Measure the time since the last frame and advance by it.
    pub fn tick(&mut self) {
        let dt = self.frame_timing.tick();
        self.update(dt);
    }

    /// Draw the current frame: the tunnel until the scene is running,
    /// then the main scene through the active camera with the HUD text.
    ///
    /// # Errors
    ///
    /// Returns the surface error if no swapchain image could be acquired;
    /// callers resize on `Lost` / `Outdated`.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.director.stage() == Stage::Running {
            let text = self
                .director
                .text_blocks(self.context.width(), self.context.height());
            self.renderer.render(
                &self.context,
                &mut self.scene_gpu,
                self.director.scene(),
                self.director.rig().active_node(),
                &text,
            )
        } else {
            let preload = self.director.preload();
            self.renderer.render(
                &self.context,
                &mut self.preload_gpu,
                preload.scene(),
                preload.camera(),
                &[],
            )
        }
    }

    /// Resize the surface, the render targets and every camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.renderer.resize(&self.context);
        self.director.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SceneOptions;

    #[test]
    fn missing_manifest_file_is_an_error() {
        let options = Options {
            scene: SceneOptions {
                manifest: Some("/nonexistent/manifest.toml".to_owned()),
                ..SceneOptions::default()
            },
            ..Options::default()
        };
        assert!(matches!(load_manifest(&options), Err(SceneError::AssetLoad(_))));
    }

    #[test]
    fn default_manifest_without_override() {
        let manifest = load_manifest(&Options::default()).ok();
        assert_eq!(
            manifest.as_ref().map(Manifest::request_count),
            Some(Manifest::default().request_count())
        );
    }
}
