//! Owns the offscreen targets and runs render → FXAA → bloom → output.

use super::bloom::BloomPass;
use super::fxaa::FxaaPass;
use super::output::OutputPass;
use super::screen_pass::ScreenPass;
use crate::error::SceneError;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{RenderTarget, DEPTH_FORMAT, HDR_FORMAT};
use crate::options::PostProcessingOptions;

/// The image bloom and output read: anti-aliased when FXAA is on.
fn resolved<'a>(fxaa: bool, hdr: &'a RenderTarget, aa: &'a RenderTarget) -> &'a wgpu::TextureView {
    if fxaa {
        &aa.view
    } else {
        &hdr.view
    }
}

/// Owns the offscreen targets and runs FXAA, bloom and the output pass
/// over a rendered HDR frame.
pub struct Composer {
    hdr: RenderTarget,
    depth: RenderTarget,
    aa: RenderTarget,
    fxaa_pass: FxaaPass,
    bloom_pass: BloomPass,
    output_pass: OutputPass,
    options: PostProcessingOptions,
}

impl Composer {
    /// Build every target and pass for a `width`×`height` surface.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if a post-processing shader fails to
    /// compose.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        options: &PostProcessingOptions,
    ) -> Result<Self, SceneError> {
        let hdr = RenderTarget::new(device, "Scene HDR", width, height, HDR_FORMAT);
        let depth = RenderTarget::new(device, "Scene Depth", width, height, DEPTH_FORMAT);
        let aa = RenderTarget::new(device, "FXAA Output", width, height, HDR_FORMAT);

        let fxaa_pass = FxaaPass::new(device, shader_composer, &hdr.view, width, height)?;
        let source = resolved(options.fxaa, &hdr, &aa);
        let bloom_pass =
            BloomPass::new(device, shader_composer, source, width, height, options)?;
        let output_pass = OutputPass::new(
            device,
            shader_composer,
            surface_format,
            source,
            bloom_pass.output_view(),
            options,
        )?;

        Ok(Self {
            hdr,
            depth,
            aa,
            fxaa_pass,
            bloom_pass,
            output_pass,
            options: options.clone(),
        })
    }

    /// Color target the scene is rasterized into.
    #[must_use]
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.hdr.view
    }

    /// Depth target paired with [`scene_view`](Self::scene_view).
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    /// Current parameters.
    #[must_use]
    pub fn options(&self) -> &PostProcessingOptions {
        &self.options
    }

    /// Apply new parameters; toggling FXAA rewires bloom and output.
    pub fn set_options(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        options: &PostProcessingOptions,
    ) {
        let rewire = options.fxaa != self.options.fxaa;
        self.options = options.clone();
        self.bloom_pass.set_params(queue, options);
        self.output_pass.set_params(queue, options);
        if rewire {
            self.rebind(device, queue);
        }
    }

    /// Recreate targets for a new surface size.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) {
        if width == 0 || height == 0 || (width == self.hdr.width && height == self.hdr.height) {
            return;
        }
        self.hdr = RenderTarget::new(device, "Scene HDR", width, height, HDR_FORMAT);
        self.depth = RenderTarget::new(device, "Scene Depth", width, height, DEPTH_FORMAT);
        self.aa = RenderTarget::new(device, "FXAA Output", width, height, HDR_FORMAT);
        self.fxaa_pass
            .rebind(device, queue, &self.hdr.view, width, height);
        self.rebind(device, queue);
    }

    fn rebind(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let (width, height) = (self.hdr.width, self.hdr.height);
        let source = resolved(self.options.fxaa, &self.hdr, &self.aa);
        self.bloom_pass.resize(device, queue, source, width, height);
        self.output_pass
            .rebind(device, source, self.bloom_pass.output_view());
    }

    /// Run the post chain on the rendered scene and write `surface_view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        if self.options.fxaa {
            self.fxaa_pass.render(encoder, &self.aa.view);
        }
        self.bloom_pass.render(encoder);
        self.output_pass.render(encoder, surface_view);
    }
}
