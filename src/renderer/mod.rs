//! Frame rendering: scene meshes into an HDR target, the post chain onto
//! the swapchain, then HUD text on top.

pub mod gpu_scene;
pub mod lights;
pub mod mesh_pass;
pub mod postprocess;
pub mod text;

use crate::error::SceneError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::PostProcessingOptions;
use crate::scene::{NodeId, Scene};

pub use gpu_scene::GpuScene;
pub use mesh_pass::MeshPass;
pub use postprocess::Composer;
pub use text::{TextBlock, TextLayer};

/// Owns every pipeline; scenes bring their own [`GpuScene`] mirror.
pub struct Renderer {
    mesh_pass: MeshPass,
    composer: Composer,
    text: TextLayer,
}

impl Renderer {
    /// Compose shaders and build passes for the context's surface.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if any shader fails to compose.
    pub fn new(
        context: &RenderContext,
        options: &PostProcessingOptions,
    ) -> Result<Self, SceneError> {
        let mut shader_composer = ShaderComposer::new()?;
        let mesh_pass = MeshPass::new(&context.device, &context.queue, &mut shader_composer)?;
        let composer = Composer::new(
            &context.device,
            &mut shader_composer,
            context.format(),
            context.width(),
            context.height(),
            options,
        )?;
        let text = TextLayer::new(&context.device, &context.queue, context.format());
        log::info!(
            "renderer ready: {}x{} {:?}",
            context.width(),
            context.height(),
            context.format()
        );
        Ok(Self {
            mesh_pass,
            composer,
            text,
        })
    }

    /// Rebuild resolution-dependent targets after the surface changed.
    pub fn resize(&mut self, context: &RenderContext) {
        self.composer
            .resize(&context.device, &context.queue, context.width(), context.height());
    }

    /// Apply new post-processing parameters.
    pub fn set_post_processing(&mut self, context: &RenderContext, options: &PostProcessingOptions) {
        self.composer
            .set_options(&context.device, &context.queue, options);
    }

    /// Font for HUD text.
    pub fn set_font(&mut self, bytes: Vec<u8>) {
        self.text.set_font(bytes);
    }

    /// Render `scene` through `camera`, post-process it and overlay
    /// `text`, then present.
    ///
    /// # Errors
    ///
    /// Returns the surface error if no swapchain image could be acquired.
    pub fn render(
        &mut self,
        context: &RenderContext,
        gpu: &mut GpuScene,
        scene: &Scene,
        camera: NodeId,
        text: &[TextBlock],
    ) -> Result<(), wgpu::SurfaceError> {
        let device = &context.device;
        let queue = &context.queue;

        gpu.sync(device, queue, &self.mesh_pass, scene);
        let list = self.mesh_pass.prepare(device, queue, scene, gpu, camera);

        let frame = context.get_next_frame()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = context.create_encoder();

        {
            let [r, g, b] = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.composer.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.composer.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.mesh_pass.draw(&mut pass, gpu, &list);
        }

        self.composer.render(&mut encoder, &surface_view);

        if !text.is_empty() {
            self.text
                .prepare(device, queue, context.width(), context.height(), text);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HUD Text Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            self.text.render(&mut pass);
        }

        context.submit(encoder);
        frame.present();
        self.text.trim();
        Ok(())
    }
}
