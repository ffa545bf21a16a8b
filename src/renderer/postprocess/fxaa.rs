//! FXAA: smooths jagged silhouettes of the rasterized scene before bloom
//! and output read it.

use wgpu::util::DeviceExt;

use super::screen_pass::{draw_fullscreen, ScreenPass};
use crate::error::SceneError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    screen_bind_group, texture_2d, uniform_buffer,
};
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::HDR_FORMAT;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FxaaParams {
    texel_size: [f32; 2],
    _pad: [f32; 2],
}

impl FxaaParams {
    fn new(width: u32, height: u32) -> Self {
        Self {
            texel_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            _pad: [0.0; 2],
        }
    }
}

/// Screen-space anti-aliasing.
pub struct FxaaPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
}

impl FxaaPass {
    /// Build the pass reading `input` of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if the FXAA shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        input: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("FXAA Bind Group Layout"),
            entries: &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
        });
        let sampler = linear_sampler(device, "FXAA Sampler");
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("FXAA Params"),
            contents: bytemuck::bytes_of(&FxaaParams::new(width, height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = screen_bind_group(
            device,
            "FXAA Bind Group",
            &layout,
            input,
            &sampler,
            Some(&params),
        );
        let shader = shader_composer.compose(
            device,
            "FXAA Shader",
            include_str!("../../../assets/shaders/screen/fxaa.wgsl"),
            "fxaa.wgsl",
        )?;
        let pipeline =
            create_screen_space_pipeline(device, "FXAA", &shader, HDR_FORMAT, None, &[&layout]);

        Ok(Self {
            pipeline,
            layout,
            bind_group,
            sampler,
            params,
        })
    }

    /// Point the pass at a new input after a resize.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        input: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) {
        queue.write_buffer(
            &self.params,
            0,
            bytemuck::bytes_of(&FxaaParams::new(width, height)),
        );
        self.bind_group = screen_bind_group(
            device,
            "FXAA Bind Group",
            &self.layout,
            input,
            &self.sampler,
            Some(&self.params),
        );
    }
}

impl ScreenPass for FxaaPass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        draw_fullscreen(encoder, "FXAA Pass", target, &self.pipeline, &self.bind_group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_size_is_reciprocal() {
        let p = FxaaParams::new(800, 400);
        assert_eq!(p.texel_size, [1.0 / 800.0, 1.0 / 400.0]);
        assert_eq!(size_of::<FxaaParams>(), 16);
    }
}
