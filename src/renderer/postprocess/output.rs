//! Final pass: scene plus bloom, exposure, and gamma when the swapchain
//! does not encode sRGB itself.

use wgpu::util::DeviceExt;

use super::screen_pass::{draw_fullscreen, ScreenPass};
use crate::error::SceneError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler, texture_2d,
    uniform_buffer,
};
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::PostProcessingOptions;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct OutputParams {
    exposure: f32,
    apply_gamma: f32,
    bloom_enabled: f32,
    _pad: f32,
}

impl OutputParams {
    fn new(options: &PostProcessingOptions, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            exposure: options.exposure,
            apply_gamma: if surface_format.is_srgb() { 0.0 } else { 1.0 },
            bloom_enabled: if options.bloom_strength > 0.0 { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

/// Final pass into the swapchain.
pub struct OutputPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
    surface_format: wgpu::TextureFormat,
}

impl OutputPass {
    /// Build the pass writing `surface_format`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if the output shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        surface_format: wgpu::TextureFormat,
        scene: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
        options: &PostProcessingOptions,
    ) -> Result<Self, SceneError> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Output Layout"),
            entries: &[
                texture_2d(0),
                filtering_sampler(1),
                uniform_buffer(2),
                texture_2d(3),
            ],
        });
        let sampler = linear_sampler(device, "Output Sampler");
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Output Params"),
            contents: bytemuck::bytes_of(&OutputParams::new(options, surface_format)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = create_bind_group(device, &layout, scene, &sampler, &params, bloom);
        let shader = shader_composer.compose(
            device,
            "Output Shader",
            include_str!("../../../assets/shaders/screen/output.wgsl"),
            "output.wgsl",
        )?;
        let pipeline =
            create_screen_space_pipeline(device, "Output", &shader, surface_format, None, &[&layout]);
        log::debug!(
            "output pass targets {surface_format:?}, shader gamma {}",
            !surface_format.is_srgb()
        );

        Ok(Self {
            pipeline,
            layout,
            bind_group,
            sampler,
            params,
            surface_format,
        })
    }

    /// Upload exposure and the bloom switch.
    pub fn set_params(&self, queue: &wgpu::Queue, options: &PostProcessingOptions) {
        queue.write_buffer(
            &self.params,
            0,
            bytemuck::bytes_of(&OutputParams::new(options, self.surface_format)),
        );
    }

    /// Point the pass at new inputs.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        scene: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
    ) {
        self.bind_group =
            create_bind_group(device, &self.layout, scene, &self.sampler, &self.params, bloom);
    }
}

impl ScreenPass for OutputPass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        draw_fullscreen(encoder, "Output Pass", target, &self.pipeline, &self.bind_group);
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
    bloom: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Output Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(scene),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(bloom),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_only_for_linear_surfaces() {
        let options = PostProcessingOptions::default();
        let srgb = OutputParams::new(&options, wgpu::TextureFormat::Bgra8UnormSrgb);
        let linear = OutputParams::new(&options, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(srgb.apply_gamma, 0.0);
        assert_eq!(linear.apply_gamma, 1.0);
        assert_eq!(srgb.exposure, 1.0);
    }

    #[test]
    fn zero_strength_disables_bloom() {
        let options = PostProcessingOptions {
            bloom_strength: 0.0,
            ..Default::default()
        };
        let params = OutputParams::new(&options, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(params.bloom_enabled, 0.0);
    }
}
