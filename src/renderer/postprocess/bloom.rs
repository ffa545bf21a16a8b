//! Bloom: bright-pass extraction, a five-level separable gaussian chain and
//! a weighted composite of the blurred levels.
//!
//! ```text
//! scene ─threshold─▶ bright (½) ─H─▶ h0 ─V─▶ v0 ─H─▶ h1 ─V─▶ v1 … v4
//!                                            │              │       │
//!                                            └──── composite ◀──────┘
//! ```
//!
//! Each level is half the size of the previous one and uses a wider kernel.
//! The output pass adds the composite to the scene.

use wgpu::util::DeviceExt;

use super::screen_pass::draw_fullscreen;
use crate::error::SceneError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    screen_bind_group, texture_2d, uniform_buffer,
};
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{RenderTarget, HDR_FORMAT};
use crate::options::PostProcessingOptions;

/// Number of blur levels.
pub const LEVELS: usize = 5;

/// Gaussian radius per level.
pub const KERNEL_RADII: [u32; LEVELS] = [3, 5, 7, 9, 11];

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ThresholdParams {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurParams {
    texel_size: [f32; 2],
    direction: [f32; 2],
    kernel_radius: u32,
    _pad: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeParams {
    strength: f32,
    radius: f32,
    _pad: [f32; 2],
}

const HORIZONTAL: [f32; 2] = [1.0, 0.0];
const VERTICAL: [f32; 2] = [0.0, 1.0];

/// Size of blur level `level` for a `width`×`height` frame.
#[must_use]
pub fn level_size(width: u32, height: u32, level: usize) -> (u32, u32) {
    (
        ((width / 2) >> level).max(1),
        ((height / 2) >> level).max(1),
    )
}

fn blur_params(level: usize, direction: [f32; 2], width: u32, height: u32) -> BlurParams {
    let (w, h) = level_size(width, height, level);
    BlurParams {
        texel_size: [1.0 / w as f32, 1.0 / h as f32],
        direction,
        kernel_radius: KERNEL_RADII[level],
        _pad: [0; 3],
    }
}

struct Targets {
    bright: RenderTarget,
    horizontal: Vec<RenderTarget>,
    vertical: Vec<RenderTarget>,
    output: RenderTarget,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (bw, bh) = level_size(width, height, 0);
        let level = |prefix: &str, i: usize| {
            let (w, h) = level_size(width, height, i);
            RenderTarget::new(device, &format!("Bloom {prefix} {i}"), w, h, HDR_FORMAT)
        };
        Self {
            bright: RenderTarget::new(device, "Bloom Bright", bw, bh, HDR_FORMAT),
            horizontal: (0..LEVELS).map(|i| level("Horizontal", i)).collect(),
            vertical: (0..LEVELS).map(|i| level("Vertical", i)).collect(),
            output: RenderTarget::new(device, "Bloom Output", bw, bh, HDR_FORMAT),
        }
    }
}

/// Threshold, mip blur chain and weighted composite of bright areas.
pub struct BloomPass {
    threshold_pipeline: wgpu::RenderPipeline,
    threshold_layout: wgpu::BindGroupLayout,
    threshold_buffer: wgpu::Buffer,
    threshold_bind_group: wgpu::BindGroup,

    blur_pipeline: wgpu::RenderPipeline,
    blur_layout: wgpu::BindGroupLayout,
    // [level][0 = horizontal, 1 = vertical]
    blur_buffers: Vec<[wgpu::Buffer; 2]>,
    blur_bind_groups: Vec<[wgpu::BindGroup; 2]>,

    composite_pipeline: wgpu::RenderPipeline,
    composite_layout: wgpu::BindGroupLayout,
    composite_buffer: wgpu::Buffer,
    composite_bind_group: wgpu::BindGroup,

    sampler: wgpu::Sampler,
    targets: Targets,
}

impl BloomPass {
    /// Build the chain for a `width`×`height` frame read from `input`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Shader`] if a bloom shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        input: &wgpu::TextureView,
        width: u32,
        height: u32,
        options: &PostProcessingOptions,
    ) -> Result<Self, SceneError> {
        let sampler = linear_sampler(device, "Bloom Sampler");
        let targets = Targets::new(device, width, height);

        // ── Threshold ──────────────────────────────────────────────────
        let threshold_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Threshold Layout"),
                entries: &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
            });
        let threshold_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Threshold Params"),
            contents: bytemuck::bytes_of(&ThresholdParams {
                threshold: options.bloom_threshold,
                smooth_width: options.bloom_smooth_width,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let threshold_bind_group = screen_bind_group(
            device,
            "Bloom Threshold BG",
            &threshold_layout,
            input,
            &sampler,
            Some(&threshold_buffer),
        );
        let threshold_shader = shader_composer.compose(
            device,
            "Bloom Threshold Shader",
            include_str!("../../../assets/shaders/screen/bloom_threshold.wgsl"),
            "bloom_threshold.wgsl",
        )?;
        let threshold_pipeline = create_screen_space_pipeline(
            device,
            "Bloom Threshold",
            &threshold_shader,
            HDR_FORMAT,
            None,
            &[&threshold_layout],
        );

        // ── Blur ───────────────────────────────────────────────────────
        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Blur Layout"),
            entries: &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
        });
        let blur_buffers: Vec<[wgpu::Buffer; 2]> = (0..LEVELS)
            .map(|i| {
                [HORIZONTAL, VERTICAL].map(|dir| {
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Bloom Blur Params {i}")),
                        contents: bytemuck::bytes_of(&blur_params(i, dir, width, height)),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    })
                })
            })
            .collect();
        let blur_bind_groups =
            create_blur_bind_groups(device, &blur_layout, &sampler, &targets, &blur_buffers);
        let blur_shader = shader_composer.compose(
            device,
            "Bloom Blur Shader",
            include_str!("../../../assets/shaders/screen/bloom_blur.wgsl"),
            "bloom_blur.wgsl",
        )?;
        let blur_pipeline = create_screen_space_pipeline(
            device,
            "Bloom Blur",
            &blur_shader,
            HDR_FORMAT,
            None,
            &[&blur_layout],
        );

        // ── Composite ──────────────────────────────────────────────────
        let mut entries: Vec<_> = (0..LEVELS as u32).map(texture_2d).collect();
        entries.push(filtering_sampler(LEVELS as u32));
        entries.push(uniform_buffer(LEVELS as u32 + 1));
        let composite_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Composite Layout"),
                entries: &entries,
            });
        let composite_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Composite Params"),
            contents: bytemuck::bytes_of(&CompositeParams {
                strength: options.bloom_strength,
                radius: options.bloom_radius,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let composite_bind_group = create_composite_bind_group(
            device,
            &composite_layout,
            &sampler,
            &targets,
            &composite_buffer,
        );
        let composite_shader = shader_composer.compose(
            device,
            "Bloom Composite Shader",
            include_str!("../../../assets/shaders/screen/bloom_composite.wgsl"),
            "bloom_composite.wgsl",
        )?;
        let composite_pipeline = create_screen_space_pipeline(
            device,
            "Bloom Composite",
            &composite_shader,
            HDR_FORMAT,
            None,
            &[&composite_layout],
        );

        Ok(Self {
            threshold_pipeline,
            threshold_layout,
            threshold_buffer,
            threshold_bind_group,
            blur_pipeline,
            blur_layout,
            blur_buffers,
            blur_bind_groups,
            composite_pipeline,
            composite_layout,
            composite_buffer,
            composite_bind_group,
            sampler,
            targets,
        })
    }

    /// Blurred bright regions at half resolution.
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.targets.output.view
    }

    /// Upload threshold, strength and radius.
    pub fn set_params(&self, queue: &wgpu::Queue, options: &PostProcessingOptions) {
        queue.write_buffer(
            &self.threshold_buffer,
            0,
            bytemuck::bytes_of(&ThresholdParams {
                threshold: options.bloom_threshold,
                smooth_width: options.bloom_smooth_width,
                _pad: [0.0; 2],
            }),
        );
        queue.write_buffer(
            &self.composite_buffer,
            0,
            bytemuck::bytes_of(&CompositeParams {
                strength: options.bloom_strength,
                radius: options.bloom_radius,
                _pad: [0.0; 2],
            }),
        );
    }

    /// Recreate the chain for a new frame size or input.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        input: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) {
        self.targets = Targets::new(device, width, height);
        for (i, pair) in self.blur_buffers.iter().enumerate() {
            for (buffer, dir) in pair.iter().zip([HORIZONTAL, VERTICAL]) {
                queue.write_buffer(
                    buffer,
                    0,
                    bytemuck::bytes_of(&blur_params(i, dir, width, height)),
                );
            }
        }
        self.threshold_bind_group = screen_bind_group(
            device,
            "Bloom Threshold BG",
            &self.threshold_layout,
            input,
            &self.sampler,
            Some(&self.threshold_buffer),
        );
        self.blur_bind_groups = create_blur_bind_groups(
            device,
            &self.blur_layout,
            &self.sampler,
            &self.targets,
            &self.blur_buffers,
        );
        self.composite_bind_group = create_composite_bind_group(
            device,
            &self.composite_layout,
            &self.sampler,
            &self.targets,
            &self.composite_buffer,
        );
    }

    /// Encode threshold, blur chain and composite.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        draw_fullscreen(
            encoder,
            "Bloom Threshold",
            &self.targets.bright.view,
            &self.threshold_pipeline,
            &self.threshold_bind_group,
        );
        for (i, [h, v]) in self.blur_bind_groups.iter().enumerate() {
            draw_fullscreen(
                encoder,
                "Bloom Blur H",
                &self.targets.horizontal[i].view,
                &self.blur_pipeline,
                h,
            );
            draw_fullscreen(
                encoder,
                "Bloom Blur V",
                &self.targets.vertical[i].view,
                &self.blur_pipeline,
                v,
            );
        }
        draw_fullscreen(
            encoder,
            "Bloom Composite",
            &self.targets.output.view,
            &self.composite_pipeline,
            &self.composite_bind_group,
        );
    }
}

fn create_blur_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &Targets,
    buffers: &[[wgpu::Buffer; 2]],
) -> Vec<[wgpu::BindGroup; 2]> {
    (0..LEVELS)
        .map(|i| {
            let source = if i == 0 {
                &targets.bright.view
            } else {
                &targets.vertical[i - 1].view
            };
            [
                screen_bind_group(
                    device,
                    &format!("Bloom Blur H BG {i}"),
                    layout,
                    source,
                    sampler,
                    Some(&buffers[i][0]),
                ),
                screen_bind_group(
                    device,
                    &format!("Bloom Blur V BG {i}"),
                    layout,
                    &targets.horizontal[i].view,
                    sampler,
                    Some(&buffers[i][1]),
                ),
            ]
        })
        .collect()
}

fn create_composite_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &Targets,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    let mut entries: Vec<wgpu::BindGroupEntry<'_>> = targets
        .vertical
        .iter()
        .enumerate()
        .map(|(i, target)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(&target.view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: LEVELS as u32,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    entries.push(wgpu::BindGroupEntry {
        binding: LEVELS as u32 + 1,
        resource: params.as_entire_binding(),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Composite BG"),
        layout,
        entries: &entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_halve_from_half_resolution() {
        assert_eq!(level_size(1920, 1080, 0), (960, 540));
        assert_eq!(level_size(1920, 1080, 1), (480, 270));
        assert_eq!(level_size(1920, 1080, 4), (60, 33));
        assert_eq!(level_size(3, 3, 4), (1, 1));
    }

    #[test]
    fn blur_kernel_widens_per_level() {
        let first = blur_params(0, HORIZONTAL, 800, 600);
        let last = blur_params(LEVELS - 1, VERTICAL, 800, 600);
        assert_eq!(first.kernel_radius, 3);
        assert_eq!(last.kernel_radius, 11);
        assert_eq!(first.texel_size, [1.0 / 400.0, 1.0 / 300.0]);
        assert_eq!(last.direction, VERTICAL);
        assert_eq!(size_of::<BlurParams>(), 32);
    }
}
