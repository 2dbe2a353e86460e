//! Bloom pass: extracts bright pixels from the bloom-scene render and
//! spreads them into a soft glow.
//!
//! Pipeline: luminosity high pass at half resolution, then `MIP_LEVELS`
//! levels of separable Gaussian blur (each level half the size of the one
//! before, each with a wider kernel), then a composite that adds the
//! weighted levels on top of the bloom-scene color. The composite writes
//! the bloom intermediate read by the blend shader.

use crate::error::HaloError;
use crate::gpu::pipeline_helpers::{
    bind_group_layout, create_screen_space_pipeline, filtering_sampler,
    linear_sampler, texture_2d, uniform_buffer, uniform_init,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{RenderTarget, HDR_FORMAT};
use crate::options::BloomOptions;

use super::screen_pass::{fullscreen_pass, ScreenPass};

/// Number of blur levels in the chain.
pub const MIP_LEVELS: usize = 5;

/// Gaussian kernel radius per level. Sigma equals the radius.
pub const KERNEL_RADII: [u32; MIP_LEVELS] = [3, 5, 7, 9, 11];

/// Base contribution of each level before the radius blend.
pub const BLOOM_FACTORS: [f32; MIP_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Threshold params. Must match `ThresholdParams` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct ThresholdParams {
    threshold: f32,
    smooth_width: f32,
    _pad0: f32,
    _pad1: f32,
}

/// One blur direction at one level. Must match `BlurParams` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurParams {
    texel_size: [f32; 2],
    direction: [f32; 2],
    kernel_radius: u32,
    _pad: [u32; 3],
    weights: [[f32; 4]; 3],
}

/// Level weights. Must match `CompositeParams` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeParams {
    weights: [[f32; 4]; 2],
}

/// Half-sized Gaussian kernel for `radius` taps: tap 0 is the center, taps
/// `1..radius` are applied on both sides. Normalized so the full kernel
/// sums to one.
#[must_use]
pub fn gaussian_weights(radius: u32) -> Vec<f32> {
    let sigma = radius as f32;
    let mut weights: Vec<f32> = (0..radius)
        .map(|i| {
            let x = i as f32;
            0.398_94 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
        })
        .collect();
    let total = weights.first().copied().unwrap_or(0.0)
        + 2.0 * weights.iter().skip(1).sum::<f32>();
    if total > 0.0 {
        for w in &mut weights {
            *w /= total;
        }
    }
    weights
}

/// Per-level composite weight: `strength * lerp(f, 1.2 - f, radius)`.
#[must_use]
pub fn level_weights(strength: f32, radius: f32) -> [f32; MIP_LEVELS] {
    BLOOM_FACTORS.map(|f| strength * (f + (1.2 - 2.0 * f) * radius))
}

/// Size of blur level `level` for a `width x height` input. Level 0 is half
/// resolution; each next level halves again, rounding halves up.
#[must_use]
pub fn level_size(width: u32, height: u32, level: usize) -> (u32, u32) {
    let mut size = (width.max(1), height.max(1));
    for _ in 0..=level {
        size = (size.0.div_ceil(2).max(1), size.1.div_ceil(2).max(1));
    }
    size
}

fn blur_params(
    size: (u32, u32),
    radius: u32,
    direction: [f32; 2],
) -> BlurParams {
    let mut weights = [[0.0; 4]; 3];
    for (i, w) in gaussian_weights(radius).into_iter().enumerate().take(12) {
        weights[i / 4][i % 4] = w;
    }
    BlurParams {
        texel_size: [1.0 / size.0 as f32, 1.0 / size.1 as f32],
        direction,
        kernel_radius: radius,
        _pad: [0; 3],
        weights,
    }
}

fn composite_params(options: &BloomOptions) -> CompositeParams {
    let w = level_weights(options.strength, options.radius);
    CompositeParams {
        weights: [[w[0], w[1], w[2], w[3]], [w[4], 0.0, 0.0, 0.0]],
    }
}

/// Size-independent resources the chain binds against.
struct Shared {
    threshold_layout: wgpu::BindGroupLayout,
    threshold_buffer: wgpu::Buffer,
    blur_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    composite_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

/// Textures and bind groups that depend on the input size.
struct BlurChain {
    bright: RenderTarget,
    /// Vertical pass output per level; read by the next level and the
    /// composite.
    mips: Vec<RenderTarget>,
    /// Horizontal pass output per level.
    pings: Vec<RenderTarget>,
    /// `[level][0 = horizontal, 1 = vertical]`
    bind_groups: Vec<[wgpu::BindGroup; 2]>,
    threshold_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
}

impl BlurChain {
    fn new(
        device: &wgpu::Device,
        shared: &Shared,
        input: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        let (bw, bh) = level_size(width, height, 0);
        let bright = RenderTarget::hdr(device, "Bloom Bright", bw, bh);

        let mut mips = Vec::with_capacity(MIP_LEVELS);
        let mut pings = Vec::with_capacity(MIP_LEVELS);
        for level in 0..MIP_LEVELS {
            let (w, h) = level_size(width, height, level);
            mips.push(RenderTarget::hdr(
                device,
                &format!("Bloom Mip {level}"),
                w,
                h,
            ));
            pings.push(RenderTarget::hdr(
                device,
                &format!("Bloom Ping {level}"),
                w,
                h,
            ));
        }

        let bind_groups = (0..MIP_LEVELS)
            .map(|level| {
                let size = level_size(width, height, level);
                let radius = KERNEL_RADII[level];
                let source = if level == 0 {
                    &bright.view
                } else {
                    &mips[level - 1].view
                };
                [
                    blur_bind_group(
                        device,
                        shared,
                        source,
                        &blur_params(size, radius, [1.0, 0.0]),
                        level,
                        "H",
                    ),
                    blur_bind_group(
                        device,
                        shared,
                        &pings[level].view,
                        &blur_params(size, radius, [0.0, 1.0]),
                        level,
                        "V",
                    ),
                ]
            })
            .collect();

        let threshold_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Bloom Threshold Bind Group"),
                layout: &shared.threshold_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(input),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(
                            &shared.sampler,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: shared.threshold_buffer.as_entire_binding(),
                    },
                ],
            });

        let mut composite_entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(input),
        }];
        composite_entries.extend(mips.iter().enumerate().map(|(i, mip)| {
            wgpu::BindGroupEntry {
                binding: i as u32 + 1,
                resource: wgpu::BindingResource::TextureView(&mip.view),
            }
        }));
        composite_entries.push(wgpu::BindGroupEntry {
            binding: MIP_LEVELS as u32 + 1,
            resource: wgpu::BindingResource::Sampler(&shared.sampler),
        });
        composite_entries.push(wgpu::BindGroupEntry {
            binding: MIP_LEVELS as u32 + 2,
            resource: shared.composite_buffer.as_entire_binding(),
        });
        let composite_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Bloom Composite Bind Group"),
                layout: &shared.composite_layout,
                entries: &composite_entries,
            });

        Self {
            bright,
            mips,
            pings,
            bind_groups,
            threshold_bind_group,
            composite_bind_group,
        }
    }
}

fn blur_bind_group(
    device: &wgpu::Device,
    shared: &Shared,
    source: &wgpu::TextureView,
    params: &BlurParams,
    level: usize,
    direction: &str,
) -> wgpu::BindGroup {
    let buffer = uniform_init(
        device,
        &format!("Bloom Blur {direction}{level} Params"),
        params,
    );
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("Bloom Blur {direction}{level} Bind Group")),
        layout: &shared.blur_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(source),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&shared.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            },
        ],
    })
}

/// Selective-bloom post-process.
pub struct BloomPass {
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    shared: Shared,
    input: wgpu::TextureView,
    chain: BlurChain,
    width: u32,
    height: u32,
}

impl BloomPass {
    /// Build the pass reading `input` (the bloom-scene HDR color).
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Shader`] if a bloom shader fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        input: &wgpu::TextureView,
        options: &BloomOptions,
    ) -> Result<Self, HaloError> {
        let device = &context.device;
        let sampler = linear_sampler(device, "Bloom Sampler");

        let threshold_layout = bind_group_layout(
            device,
            "Bloom Threshold Layout",
            &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
        );
        let threshold_shader = composer.compose(
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
            &[&threshold_layout],
        );
        let threshold_buffer = uniform_init(
            device,
            "Bloom Threshold Params",
            &ThresholdParams {
                threshold: options.threshold,
                smooth_width: options.smooth_width,
                _pad0: 0.0,
                _pad1: 0.0,
            },
        );

        let blur_layout = bind_group_layout(
            device,
            "Bloom Blur Layout",
            &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
        );
        let blur_shader = composer.compose(
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
            &[&blur_layout],
        );

        let mut composite_entries = vec![texture_2d(0)];
        composite_entries.extend((1..=MIP_LEVELS as u32).map(texture_2d));
        composite_entries.push(filtering_sampler(MIP_LEVELS as u32 + 1));
        composite_entries.push(uniform_buffer(MIP_LEVELS as u32 + 2));
        let composite_layout = bind_group_layout(
            device,
            "Bloom Composite Layout",
            &composite_entries,
        );
        let composite_shader = composer.compose(
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
            &[&composite_layout],
        );
        let composite_buffer = uniform_init(
            device,
            "Bloom Composite Params",
            &composite_params(options),
        );

        let shared = Shared {
            threshold_layout,
            threshold_buffer,
            blur_layout,
            composite_layout,
            composite_buffer,
            sampler,
        };
        let (width, height) = (context.width(), context.height());
        let chain = BlurChain::new(device, &shared, input, width, height);
        Ok(Self {
            threshold_pipeline,
            blur_pipeline,
            composite_pipeline,
            shared,
            input: input.clone(),
            chain,
            width,
            height,
        })
    }

    /// Point the pass at a new bloom-scene view. Takes effect at the next
    /// [`resize`](ScreenPass::resize).
    pub fn set_input(&mut self, input: &wgpu::TextureView) {
        self.input = input.clone();
    }

    /// Upload new threshold, strength, and radius values.
    pub fn update_params(&self, queue: &wgpu::Queue, options: &BloomOptions) {
        queue.write_buffer(
            &self.shared.threshold_buffer,
            0,
            bytemuck::bytes_of(&ThresholdParams {
                threshold: options.threshold,
                smooth_width: options.smooth_width,
                _pad0: 0.0,
                _pad1: 0.0,
            }),
        );
        queue.write_buffer(
            &self.shared.composite_buffer,
            0,
            bytemuck::bytes_of(&composite_params(options)),
        );
    }

    /// Input size the blur chain was built for.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl ScreenPass for BloomPass {
    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        fullscreen_pass(
            encoder,
            "Bloom Threshold",
            &self.chain.bright.view,
            &self.threshold_pipeline,
            &self.chain.threshold_bind_group,
        );
        for (level, [horizontal, vertical]) in
            self.chain.bind_groups.iter().enumerate()
        {
            fullscreen_pass(
                encoder,
                "Bloom Blur H",
                &self.chain.pings[level].view,
                &self.blur_pipeline,
                horizontal,
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur V",
                &self.chain.mips[level].view,
                &self.blur_pipeline,
                vertical,
            );
        }
        fullscreen_pass(
            encoder,
            "Bloom Composite",
            target,
            &self.composite_pipeline,
            &self.chain.composite_bind_group,
        );
    }

    fn resize(&mut self, context: &RenderContext) {
        let (width, height) = (context.width(), context.height());
        self.chain = BlurChain::new(
            &context.device,
            &self.shared,
            &self.input,
            width,
            height,
        );
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_sums_to_one() {
        for radius in KERNEL_RADII {
            let w = gaussian_weights(radius);
            assert_eq!(w.len(), radius as usize);
            let total = w[0] + 2.0 * w[1..].iter().sum::<f32>();
            assert!((total - 1.0).abs() < 1e-5, "radius {radius}: {total}");
            assert!(w.windows(2).all(|p| p[0] > p[1]));
        }
    }

    #[test]
    fn widest_kernel_fits_params() {
        let p = blur_params((100, 50), 11, [0.0, 1.0]);
        assert_eq!(size_of::<BlurParams>(), 80);
        assert_eq!(p.texel_size, [0.01, 0.02]);
        assert_eq!(p.weights[2][2], gaussian_weights(11)[10]);
        assert_eq!(p.weights[2][3], 0.0);
    }

    #[test]
    fn radius_blends_level_factors() {
        assert_eq!(level_weights(1.0, 0.0), BLOOM_FACTORS);
        let full = level_weights(1.0, 1.0);
        for (w, f) in full.iter().zip(BLOOM_FACTORS) {
            assert!((w - (1.2 - f)).abs() < 1e-6);
        }
        let half = level_weights(2.0, 0.5);
        assert!(half.iter().all(|w| (w - 1.2).abs() < 1e-6));
    }

    #[test]
    fn zero_strength_disables_glow() {
        assert_eq!(level_weights(0.0, 0.5), [0.0; MIP_LEVELS]);
    }

    #[test]
    fn levels_halve_and_never_vanish() {
        assert_eq!(level_size(800, 600, 0), (400, 300));
        assert_eq!(level_size(800, 600, 1), (200, 150));
        assert_eq!(level_size(801, 601, 0), (401, 301));
        assert_eq!(level_size(800, 600, 4), (25, 19));
        assert_eq!(level_size(3, 1, 4), (1, 1));
    }
}
