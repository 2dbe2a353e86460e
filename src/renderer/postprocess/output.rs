//! Final pass: exposure and ACES filmic tone mapping into the swapchain (or
//! headless) format. Encodes sRGB in the shader only when the target format
//! does not do it in hardware.

use crate::error::HaloError;
use crate::gpu::pipeline_helpers::{
    bind_group_layout, create_screen_space_pipeline, filtering_sampler,
    linear_sampler, texture_2d, uniform_buffer, uniform_init,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;

use super::screen_pass::{fullscreen_pass, ScreenPass};

/// Must match `OutputParams` in `output.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct OutputParams {
    exposure: f32,
    encode_srgb: u32,
    _pad0: f32,
    _pad1: f32,
}

impl OutputParams {
    fn new(exposure: f32, format: wgpu::TextureFormat) -> Self {
        Self {
            exposure,
            encode_srgb: u32::from(!format.is_srgb()),
            _pad0: 0.0,
            _pad1: 0.0,
        }
    }
}

/// Tone-mapping output pass.
pub struct OutputPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    input: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    format: wgpu::TextureFormat,
}

impl OutputPass {
    /// Build the pass reading the blended HDR `input`.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Shader`] if `output.wgsl` fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        input: &wgpu::TextureView,
        exposure: f32,
    ) -> Result<Self, HaloError> {
        let device = &context.device;
        let format = context.format();
        let layout = bind_group_layout(
            device,
            "Output Layout",
            &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
        );
        let shader = composer.compose(
            device,
            "Output Shader",
            include_str!("../../../assets/shaders/screen/output.wgsl"),
            "output.wgsl",
        )?;
        let pipeline = create_screen_space_pipeline(
            device,
            "Output",
            &shader,
            format,
            &[&layout],
        );
        let sampler = linear_sampler(device, "Output Sampler");
        let params_buffer = uniform_init(
            device,
            "Output Params",
            &OutputParams::new(exposure, format),
        );
        let bind_group = Self::create_bind_group(
            device,
            &layout,
            input,
            &sampler,
            &params_buffer,
        );
        Ok(Self {
            pipeline,
            layout,
            sampler,
            params_buffer,
            input: input.clone(),
            bind_group,
            format,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        input: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Output Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    /// Point the pass at a new blended view. Takes effect at the next
    /// [`resize`](ScreenPass::resize).
    pub fn set_input(&mut self, input: &wgpu::TextureView) {
        self.input = input.clone();
    }

    /// Upload a new exposure.
    pub fn set_exposure(&self, queue: &wgpu::Queue, exposure: f32) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&OutputParams::new(exposure, self.format)),
        );
    }
}

impl ScreenPass for OutputPass {
    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        fullscreen_pass(
            encoder,
            "Output",
            target,
            &self.pipeline,
            &self.bind_group,
        );
    }

    fn resize(&mut self, context: &RenderContext) {
        self.bind_group = Self::create_bind_group(
            &context.device,
            &self.layout,
            &self.input,
            &self.sampler,
            &self.params_buffer,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_targets_skip_shader_encoding() {
        let hw = OutputParams::new(1.5, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(hw.encode_srgb, 0);
        assert_eq!(hw.exposure, 1.5);
        let sw = OutputParams::new(1.5, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(sw.encode_srgb, 1);
    }
}
