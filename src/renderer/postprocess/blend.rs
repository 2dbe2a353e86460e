//! Host-supplied blend shader combining the normal scene render with the
//! bloom intermediate.
//!
//! The shader pair is checked before any pipeline is built: the fragment
//! program must declare `baseTexture`, `bloomTexture`, and exactly one
//! filtering sampler in group 0, and nothing else. Bindings are read from
//! the program, so hosts may number them freely as long as no two share a
//! slot.

use std::borrow::Cow;

use crate::error::HaloError;
use crate::gpu::pipeline_helpers::{
    bind_group_layout, create_screen_space_pipeline_with, filtering_sampler,
    linear_sampler, texture_2d,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{create_module, ShaderComposer};
use crate::gpu::texture::HDR_FORMAT;

use super::screen_pass::{fullscreen_pass, ScreenPass};

/// Name of the scene texture global the fragment program must declare.
pub const BASE_TEXTURE: &str = "baseTexture";
/// Name of the bloom texture global the fragment program must declare.
pub const BLOOM_TEXTURE: &str = "bloomTexture";

/// WGSL source of the blend vertex and fragment programs.
///
/// The vertex program draws a fullscreen triangle (three vertices, no
/// buffers) and hands the fragment program its texture coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendShaderSource {
    /// Vertex program.
    pub vertex: Cow<'static, str>,
    /// Fragment program.
    pub fragment: Cow<'static, str>,
}

impl BlendShaderSource {
    /// Source from host-provided strings.
    pub fn new(
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl Default for BlendShaderSource {
    /// Additive blend: `base + vec4(bloom.rgb, 1.0)`.
    fn default() -> Self {
        Self::new(
            include_str!("../../../assets/shaders/blend/blend_vertex.wgsl"),
            include_str!("../../../assets/shaders/blend/blend_fragment.wgsl"),
        )
    }
}

/// Where the validated programs expect their resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendBindings {
    /// Binding of `baseTexture` in group 0.
    pub base: u32,
    /// Binding of `bloomTexture` in group 0.
    pub bloom: u32,
    /// Binding of the sampler in group 0.
    pub sampler: u32,
    /// Vertex entry point name.
    pub vertex_entry: String,
    /// Fragment entry point name.
    pub fragment_entry: String,
}

fn entry_point(
    module: &naga::Module,
    stage: naga::ShaderStage,
) -> Result<String, HaloError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| {
            HaloError::BlendShader(format!("no {stage:?} entry point"))
        })
}

/// Check the composed programs and locate their bindings.
///
/// # Errors
///
/// Returns [`HaloError::BlendShader`] naming the first problem found.
pub fn validate_blend_modules(
    vertex: &naga::Module,
    fragment: &naga::Module,
) -> Result<BlendBindings, HaloError> {
    let vertex_entry = entry_point(vertex, naga::ShaderStage::Vertex)?;
    let fragment_entry = entry_point(fragment, naga::ShaderStage::Fragment)?;

    if let Some(var) = vertex
        .global_variables
        .iter()
        .map(|(_, var)| var)
        .find(|var| var.binding.is_some())
    {
        return Err(HaloError::BlendShader(format!(
            "vertex program binds `{}`; it must not bind resources",
            var.name.as_deref().unwrap_or("<unnamed>")
        )));
    }

    let mut base = None;
    let mut bloom = None;
    let mut sampler = None;
    for (_, var) in fragment.global_variables.iter() {
        let Some(binding) = &var.binding else {
            continue;
        };
        let name = var.name.as_deref().unwrap_or("<unnamed>");
        if binding.group != 0 {
            return Err(HaloError::BlendShader(format!(
                "`{name}` is in group {}; only group 0 is bound",
                binding.group
            )));
        }
        match (&fragment.types[var.ty].inner, name) {
            (naga::TypeInner::Image { .. }, BASE_TEXTURE) => {
                base = Some(binding.binding);
            }
            (naga::TypeInner::Image { .. }, BLOOM_TEXTURE) => {
                bloom = Some(binding.binding);
            }
            (naga::TypeInner::Sampler { comparison: false }, _) => {
                if sampler.replace(binding.binding).is_some() {
                    return Err(HaloError::BlendShader(
                        "more than one sampler declared".to_owned(),
                    ));
                }
            }
            _ => {
                return Err(HaloError::BlendShader(format!(
                    "unexpected resource `{name}`"
                )));
            }
        }
    }

    let missing =
        |what: &str| HaloError::BlendShader(format!("missing {what}"));
    let base = base.ok_or_else(|| missing("texture `baseTexture`"))?;
    let bloom = bloom.ok_or_else(|| missing("texture `bloomTexture`"))?;
    let sampler = sampler.ok_or_else(|| missing("sampler"))?;

    let clash = [
        (base, bloom, "`baseTexture` and `bloomTexture`"),
        (base, sampler, "`baseTexture` and the sampler"),
        (bloom, sampler, "`bloomTexture` and the sampler"),
    ]
    .into_iter()
    .find(|&(a, b, _)| a == b);
    if let Some((slot, _, what)) = clash {
        return Err(HaloError::BlendShader(format!(
            "{what} share binding {slot}"
        )));
    }

    Ok(BlendBindings {
        base,
        bloom,
        sampler,
        vertex_entry,
        fragment_entry,
    })
}

/// Fullscreen pass running the host blend shader into an HDR target.
pub struct BlendPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bindings: BlendBindings,
    sampler: wgpu::Sampler,
    base: wgpu::TextureView,
    bloom: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl BlendPass {
    /// Compose, validate, and build the blend pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::BlendShader`] if either program fails to
    /// compose, declares the wrong resources, or is rejected by the device.
    pub async fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        source: &BlendShaderSource,
        base: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
    ) -> Result<Self, HaloError> {
        let vertex = composer
            .compose_naga(&source.vertex, "blend_vertex.wgsl")
            .map_err(|e| {
                HaloError::BlendShader(format!("vertex program: {e}"))
            })?;
        let fragment = composer
            .compose_naga(&source.fragment, "blend_fragment.wgsl")
            .map_err(|e| {
                HaloError::BlendShader(format!("fragment program: {e}"))
            })?;
        let bindings = validate_blend_modules(&vertex, &fragment)?;

        let device = &context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let layout = bind_group_layout(
            device,
            "Blend Layout",
            &[
                texture_2d(bindings.base),
                texture_2d(bindings.bloom),
                filtering_sampler(bindings.sampler),
            ],
        );
        let vertex_module = create_module(device, "Blend Vertex", vertex);
        let fragment_module =
            create_module(device, "Blend Fragment", fragment);
        let pipeline = create_screen_space_pipeline_with(
            device,
            "Blend",
            (&vertex_module, &bindings.vertex_entry),
            (&fragment_module, &bindings.fragment_entry),
            HDR_FORMAT,
            &[&layout],
        );
        if let Some(err) = device.pop_error_scope().await {
            return Err(HaloError::BlendShader(err.to_string()));
        }
        log::debug!(
            "blend shader accepted (base @{}, bloom @{}, sampler @{})",
            bindings.base,
            bindings.bloom,
            bindings.sampler
        );

        let sampler = linear_sampler(device, "Blend Sampler");
        let bind_group = Self::create_bind_group(
            device, &layout, &bindings, &sampler, base, bloom,
        );
        Ok(Self {
            pipeline,
            layout,
            bindings,
            sampler,
            base: base.clone(),
            bloom: bloom.clone(),
            bind_group,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        bindings: &BlendBindings,
        sampler: &wgpu::Sampler,
        base: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blend Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings.base,
                    resource: wgpu::BindingResource::TextureView(base),
                },
                wgpu::BindGroupEntry {
                    binding: bindings.bloom,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: bindings.sampler,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Swap in new scene and bloom views. Takes effect at the next
    /// [`resize`](ScreenPass::resize).
    pub fn set_inputs(
        &mut self,
        base: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
    ) {
        self.base = base.clone();
        self.bloom = bloom.clone();
    }

    /// Bindings discovered in the host program.
    #[must_use]
    pub fn bindings(&self) -> &BlendBindings {
        &self.bindings
    }
}

impl ScreenPass for BlendPass {
    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        fullscreen_pass(
            encoder,
            "Blend",
            target,
            &self.pipeline,
            &self.bind_group,
        );
    }

    fn resize(&mut self, context: &RenderContext) {
        self.bind_group = Self::create_bind_group(
            &context.device,
            &self.layout,
            &self.bindings,
            &self.sampler,
            &self.base,
            &self.bloom,
        );
    }
}
