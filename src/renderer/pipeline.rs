//! The dual render pipeline.
//!
//! Each frame the scene is drawn twice through the same [`MeshPass`]:
//!
//! 1. **Bloom sub-pipeline**: scene (non-eligible meshes already blanked by
//!    the caller) into `bloom_scene`, then [`BloomPass`] writes the bloom
//!    intermediate. Never touches the visible output.
//! 2. **Composite sub-pipeline**: scene with real materials into
//!    `composite_scene`, then the host [`BlendPass`] into `blended`, then
//!    [`OutputPass`] tone maps into the frame.
//!
//! Each sub-pipeline is submitted on its own so its instance upload cannot
//! be overwritten by the other's before the GPU reads it.

use crate::camera::Camera;
use crate::error::HaloError;
use crate::geometry::GeometryLibrary;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;
use crate::options::Options;
use crate::scene::{MaterialLibrary, SceneGraph};

use super::mesh_pass::MeshPass;
use super::postprocess::blend::{BlendPass, BlendShaderSource};
use super::postprocess::bloom::BloomPass;
use super::postprocess::output::OutputPass;
use super::postprocess::screen_pass::ScreenPass;

/// Viewport-sized intermediate targets.
struct Targets {
    depth: RenderTarget,
    bloom_scene: RenderTarget,
    composite_scene: RenderTarget,
    /// Bloom intermediate: bloom-scene color plus the weighted glow.
    bloom: RenderTarget,
    blended: RenderTarget,
}

impl Targets {
    fn new(context: &RenderContext) -> Self {
        let device = &context.device;
        let (w, h) = (context.width(), context.height());
        Self {
            depth: RenderTarget::depth(device, "Scene Depth", w, h),
            bloom_scene: RenderTarget::hdr(device, "Bloom Scene", w, h),
            composite_scene: RenderTarget::hdr(device, "Composite Scene", w, h),
            bloom: RenderTarget::hdr(device, "Bloom Intermediate", w, h),
            blended: RenderTarget::hdr(device, "Blended", w, h),
        }
    }
}

/// Bloom and composite sub-pipelines sharing one mesh pass.
pub struct DualPipeline {
    mesh: MeshPass,
    bloom: BloomPass,
    blend: BlendPass,
    output: OutputPass,
    targets: Targets,
    ambient: f32,
}

impl DualPipeline {
    /// Build every pass at the context's current size.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Shader`] if a built-in shader fails to compose
    /// and [`HaloError::BlendShader`] if the host blend shader is rejected.
    pub async fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        options: &Options,
        blend_source: &BlendShaderSource,
    ) -> Result<Self, HaloError> {
        let targets = Targets::new(context);
        let mesh = MeshPass::new(context, composer)?;
        let bloom = BloomPass::new(
            context,
            composer,
            &targets.bloom_scene.view,
            &options.bloom,
        )?;
        let blend = BlendPass::new(
            context,
            composer,
            blend_source,
            &targets.composite_scene.view,
            &targets.bloom.view,
        )
        .await?;
        let output = OutputPass::new(
            context,
            composer,
            &targets.blended.view,
            options.tone_mapping.exposure,
        )?;
        Ok(Self {
            mesh,
            bloom,
            blend,
            output,
            targets,
            ambient: options.lighting.ambient,
        })
    }

    /// Bloom sub-pipeline: draw and submit. The caller blanks non-eligible
    /// meshes first and restores them afterwards.
    pub fn render_bloom(
        &mut self,
        context: &RenderContext,
        scene: &SceneGraph,
        materials: &MaterialLibrary,
        geometries: &GeometryLibrary,
        camera: &Camera,
    ) {
        self.mesh.prepare(
            context, scene, materials, geometries, camera, self.ambient,
        );
        let mut encoder = context.create_encoder("Bloom Encoder");
        self.mesh.record(
            &mut encoder,
            "Bloom Scene",
            &self.targets.bloom_scene.view,
            &self.targets.depth.view,
        );
        self.bloom.render(&mut encoder, &self.targets.bloom.view);
        context.submit(encoder);
    }

    /// Composite sub-pipeline: draw, blend, tone map into `target`, and
    /// submit.
    pub fn render_composite(
        &mut self,
        context: &RenderContext,
        scene: &SceneGraph,
        materials: &MaterialLibrary,
        geometries: &GeometryLibrary,
        camera: &Camera,
        target: &wgpu::TextureView,
    ) {
        self.mesh.prepare(
            context, scene, materials, geometries, camera, self.ambient,
        );
        let mut encoder = context.create_encoder("Composite Encoder");
        self.mesh.record(
            &mut encoder,
            "Composite Scene",
            &self.targets.composite_scene.view,
            &self.targets.depth.view,
        );
        self.blend.render(&mut encoder, &self.targets.blended.view);
        self.output.render(&mut encoder, target);
        context.submit(encoder);
    }

    /// Recreate every size-dependent resource of both sub-pipelines at the
    /// context's current size.
    pub fn resize(&mut self, context: &RenderContext) {
        self.targets = Targets::new(context);
        self.bloom.set_input(&self.targets.bloom_scene.view);
        self.bloom.resize(context);
        self.blend.set_inputs(
            &self.targets.composite_scene.view,
            &self.targets.bloom.view,
        );
        self.blend.resize(context);
        self.output.set_input(&self.targets.blended.view);
        self.output.resize(context);
        log::debug!(
            "pipelines resized to {}x{}",
            context.width(),
            context.height()
        );
    }

    /// Push bloom, exposure, and ambient values to the GPU.
    pub fn apply_options(&mut self, queue: &wgpu::Queue, options: &Options) {
        self.bloom.update_params(queue, &options.bloom);
        self.output.set_exposure(queue, options.tone_mapping.exposure);
        self.ambient = options.lighting.ambient;
    }

    /// Size of the intermediate targets.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.targets.composite_scene.size()
    }

    /// Input size the bloom chain is built for.
    #[must_use]
    pub fn bloom_size(&self) -> (u32, u32) {
        self.bloom.size()
    }
}
