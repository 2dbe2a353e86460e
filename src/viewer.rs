//! The viewer context: one object owning everything a frame needs.
//!
//! [`Viewer`] holds the render context, the scene with its material and
//! geometry libraries, the camera rig, the material swap cache, the dual
//! pipeline, and the input processor. Hosts drive it with
//! [`tick`](Viewer::tick), forward window events through
//! [`handle_input`](Viewer::handle_input), and report size changes with
//! [`resize`](Viewer::resize).
//!
//! ```ignore
//! let mut viewer = pollster::block_on(Viewer::headless(
//!     640,
//!     480,
//!     Options::default(),
//!     &BlendShaderSource::default(),
//! ))?;
//! viewer.tick()?;
//! let rgba = viewer.read_pixels()?;
//! ```

use glam::Vec2;

use crate::camera::CameraRig;
use crate::error::HaloError;
use crate::geometry::GeometryLibrary;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::input::{InputEvent, InputProcessor, ViewerCommand};
use crate::options::Options;
use crate::picking::{self, Hit, Toggled, ViewportRect};
use crate::renderer::{BlendShaderSource, DualPipeline};
use crate::scene::{
    populate, Material, MaterialId, MaterialLibrary, MaterialSwapCache,
    PopulatedScene, SceneGraph,
};

/// Interactive selective-bloom scene viewer.
pub struct Viewer {
    context: RenderContext,
    pipeline: DualPipeline,
    scene: SceneGraph,
    materials: MaterialLibrary,
    geometries: GeometryLibrary,
    populated: PopulatedScene,
    /// Shared material non-eligible meshes wear during the bloom pass.
    blank: MaterialId,
    swap: MaterialSwapCache,
    rig: CameraRig,
    input: InputProcessor,
    viewport: ViewportRect,
    options: Options,
}

impl Viewer {
    /// Viewer presenting to a window.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Gpu`] if the GPU context cannot be created,
    /// [`HaloError::Shader`] if a built-in shader is broken, and
    /// [`HaloError::BlendShader`] if `blend` is rejected.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
        blend: &BlendShaderSource,
    ) -> Result<Self, HaloError> {
        let context = RenderContext::new(window, size).await?;
        Self::with_context(context, options, blend).await
    }

    /// Viewer rendering into an off-screen texture, read back with
    /// [`read_pixels`](Self::read_pixels).
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub async fn headless(
        width: u32,
        height: u32,
        options: Options,
        blend: &BlendShaderSource,
    ) -> Result<Self, HaloError> {
        let context = RenderContext::headless(width, height).await?;
        Self::with_context(context, options, blend).await
    }

    /// Viewer on an existing render context.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), minus context creation.
    pub async fn with_context(
        context: RenderContext,
        options: Options,
        blend: &BlendShaderSource,
    ) -> Result<Self, HaloError> {
        let mut composer = ShaderComposer::new()?;
        let pipeline =
            DualPipeline::new(&context, &mut composer, &options, blend)
                .await?;

        let mut scene = SceneGraph::new();
        let mut materials = MaterialLibrary::new();
        let mut geometries = GeometryLibrary::new();
        let populated = populate(
            &mut scene,
            &mut materials,
            &mut geometries,
            &options.scene,
            &options.lighting,
        );
        let blank = materials.add(Material::BLACK);

        let (width, height) = (context.width(), context.height());
        let rig =
            CameraRig::new(&options.camera, &options.controls, width, height);
        let input = InputProcessor::new(options.controls.click_drag_threshold);

        Ok(Self {
            context,
            pipeline,
            scene,
            materials,
            geometries,
            populated,
            blank,
            swap: MaterialSwapCache::new(),
            rig,
            input,
            viewport: ViewportRect::from_size(width as f32, height as f32),
            options,
        })
    }

    /// Advance the camera controls one step, then draw a frame.
    ///
    /// # Errors
    ///
    /// Returns the surface error if no frame could be acquired. The host
    /// should [`resize`](Self::resize) on `Lost`/`Outdated` and try again.
    pub fn tick(&mut self) -> Result<(), wgpu::SurfaceError> {
        let _ = self.rig.update();
        self.render_frame()
    }

    /// Draw one frame: bloom sub-pipeline with non-eligible meshes blanked,
    /// then the composite sub-pipeline with every material restored.
    ///
    /// The frame is acquired first, so a failure leaves the scene as it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns the surface error if no frame could be acquired.
    pub fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;

        let _ = self.swap.hide_non_bloom(&mut self.scene, self.blank);
        self.pipeline.render_bloom(
            &self.context,
            &self.scene,
            &self.materials,
            &self.geometries,
            &self.rig.camera,
        );
        let _ = self.swap.restore_materials(&mut self.scene);

        self.pipeline.render_composite(
            &self.context,
            &self.scene,
            &self.materials,
            &self.geometries,
            &self.rig.camera,
            &frame.view,
        );
        frame.present();
        Ok(())
    }

    /// Front-most mesh under a client-space pointer position.
    #[must_use]
    pub fn pick(&self, pointer: Vec2) -> Option<Hit> {
        picking::pick(
            &self.rig.camera,
            &self.scene,
            &self.geometries,
            self.viewport,
            pointer,
        )
    }

    /// Toggle bloom on the front-most mesh under a client-space pointer
    /// position. No hit leaves the scene unchanged.
    pub fn toggle_bloom_at(&mut self, pointer: Vec2) -> Option<Toggled> {
        picking::toggle_bloom_at(
            &self.rig.camera,
            &mut self.scene,
            &self.geometries,
            self.viewport,
            pointer,
        )
    }

    /// Resize the output and both sub-pipelines and recompute the camera
    /// projection. Zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.context.resize(width, height) {
            return;
        }
        self.pipeline.resize(&self.context);
        self.rig.resize(width, height);
        self.viewport = ViewportRect {
            width: width as f32,
            height: height as f32,
            ..self.viewport
        };
    }

    /// Place the viewport inside the host's client area. Picking maps
    /// pointer positions through this rectangle.
    pub fn set_viewport_rect(&mut self, rect: ViewportRect) {
        self.viewport = rect;
    }

    /// Feed a raw input event. Returns `true` if it produced a command.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let Some(command) = self.input.handle_event(event) else {
            return false;
        };
        self.execute(command);
        true
    }

    /// Run one command.
    pub fn execute(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::RotateCamera { delta } => {
                self.rig.rotate(delta, self.viewport.height);
            }
            ViewerCommand::Zoom { delta } => self.rig.scroll(delta),
            ViewerCommand::ToggleBloomAt { position } => {
                let _ = self.toggle_bloom_at(position);
            }
        }
    }

    /// Replace the options. Bloom, exposure and ambient go to the GPU;
    /// projection and control tuning go to the camera rig; the click/drag
    /// threshold goes to the input processor; color, intensity and position
    /// go to the light. Scene layout, initial camera placement and material
    /// tuning only take effect in a new viewer.
    pub fn set_options(&mut self, options: Options) {
        self.pipeline.apply_options(&self.context.queue, &options);
        self.rig.apply_options(&options.camera, &options.controls);
        self.input.set_drag_threshold(options.controls.click_drag_threshold);
        self.populated.apply_lighting(&mut self.scene, &options.lighting);
        self.options = options;
    }

    /// Read the last frame back as tightly packed RGBA8 rows. Headless
    /// viewers only.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Gpu`] for windowed viewers or if the read-back
    /// fails.
    pub fn read_pixels(&self) -> Result<Vec<u8>, HaloError> {
        Ok(self.context.read_pixels()?)
    }

    /// Output size in physical pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.context.width(), self.context.height())
    }

    /// The scene graph.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Mutable scene graph.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// The material library.
    #[must_use]
    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Mutable material library.
    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Shared geometries.
    #[must_use]
    pub fn geometries(&self) -> &GeometryLibrary {
        &self.geometries
    }

    /// Handles to the generated hub, satellites, and light.
    #[must_use]
    pub fn populated(&self) -> &PopulatedScene {
        &self.populated
    }

    /// Camera and controls.
    #[must_use]
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Mutable camera and controls.
    pub fn rig_mut(&mut self) -> &mut CameraRig {
        &mut self.rig
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The render context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use crate::options::SceneOptions;
    use crate::scene::ObjectKind;

    const SIZE: u32 = 96;

    fn small_options() -> Options {
        Options {
            scene: SceneOptions {
                satellite_count: 0,
                detail: 4,
                seed: Some(11),
                ..SceneOptions::default()
            },
            ..Options::default()
        }
    }

    /// Headless viewer, or `None` when the machine has no GPU adapter.
    fn viewer_with(blend: &BlendShaderSource) -> Option<Viewer> {
        match pollster::block_on(Viewer::headless(
            SIZE,
            SIZE,
            small_options(),
            blend,
        )) {
            Ok(viewer) => Some(viewer),
            Err(HaloError::Gpu(e)) => {
                log::warn!("skipping GPU test: {e}");
                None
            }
            Err(e) => panic!("viewer creation failed: {e}"),
        }
    }

    fn viewer() -> Option<Viewer> {
        viewer_with(&BlendShaderSource::default())
    }

    fn center() -> Vec2 {
        Vec2::splat(SIZE as f32 / 2.0)
    }

    /// Sum of RGB over a small block around the center.
    fn center_energy(pixels: &[u8]) -> u32 {
        let mid = SIZE / 2;
        let mut sum = 0;
        for y in mid - 2..mid + 2 {
            for x in mid - 2..mid + 2 {
                let i = ((y * SIZE + x) * 4) as usize;
                sum += pixels[i..i + 3]
                    .iter()
                    .map(|&c| u32::from(c))
                    .sum::<u32>();
            }
        }
        sum
    }

    fn materials_of(viewer: &Viewer) -> Vec<Option<MaterialId>> {
        viewer
            .scene()
            .pre_order()
            .into_iter()
            .map(|id| viewer.scene().get(id).and_then(|o| o.material()))
            .collect()
    }

    #[test]
    fn hub_brightens_when_toggled() {
        let Some(mut viewer) = viewer() else {
            return;
        };
        viewer.render_frame().unwrap();
        let before = center_energy(&viewer.read_pixels().unwrap());
        assert!(before > 0, "hub should be visible at the center");

        let toggled = viewer.toggle_bloom_at(center()).unwrap();
        assert_eq!(toggled.object, viewer.populated().hub);
        assert!(toggled.eligible);

        viewer.render_frame().unwrap();
        let after = center_energy(&viewer.read_pixels().unwrap());
        assert!(after > before, "{after} <= {before}");
    }

    #[test]
    fn frames_leave_materials_untouched() {
        let Some(mut viewer) = viewer() else {
            return;
        };
        let before = materials_of(&viewer);
        viewer.render_frame().unwrap();
        viewer.tick().unwrap();
        assert_eq!(materials_of(&viewer), before);
        assert!(viewer.swap.is_empty());
    }

    #[test]
    fn click_on_empty_space_changes_nothing() {
        let Some(mut viewer) = viewer() else {
            return;
        };
        let hub = viewer.populated().hub;
        assert!(viewer.toggle_bloom_at(Vec2::new(1.0, 1.0)).is_none());
        assert!(!viewer.scene().get(hub).unwrap().is_bloom_eligible());
    }

    #[test]
    fn resize_reaches_every_target() {
        let Some(mut viewer) = viewer() else {
            return;
        };
        viewer.resize(64, 32);
        assert_eq!(viewer.size(), (64, 32));
        assert_eq!(viewer.pipeline.size(), (64, 32));
        assert_eq!(viewer.pipeline.bloom_size(), (64, 32));
        assert_eq!(viewer.rig().camera.aspect, 2.0);

        viewer.render_frame().unwrap();
        assert_eq!(viewer.read_pixels().unwrap().len(), 64 * 32 * 4);

        viewer.resize(0, 10);
        assert_eq!(viewer.size(), (64, 32));
    }

    #[test]
    fn click_through_input_toggles_hub() {
        let Some(mut viewer) = viewer() else {
            return;
        };
        let c = center();
        let _ =
            viewer.handle_input(InputEvent::CursorMoved { x: c.x, y: c.y });
        let _ = viewer.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        assert!(viewer.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        }));
        let hub = viewer.populated().hub;
        assert!(viewer.scene().get(hub).unwrap().is_bloom_eligible());
    }

    #[test]
    fn set_options_retunes_rig_and_light() {
        let Some(mut viewer) = viewer() else {
            return;
        };
        let eye = viewer.rig().camera.eye;
        let mut options = small_options();
        options.camera.fovy = 60.0;
        options.controls.zoom_speed = 4.0;
        options.lighting.intensity = 2.0;
        options.lighting.color = [0.2, 0.4, 1.0];
        viewer.set_options(options.clone());

        let rig = viewer.rig();
        assert_eq!(rig.camera.fovy, 60.0);
        assert_eq!(rig.camera.eye, eye);
        assert_eq!(rig.zoom.zoom_speed, 4.0);
        let light = viewer.scene().get(viewer.populated().light).unwrap();
        assert!(matches!(
            light.kind,
            ObjectKind::DirectionalLight { color, intensity, .. }
                if color == [0.2, 0.4, 1.0] && intensity == 2.0
        ));
        assert_eq!(viewer.options(), &options);
        viewer.render_frame().unwrap();
    }

    #[test]
    fn malformed_blend_shader_is_fatal() {
        let blend = BlendShaderSource::new(
            BlendShaderSource::default().vertex,
            "@group(0) @binding(0) var baseTexture: texture_2d<f32>;
             @group(0) @binding(1) var s: sampler;
             @fragment
             fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
                 return textureSample(baseTexture, s, uv);
             }",
        );
        match pollster::block_on(Viewer::headless(
            SIZE,
            SIZE,
            small_options(),
            &blend,
        )) {
            Err(HaloError::Gpu(_)) => {}
            Err(HaloError::BlendShader(msg)) => {
                assert!(msg.contains("bloomTexture"), "{msg}");
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("malformed blend shader accepted"),
        }
    }
}
