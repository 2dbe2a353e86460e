//! Instanced forward pass drawing every scene mesh into an HDR target.
//!
//! Meshes that share a geometry are batched into one instanced draw. The
//! per-instance record carries the world matrix, the normal matrix, and
//! the currently assigned material, so swapping a material is just a
//! different instance upload.

use std::ops::Range;

use glam::Mat3;
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::error::HaloError;
use crate::geometry::{GeometryId, GeometryLibrary, MeshVertex};
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::pipeline_helpers::{
    bind_group_layout, uniform_buffer, uniform_init,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{DEPTH_FORMAT, HDR_FORMAT};
use crate::scene::{MaterialLibrary, SceneGraph};

/// Per-frame scene constants. Must match `SceneUniform` in `mesh.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position (w unused).
    pub camera_position: [f32; 4],
    /// Unit vector towards the light (w unused).
    pub light_direction: [f32; 4],
    /// Light color times intensity (w unused).
    pub light_color: [f32; 4],
    /// Ambient term (w unused).
    pub ambient: [f32; 4],
}

impl SceneUniform {
    /// Gather camera and light state.
    #[must_use]
    pub fn new(camera: &Camera, scene: &SceneGraph, ambient: f32) -> Self {
        let (direction, radiance) = scene
            .primary_light()
            .map_or(([0.0, 1.0, 0.0], [0.0; 3]), |l| {
                (l.direction.to_array(), l.radiance)
            });
        Self {
            view_proj: camera.build_matrix().to_cols_array_2d(),
            camera_position: camera.eye.extend(1.0).to_array(),
            light_direction: [direction[0], direction[1], direction[2], 0.0],
            light_color: [radiance[0], radiance[1], radiance[2], 0.0],
            ambient: [ambient, ambient, ambient, 0.0],
        }
    }
}

/// Per-instance vertex data (locations 2..=10).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshInstance {
    /// Local-to-world matrix, column-major.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3, column-major.
    pub normal: [[f32; 3]; 3],
    /// Linear RGB color (a unused).
    pub color: [f32; 4],
    /// `(lit, specular, shininess, 0)`.
    pub material: [f32; 4],
}

impl MeshInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x3,
        7 => Float32x3,
        8 => Float32x3,
        9 => Float32x4,
        10 => Float32x4,
    ];

    /// Instance-rate buffer layout.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One instanced draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawBatch {
    /// Geometry drawn.
    pub geometry: GeometryId,
    /// Instance range in the uploaded instance buffer.
    pub instances: Range<u32>,
}

/// Flatten the scene into instance records grouped by geometry. Within a
/// geometry, instances keep pre-order. Meshes whose material or geometry
/// no longer resolves are skipped.
#[must_use]
pub fn build_instances(
    scene: &SceneGraph,
    materials: &MaterialLibrary,
    geometries: &GeometryLibrary,
) -> (Vec<MeshInstance>, Vec<DrawBatch>) {
    let mut meshes = scene.world_meshes();
    meshes.retain(|m| geometries.get(m.geometry).is_some());
    meshes.sort_by_key(|m| m.geometry);

    let mut instances = Vec::with_capacity(meshes.len());
    let mut batches: Vec<DrawBatch> = Vec::new();
    for m in meshes {
        let Some(material) = materials.get(m.material) else {
            continue;
        };
        let normal = Mat3::from_mat4(m.world).inverse().transpose();
        let [r, g, b] = material.color();
        let index = instances.len() as u32;
        instances.push(MeshInstance {
            model: m.world.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            material: material.shading_params(),
        });
        match batches.last_mut() {
            Some(batch) if batch.geometry == m.geometry => {
                batch.instances.end = index + 1;
            }
            _ => batches.push(DrawBatch {
                geometry: m.geometry,
                instances: index..index + 1,
            }),
        }
    }
    (instances, batches)
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Forward mesh pass.
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instances: TypedBuffer<MeshInstance>,
    meshes: Vec<GpuMesh>,
    uploaded_generation: Option<u64>,
    batches: Vec<DrawBatch>,
}

impl MeshPass {
    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Shader`] if `mesh.wgsl` fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
    ) -> Result<Self, HaloError> {
        let device = &context.device;
        let shader = composer.compose(
            device,
            "Mesh Shader",
            include_str!("../../assets/shaders/raster/mesh.wgsl"),
            "mesh.wgsl",
        )?;

        let layout = bind_group_layout(
            device,
            "Mesh Scene Layout",
            &[wgpu::BindGroupLayoutEntry {
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ..uniform_buffer(0)
            }],
        );
        let uniform_buffer = uniform_init(
            device,
            "Mesh Scene Uniform",
            &<SceneUniform as bytemuck::Zeroable>::zeroed(),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Scene Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Mesh Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::layout(), MeshInstance::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            instances: TypedBuffer::with_capacity(
                device,
                "Mesh Instances",
                1024,
                wgpu::BufferUsages::VERTEX,
            ),
            meshes: Vec::new(),
            uploaded_generation: None,
            batches: Vec::new(),
        })
    }

    fn upload_geometries(
        &mut self,
        device: &wgpu::Device,
        geometries: &GeometryLibrary,
    ) {
        if self.uploaded_generation == Some(geometries.generation()) {
            return;
        }
        self.meshes = geometries
            .iter()
            .map(|(id, mesh)| GpuMesh {
                vertex_buffer: device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Mesh {} Vertices", id.index())),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                ),
                index_buffer: device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Mesh {} Indices", id.index())),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    },
                ),
                index_count: mesh.indices.len() as u32,
            })
            .collect();
        self.uploaded_generation = Some(geometries.generation());
        log::debug!("uploaded {} geometries", self.meshes.len());
    }

    /// Upload camera, light, and instance data for the next
    /// [`record`](Self::record). The writes land at the next queue submit.
    pub fn prepare(
        &mut self,
        context: &RenderContext,
        scene: &SceneGraph,
        materials: &MaterialLibrary,
        geometries: &GeometryLibrary,
        camera: &Camera,
        ambient: f32,
    ) {
        self.upload_geometries(&context.device, geometries);
        let uniform = SceneUniform::new(camera, scene, ambient);
        context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&uniform),
        );

        let (instances, batches) =
            build_instances(scene, materials, geometries);
        let _ = self
            .instances
            .write(&context.device, &context.queue, &instances);
        self.batches = batches;
    }

    /// Clear `color`/`depth` and draw the prepared instances.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        if self.instances.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(1, self.instances.slice());
        for batch in &self.batches {
            let Some(mesh) = self.meshes.get(batch.geometry.index()) else {
                continue;
            };
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
        }
    }
}
