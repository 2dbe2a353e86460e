//! CPU-side mesh data shared by the renderer and the ray picker.

mod icosphere;

pub use icosphere::icosphere;

use glam::Vec3;

/// Handle to a mesh stored in a [`GeometryLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u32);

impl GeometryId {
    /// Index into the owning library.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-vertex data uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Vertex buffer layout for locations 0 (position) and 1 (normal).
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }
    }
}

/// Indexed triangle mesh with counter-clockwise front faces.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex array.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
    /// Radius of the origin-centered sphere enclosing every vertex.
    pub bounding_radius: f32,
}

impl MeshData {
    /// Build a mesh, computing its origin-centered bounding radius.
    #[must_use]
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounding_radius = vertices
            .iter()
            .map(|v| Vec3::from(v.position).length())
            .fold(0.0f32, f32::max);
        Self {
            vertices,
            indices,
            bounding_radius,
        }
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate the triangles as object-space corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from(self.vertices[tri[0] as usize].position),
                Vec3::from(self.vertices[tri[1] as usize].position),
                Vec3::from(self.vertices[tri[2] as usize].position),
            ]
        })
    }
}

/// Append-only store of meshes shared between scene objects.
#[derive(Debug, Default)]
pub struct GeometryLibrary {
    meshes: Vec<MeshData>,
    /// Bumped on every insertion so GPU copies know to re-upload.
    generation: u64,
}

impl GeometryLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a mesh and return its handle.
    pub fn add(&mut self, mesh: MeshData) -> GeometryId {
        let id = GeometryId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        self.generation += 1;
        id
    }

    /// Look up a mesh.
    #[must_use]
    pub fn get(&self, id: GeometryId) -> Option<&MeshData> {
        self.meshes.get(id.index())
    }

    /// Number of stored meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no mesh has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Monotonic insertion counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterate `(handle, mesh)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (GeometryId, &MeshData)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (GeometryId(i as u32), m))
    }
}
