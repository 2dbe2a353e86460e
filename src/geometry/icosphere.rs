//! Icosahedron-based sphere with per-face grid subdivision.
//!
//! Each of the 20 icosahedron faces is split into `(detail + 1)^2`
//! triangles on a regular grid and every grid point is pushed out to the
//! sphere. Faces keep their own vertices, but a grid point is always built
//! from its corner weights summed in corner-index order, so points on an
//! edge shared by two faces come out bit-identical and the surface has no
//! cracks. Normals are the normalized positions.

use glam::Vec3;

use super::{MeshData, MeshVertex};

const PHI: f32 = 1.618_034;

const BASE_VERTICES: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];

/// Counter-clockwise when viewed from outside.
const BASE_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Generate an icosphere of the given radius and subdivision detail.
#[must_use]
pub fn icosphere(radius: f32, detail: u32) -> MeshData {
    let cols = detail as usize + 1;
    let verts_per_face = (cols + 1) * (cols + 2) / 2;
    let mut vertices = Vec::with_capacity(BASE_FACES.len() * verts_per_face);
    let mut indices = Vec::with_capacity(BASE_FACES.len() * cols * cols * 3);

    for face in BASE_FACES {
        subdivide_face(face, cols, radius, &mut vertices, &mut indices);
    }

    MeshData::new(vertices, indices)
}

/// Grid point with integer corner `weights` (summing to `cols`). Corners
/// are accumulated in ascending index order so every face sharing an edge
/// or corner produces the same bits.
fn grid_point(face: [usize; 3], weights: [usize; 3], cols: usize) -> Vec3 {
    let mut corners = [
        (face[0], weights[0]),
        (face[1], weights[1]),
        (face[2], weights[2]),
    ];
    corners.sort_unstable_by_key(|&(index, _)| index);
    corners
        .iter()
        .filter(|&&(_, w)| w > 0)
        .fold(Vec3::ZERO, |acc, &(index, w)| {
            acc + Vec3::from(BASE_VERTICES[index]) * (w as f32 / cols as f32)
        })
}

/// Grid-subdivide one face. Row `i` runs from edge `a→c` to edge `b→c`
/// and holds `cols - i + 1` points.
fn subdivide_face(
    face: [usize; 3],
    cols: usize,
    radius: f32,
    vertices: &mut Vec<MeshVertex>,
    indices: &mut Vec<u32>,
) {
    let base = vertices.len() as u32;
    let mut row_start = Vec::with_capacity(cols + 1);

    for i in 0..=cols {
        row_start.push(vertices.len() as u32 - base);
        let rows = cols - i;
        for j in 0..=rows {
            let p = grid_point(face, [rows - j, j, i], cols);
            let normal = p.normalize();
            vertices.push(MeshVertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
            });
        }
    }

    let at = |i: usize, j: usize| base + row_start[i] + j as u32;
    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                indices.extend_from_slice(&[
                    at(i, k + 1),
                    at(i + 1, k),
                    at(i, k),
                ]);
            } else {
                indices.extend_from_slice(&[
                    at(i, k + 1),
                    at(i + 1, k + 1),
                    at(i + 1, k),
                ]);
            }
        }
    }
}
