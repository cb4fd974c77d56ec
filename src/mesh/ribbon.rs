use thiserror::Error;

use super::Mesh;

/// Vertex normal for every ribbon vertex
pub const UP: [f32; 3] = [0.0, 0.0, 1.0];

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("ribbon needs at least 2 edge pairs, got {count}")]
    TooFewPoints { count: usize },

    #[error("non-finite edge point at s = {s}")]
    NonFinite { s: f64 },

    #[error("texture reference length must be positive, got {0}")]
    InvalidTextureLength(f64),
}

/// Left and right edge of a ribbon at one sampled arc-length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePair {
    pub s: f64,
    pub left: [f64; 3],
    pub right: [f64; 3],
}

impl EdgePair {
    pub fn is_finite(&self) -> bool {
        self.s.is_finite()
            && self.left.iter().all(|c| c.is_finite())
            && self.right.iter().all(|c| c.is_finite())
    }
}

fn to_f32(p: [f64; 3]) -> [f32; 3] {
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

/// Tessellate a quad strip between the left and right edges into `mesh`
///
/// Appends the left row then the right row of vertices, with
/// `u = (s_i - s_0) / texture_length` and `v` 0 on the left, 1 on the right.
/// On error nothing is appended.
pub fn append_ribbon(
    mesh: &mut Mesh,
    edges: &[EdgePair],
    texture_length: f64,
) -> Result<(), MeshError> {
    if edges.len() < 2 {
        return Err(MeshError::TooFewPoints { count: edges.len() });
    }
    if !(texture_length > 0.0) {
        return Err(MeshError::InvalidTextureLength(texture_length));
    }
    if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
        return Err(MeshError::NonFinite { s: bad.s });
    }

    let s0 = edges[0].s;
    let base = mesh.vertex_count() as u32;
    let n = edges.len() as u32;

    for edge in edges {
        let u = ((edge.s - s0) / texture_length) as f32;
        mesh.add_vertex(to_f32(edge.left), UP, [u, 0.0]);
    }
    for edge in edges {
        let u = ((edge.s - s0) / texture_length) as f32;
        mesh.add_vertex(to_f32(edge.right), UP, [u, 1.0]);
    }

    for i in 0..n - 1 {
        let left = base + i;
        let right = base + n + i;
        mesh.add_triangle(left, right, right + 1);
        mesh.add_triangle(left, right + 1, left + 1);
    }

    Ok(())
}

/// Append a flat `length` x `width` rectangle at the origin
///
/// Stands in for geometry that could not be built so every mesh stays
/// renderable.
pub fn append_fallback_quad(mesh: &mut Mesh, length: f64, width: f64) {
    let (l, w) = (length as f32, width as f32);
    let a = mesh.add_vertex([0.0, 0.0, 0.0], UP, [0.0, 0.0]);
    let b = mesh.add_vertex([l, 0.0, 0.0], UP, [1.0, 0.0]);
    let c = mesh.add_vertex([0.0, w, 0.0], UP, [0.0, 1.0]);
    let d = mesh.add_vertex([l, w, 0.0], UP, [1.0, 1.0]);
    mesh.add_triangle(a, b, d);
    mesh.add_triangle(a, d, c);
}
