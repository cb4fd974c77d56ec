//! Mesh validation and repair utilities
//!
//! Checks indexed meshes against what an exporter expects:
//! - Attribute arrays aligned by vertex index
//! - Indices in range and a whole number of triangles
//! - No NaN/Inf coordinates
//! - Degenerate (zero area) triangles reported and removable

use super::Mesh;

/// Result of mesh validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Number of triangles validated
    pub total: usize,
    /// Number of degenerate triangles (zero or near-zero area)
    pub degenerate: usize,
    /// Number of triangles touching NaN/Inf coordinates
    pub invalid_coords: usize,
    /// Number of triangles referencing a missing vertex
    pub out_of_range: usize,
    /// Normals, texture coordinates and positions differ in length
    pub misaligned: bool,
    /// Warning messages for issues found
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Check if the mesh passed validation without critical issues
    pub fn is_valid(&self) -> bool {
        self.invalid_coords == 0 && self.out_of_range == 0 && !self.misaligned
    }

    /// Check if the mesh has any issues at all
    pub fn has_issues(&self) -> bool {
        !self.is_valid() || self.degenerate > 0
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        if !self.has_issues() {
            format!("Mesh valid: {} triangles, no issues", self.total)
        } else {
            format!(
                "Mesh issues: {} total, {} degenerate, {} invalid coords, {} out of range",
                self.total, self.degenerate, self.invalid_coords, self.out_of_range
            )
        }
    }
}

/// Minimum area threshold for non-degenerate triangles (square meters)
const MIN_TRIANGLE_AREA: f32 = 1e-10;

enum FaceCheck {
    Ok,
    Degenerate,
    InvalidCoords,
    OutOfRange,
}

fn check_face(mesh: &Mesh, face: &[u32]) -> FaceCheck {
    let mut vertices = [[0.0f32; 3]; 3];
    for (slot, &index) in vertices.iter_mut().zip(face) {
        match mesh.positions.get(index as usize) {
            Some(p) => *slot = *p,
            None => return FaceCheck::OutOfRange,
        }
    }
    if vertices.iter().flatten().any(|c| !c.is_finite()) {
        return FaceCheck::InvalidCoords;
    }
    if triangle_area(&vertices) < MIN_TRIANGLE_AREA {
        return FaceCheck::Degenerate;
    }
    FaceCheck::Ok
}

/// Validate a mesh and return a detailed report
pub fn validate_mesh(mesh: &Mesh) -> ValidationResult {
    let mut result = ValidationResult {
        total: mesh.triangle_count(),
        misaligned: mesh.normals.len() != mesh.positions.len()
            || mesh.tex_coords.len() != mesh.positions.len(),
        ..Default::default()
    };

    if result.misaligned {
        result.warnings.push(format!(
            "{}: {} positions, {} normals, {} texture coordinates",
            mesh.name,
            mesh.positions.len(),
            mesh.normals.len(),
            mesh.tex_coords.len()
        ));
    }
    if mesh.indices.len() % 3 != 0 {
        result.warnings.push(format!(
            "{}: {} trailing indices ignored",
            mesh.name,
            mesh.indices.len() % 3
        ));
    }

    for (i, face) in mesh.indices.chunks_exact(3).enumerate() {
        match check_face(mesh, face) {
            FaceCheck::Ok => {}
            FaceCheck::Degenerate => result.degenerate += 1,
            FaceCheck::InvalidCoords => {
                result.invalid_coords += 1;
                result
                    .warnings
                    .push(format!("{}: triangle {} has NaN/Inf coordinates", mesh.name, i));
            }
            FaceCheck::OutOfRange => {
                result.out_of_range += 1;
                result
                    .warnings
                    .push(format!("{}: triangle {} references a missing vertex", mesh.name, i));
            }
        }
    }

    if result.degenerate > 0 {
        result.warnings.push(format!(
            "{}: {} degenerate triangles detected",
            mesh.name, result.degenerate
        ));
    }

    result
}

/// True when the mesh can be handed to an exporter as is: non-empty, aligned
/// and every index in range
pub fn is_renderable(mesh: &Mesh) -> bool {
    !mesh.is_empty()
        && mesh.indices.len() % 3 == 0
        && mesh.normals.len() == mesh.positions.len()
        && mesh.tex_coords.len() == mesh.positions.len()
        && mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.positions.len())
}

/// True when at least one triangle survives [`remove_degenerate`]
pub fn has_visible_faces(mesh: &Mesh) -> bool {
    mesh.indices
        .chunks_exact(3)
        .any(|face| matches!(check_face(mesh, face), FaceCheck::Ok))
}

/// Calculate the area of a triangle from its vertices
fn triangle_area(vertices: &[[f32; 3]; 3]) -> f32 {
    let v0 = vertices[0];
    let v1 = vertices[1];
    let v2 = vertices[2];

    let edge_a = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let edge_b = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let cx = edge_a[1] * edge_b[2] - edge_a[2] * edge_b[1];
    let cy = edge_a[2] * edge_b[0] - edge_a[0] * edge_b[2];
    let cz = edge_a[0] * edge_b[1] - edge_a[1] * edge_b[0];

    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}

/// Drop degenerate, invalid and out-of-range triangles from a mesh
///
/// Vertices are left in place; only the index list shrinks.
pub fn remove_degenerate(mesh: &mut Mesh) {
    let view: &Mesh = mesh;
    let kept: Vec<u32> = view
        .indices
        .chunks_exact(3)
        .filter(|face| matches!(check_face(view, face), FaceCheck::Ok))
        .flatten()
        .copied()
        .collect();
    mesh.indices = kept;
}

/// Validate and clean a mesh in one pass
///
/// Returns the report describing the mesh before cleaning.
pub fn validate_and_fix(mesh: &mut Mesh) -> ValidationResult {
    let report = validate_mesh(mesh);
    if report.has_issues() {
        remove_degenerate(mesh);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ribbon::{UP, append_fallback_quad};

    fn mesh_with(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> Mesh {
        let mut mesh = Mesh::new("test");
        for &v in vertices {
            mesh.add_vertex(v, UP, [0.0, 0.0]);
        }
        for f in faces {
            mesh.add_triangle(f[0], f[1], f[2]);
        }
        mesh
    }

    #[test]
    fn test_valid_mesh() {
        let mut mesh = Mesh::new("quad");
        append_fallback_quad(&mut mesh, 5.0, 3.5);

        let result = validate_mesh(&mesh);
        assert_eq!(result.total, 2);
        assert!(!result.has_issues());
        assert!(is_renderable(&mesh));
    }

    #[test]
    fn test_degenerate_triangle_collinear() {
        let mesh = mesh_with(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2], [0, 1, 3]],
        );

        let result = validate_mesh(&mesh);
        assert_eq!(result.degenerate, 1);
        assert!(result.is_valid());
        assert!(result.has_issues());
    }

    #[test]
    fn test_invalid_coords_nan() {
        let mesh = mesh_with(
            &[[f32::NAN, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );

        let result = validate_mesh(&mesh);
        assert_eq!(result.invalid_coords, 1);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_out_of_range_index() {
        let mesh = mesh_with(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &[[0, 1, 7]]);

        let result = validate_mesh(&mesh);
        assert_eq!(result.out_of_range, 1);
        assert!(!is_renderable(&mesh));
    }

    #[test]
    fn test_misaligned_attributes() {
        let mut mesh = Mesh::new("quad");
        append_fallback_quad(&mut mesh, 5.0, 1.0);
        mesh.tex_coords.pop();

        assert!(validate_mesh(&mesh).misaligned);
        assert!(!is_renderable(&mesh));
    }

    #[test]
    fn test_empty_mesh_not_renderable() {
        assert!(!is_renderable(&Mesh::new("empty")));
    }

    #[test]
    fn test_validate_and_fix() {
        let mut mesh = mesh_with(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 3], [0, 1, 2]],
        );

        let report = validate_and_fix(&mut mesh);
        assert_eq!(report.total, 2);
        assert_eq!(report.degenerate, 1);
        assert_eq!(mesh.indices, vec![0, 1, 3]);
    }

    #[test]
    fn test_visible_faces() {
        let flat = mesh_with(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );
        assert!(!has_visible_faces(&flat));
        assert!(!has_visible_faces(&Mesh::new("empty")));

        let mut quad = Mesh::new("quad");
        append_fallback_quad(&mut quad, 5.0, 1.0);
        assert!(has_visible_faces(&quad));
    }

    #[test]
    fn test_triangle_area() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let area = triangle_area(&vertices);
        assert!((area - 0.5).abs() < 0.001);
    }
}
