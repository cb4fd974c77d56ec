use super::{Mesh, Triangle};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "lanemesh - Road Lane Surface STL";

/// Bytes of one facet record: normal, three vertices, attribute count
const FACET_SIZE: usize = 50;

fn encode_facet(buf: &mut Vec<u8>, tri: &Triangle) {
    let coords = tri.normal.iter().chain(tri.vertices.iter().flatten());
    buf.extend(coords.flat_map(|c| c.to_le_bytes()));
    buf.extend_from_slice(&0u16.to_le_bytes());
}

/// Write every mesh's triangles to one binary STL file
///
/// Layout: 80 byte header, little-endian u32 facet count, then one
/// [`FACET_SIZE`] record per triangle. Face normals come from the winding.
/// STL has no per-vertex attributes so texture coordinates and materials are
/// dropped.
pub fn write_stl<'a>(path: &Path, meshes: impl IntoIterator<Item = &'a Mesh>) -> Result<()> {
    let mut facets = Vec::new();
    let mut count: u32 = 0;
    for mesh in meshes {
        for tri in mesh.triangles() {
            encode_facet(&mut facets, &tri);
            count += 1;
        }
    }

    let mut header = [b' '; 80];
    header[..HEADER.len()].copy_from_slice(HEADER.as_bytes());

    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;
    writer.write_all(&facets)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write STL file: {}", path.display()))?;

    Ok(())
}

/// Get the file size of an STL with the given number of triangles
pub fn estimate_stl_size(triangle_count: usize) -> usize {
    80 + 4 + triangle_count * FACET_SIZE
}
