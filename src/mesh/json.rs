use super::{Material, MaterialCatalog, Mesh};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct SceneDocument<'a> {
    generator: &'static str,
    materials: Vec<&'a Material>,
    meshes: Vec<MeshEntry<'a>>,
}

#[derive(Serialize)]
struct MeshEntry<'a> {
    name: &'a str,
    material: &'a str,
    positions: &'a [[f32; 3]],
    normals: &'a [[f32; 3]],
    tex_coords: &'a [[f32; 2]],
    indices: &'a [u32],
}

impl<'a> MeshEntry<'a> {
    fn new(mesh: &'a Mesh, material: &'a Material) -> Self {
        Self {
            name: &mesh.name,
            material: &material.name,
            positions: &mesh.positions,
            normals: &mesh.normals,
            tex_coords: &mesh.tex_coords,
            indices: &mesh.indices,
        }
    }
}

/// Write meshes and the material catalog as a JSON scene document
///
/// Meshes without a material are written with the asphalt material.
pub fn write_scene_json<'a>(
    path: &Path,
    meshes: impl IntoIterator<Item = &'a Mesh>,
    catalog: &MaterialCatalog,
) -> Result<()> {
    let meshes: Vec<&Mesh> = meshes.into_iter().collect();

    let missing = catalog.unresolved(meshes.iter().copied());
    if !missing.is_empty() {
        bail!("Meshes reference unknown materials: {}", missing.join(", "));
    }

    let entries = meshes
        .into_iter()
        .map(|mesh| {
            let material = catalog
                .resolve(mesh)
                .with_context(|| format!("No material for mesh {}", mesh.name))?;
            Ok(MeshEntry::new(mesh, material))
        })
        .collect::<Result<Vec<_>>>()?;

    let document = SceneDocument {
        generator: concat!("lanemesh ", env!("CARGO_PKG_VERSION")),
        materials: catalog.iter().collect(),
        meshes: entries,
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create scene file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)
        .with_context(|| format!("Failed to serialize scene: {}", path.display()))?;
    writer.flush()?;

    Ok(())
}
