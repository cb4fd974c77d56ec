use std::collections::BTreeMap;

use serde::Serialize;

use super::Mesh;

pub const ASPHALT: &str = "Asphalt";
pub const SHOULDER: &str = "Shoulder";
pub const LANE_MARKING_WHITE: &str = "LaneMarkingWhite";
pub const LANE_MARKING_YELLOW: &str = "LaneMarkingYellow";

/// A named surface material with an RGBA diffuse color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 4],
}

impl Material {
    pub fn new(name: impl Into<String>, r: f32, g: f32, b: f32) -> Self {
        Self {
            name: name.into(),
            diffuse: [r, g, b, 1.0],
        }
    }
}

/// Materials an exporter can reference by name
#[derive(Debug, Clone, Serialize)]
pub struct MaterialCatalog {
    materials: BTreeMap<String, Material>,
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        let mut catalog = Self::new();
        catalog.insert(Material::new(ASPHALT, 0.3, 0.3, 0.3));
        catalog.insert(Material::new(SHOULDER, 0.4, 0.4, 0.4));
        catalog.insert(Material::new(LANE_MARKING_WHITE, 1.0, 1.0, 1.0));
        catalog.insert(Material::new(LANE_MARKING_YELLOW, 1.0, 1.0, 0.0));
        catalog
    }
}

impl MaterialCatalog {
    /// A catalog with no materials
    pub fn new() -> Self {
        Self {
            materials: BTreeMap::new(),
        }
    }

    /// Add or replace a material
    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Material a mesh renders with; meshes without one use asphalt
    pub fn resolve(&self, mesh: &Mesh) -> Option<&Material> {
        self.get(mesh.material.as_deref().unwrap_or(ASPHALT))
    }

    /// Material names `meshes` render with that the catalog lacks
    pub fn unresolved<'a>(&self, meshes: impl IntoIterator<Item = &'a Mesh>) -> Vec<String> {
        let mut missing: Vec<String> = meshes
            .into_iter()
            .map(|m| m.material.as_deref().unwrap_or(ASPHALT))
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = MaterialCatalog::default();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(ASPHALT).unwrap().diffuse, [0.3, 0.3, 0.3, 1.0]);
        assert_eq!(
            catalog.get(LANE_MARKING_YELLOW).unwrap().diffuse,
            [1.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_resolve_defaults_to_asphalt() {
        let catalog = MaterialCatalog::default();
        let bare = Mesh::new("1_1");
        assert_eq!(catalog.resolve(&bare).unwrap().name, ASPHALT);

        let marked = Mesh::new("1_1_mark").with_material(LANE_MARKING_WHITE);
        assert_eq!(catalog.resolve(&marked).unwrap().name, LANE_MARKING_WHITE);
    }

    #[test]
    fn test_unresolved_names() {
        let mut catalog = MaterialCatalog::default();
        let meshes = [
            Mesh::new("a").with_material("Gravel"),
            Mesh::new("b").with_material(ASPHALT),
            Mesh::new("c").with_material("Gravel"),
        ];
        assert_eq!(catalog.unresolved(&meshes), vec!["Gravel".to_string()]);

        catalog.insert(Material::new("Gravel", 0.5, 0.45, 0.4));
        assert!(catalog.unresolved(&meshes).is_empty());

        let bare = [Mesh::new("d")];
        assert_eq!(MaterialCatalog::new().unresolved(&bare), vec![ASPHALT.to_string()]);
    }
}
