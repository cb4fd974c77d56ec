use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::mesh::{Mesh, MeshError, append_fallback_quad, has_visible_faces};

/// What a mesh represents for its lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Surface,
    Mark,
}

/// Identity of one output mesh
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshKey {
    pub road_id: String,
    pub lane_id: i32,
    pub kind: MeshKind,
}

impl MeshKey {
    pub fn surface(road_id: &str, lane_id: i32) -> Self {
        Self {
            road_id: road_id.to_string(),
            lane_id,
            kind: MeshKind::Surface,
        }
    }

    pub fn mark(road_id: &str, lane_id: i32) -> Self {
        Self {
            road_id: road_id.to_string(),
            lane_id,
            kind: MeshKind::Mark,
        }
    }
}

impl fmt::Display for MeshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MeshKind::Surface => write!(f, "{}_{}", self.road_id, self.lane_id),
            MeshKind::Mark => write!(f, "{}_{}_mark", self.road_id, self.lane_id),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("mesh '{key}' failed: {source}")]
    Ribbon {
        key: String,
        #[source]
        source: MeshError,
    },
}

/// A lane mesh that could not be built and was left out of the output
#[derive(Debug, PartialEq)]
pub struct BuildFailure {
    pub key: String,
    pub error: BuildError,
}

#[derive(Debug)]
struct Slot {
    mesh: Mesh,
    fallback_width: f64,
    /// Registered without real content; the next real registration wins
    placeholder: bool,
}

impl Slot {
    fn new(key: &MeshKey, material: &str, fallback_width: f64, placeholder: bool) -> Self {
        Self {
            mesh: Mesh::new(key.to_string()).with_material(material),
            fallback_width,
            placeholder,
        }
    }
}

/// Meshes under construction for one build, keyed by [`MeshKey`]
#[derive(Debug, Default)]
pub struct MeshSession {
    slots: BTreeMap<String, Slot>,
    failed: BTreeSet<String>,
    failures: Vec<BuildFailure>,
}

/// Finished meshes of a build plus the lanes that failed
#[derive(Debug, Default)]
pub struct MeshOutput {
    pub meshes: BTreeMap<String, Mesh>,
    pub failures: Vec<BuildFailure>,
}

impl MeshOutput {
    pub fn vertex_count(&self) -> usize {
        self.meshes.values().map(Mesh::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.values().map(Mesh::triangle_count).sum()
    }
}

impl MeshSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a mesh exists for `key`
    ///
    /// The first registration decides the material and the width of the
    /// rectangle used if the mesh ends up empty, unless it was a placeholder.
    pub fn register(&mut self, key: &MeshKey, material: &str, fallback_width: f64) {
        match self.slots.entry(key.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(Slot::new(key, material, fallback_width, false));
            }
            Entry::Occupied(mut entry) => {
                let slot = entry.get_mut();
                if slot.placeholder {
                    slot.mesh.material = Some(material.to_string());
                    slot.fallback_width = fallback_width;
                    slot.placeholder = false;
                }
            }
        }
    }

    /// Make sure a mesh exists for `key` without claiming its material
    ///
    /// Used for lanes that have nothing to draw in one section but may in a
    /// later one.
    pub fn register_placeholder(&mut self, key: &MeshKey, material: &str, fallback_width: f64) {
        self.slots
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(key, material, fallback_width, true));
    }

    /// Run `build` against the mesh for `key`
    ///
    /// Too few samples only leave the mesh for the fallback. Any other error
    /// marks the key failed; failed keys take no further geometry. `build` must
    /// leave the mesh untouched when it fails.
    pub fn build<F>(&mut self, key: &MeshKey, build: F)
    where
        F: FnOnce(&mut Mesh) -> Result<(), MeshError>,
    {
        let name = key.to_string();
        if self.failed.contains(&name) {
            return;
        }
        let Some(slot) = self.slots.get_mut(&name) else {
            log::debug!("Mesh {} built before registration, skipped", name);
            return;
        };

        match build(&mut slot.mesh) {
            Ok(()) => {}
            Err(MeshError::TooFewPoints { count }) => {
                log::debug!("Mesh {}: span produced {} samples", name, count);
            }
            Err(source) => self.fail(name, source),
        }
    }

    fn fail(&mut self, key: String, source: MeshError) {
        let error = BuildError::Ribbon {
            key: key.clone(),
            source,
        };
        log::warn!("{}", error);
        self.failed.insert(key.clone());
        self.failures.push(BuildFailure { key, error });
    }

    pub fn mesh(&self, key: &MeshKey) -> Option<&Mesh> {
        self.slots.get(&key.to_string()).map(|s| &s.mesh)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    /// Take over another session's meshes and failures
    ///
    /// Sessions are built per road, so keys never collide.
    pub fn merge(&mut self, other: MeshSession) {
        self.slots.extend(other.slots);
        self.failed.extend(other.failed);
        self.failures.extend(other.failures);
    }

    /// Drop failed meshes and give every empty mesh its fallback rectangle
    ///
    /// A mesh whose triangles all have zero area (a zero-width lane) counts as
    /// empty.
    pub fn finish(self, fallback_length: f64) -> MeshOutput {
        let failed = self.failed;
        let meshes = self
            .slots
            .into_iter()
            .filter(|(key, _)| !failed.contains(key))
            .map(|(key, mut slot)| {
                if !has_visible_faces(&slot.mesh) {
                    log::debug!("Mesh {} has no visible faces, using fallback rectangle", key);
                    slot.mesh.clear();
                    append_fallback_quad(&mut slot.mesh, fallback_length, slot.fallback_width);
                }
                (key, slot.mesh)
            })
            .collect();

        MeshOutput {
            meshes,
            failures: self.failures,
        }
    }
}
