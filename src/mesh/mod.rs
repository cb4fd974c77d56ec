pub mod builder;
pub mod json;
pub mod material;
pub mod ribbon;
pub mod stl;
pub mod validation;

pub use builder::{Mesh, Triangle};
pub use json::write_scene_json;
pub use material::{Material, MaterialCatalog};
pub use ribbon::{EdgePair, MeshError, append_fallback_quad, append_ribbon};
pub use stl::write_stl;
pub use validation::{
    ValidationResult, has_visible_faces, is_renderable, validate_and_fix, validate_mesh,
};
