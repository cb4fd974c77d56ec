//! lanemesh - Generate lane surface and lane marking meshes from parametric
//! road network descriptions

pub mod config;
pub mod domain;
pub mod geometry;
pub mod input;
pub mod layers;
pub mod mesh;
