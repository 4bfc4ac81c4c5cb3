//! Engine data structures: transforms, materials, geometry, scene graphs and textures.
//!
//! - `transform` holds position / rotation / scale and their composition
//! - `material` contains shared materials and colours
//! - `geometry` generates procedural meshes (plane, sphere, cone, torus knot)
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod geometry;
pub mod material;
pub mod scene_graph;
pub mod texture;
pub mod transform;
