//! Render pipelines and their WGSL sources.
//!
//! - `basic` builds pipelines from a shader and a [`basic::PipelineState`]
//! - `gpgpu` is the off-screen particle integrator
//! - `points` draws the particle state as round sprites
//! - `gallery` is the shader gallery program

pub mod basic;
pub mod gallery;
pub mod gpgpu;
pub mod points;
