//! The two demos, each a [`crate::flow::GraphicsFlow`] with a ready-made
//! constructor and a `run_*` entry point.

pub mod particles;
pub mod shader_gallery;

pub use particles::{ParticlesFlow, ParticlesState, particles_constructor, run_particles};
pub use shader_gallery::{
    GalleryState, ShaderGalleryFlow, run_shader_gallery, shader_gallery_constructor,
};
