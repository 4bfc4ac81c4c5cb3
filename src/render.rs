//! Render composition.
//!
//! Flows describe what to draw each frame with a [`Render`] value. The engine
//! walks it inside the frame's single render pass, binding the camera for
//! every variant.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Shaded<'a>`] is one indexed mesh drawn with its own pipeline and bind group
//!

use crate::{context::Context, gpgpu::particles::GpgpuParticles};

/// An indexed triangle mesh with the pipeline and material bind group
/// (group 1) to draw it with. Indices are `u32`.
pub struct Shaded<'a> {
    pub pipeline: &'a wgpu::RenderPipeline,
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub index_count: u32,
    pub bind_group: &'a wgpu::BindGroup,
}

/// Specifies what a flow draws this frame.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Points(GpgpuParticles)` renders the current particle state as sprites
/// - `Shaded(Shaded)` renders one mesh
///
pub enum Render<'a> {
    None,
    Points(&'a GpgpuParticles),
    Shaded(Shaded<'a>),
}

impl Render<'_> {
    pub(crate) fn draw(self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>) {
        match self {
            Render::None => (),
            Render::Points(particles) => particles.draw(render_pass, &ctx.camera.bind_group),
            Render::Shaded(shaded) => {
                if shaded.index_count == 0 {
                    log::warn!("you attempted to render a mesh without indices");
                    return;
                }
                render_pass.set_pipeline(shaded.pipeline);
                render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
                render_pass.set_bind_group(1, shaded.bind_group, &[]);
                render_pass.set_vertex_buffer(0, shaded.vertex.slice(..));
                render_pass.set_index_buffer(shaded.index.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..shaded.index_count, 0, 0..1);
            }
        }
    }
}

impl<'a> From<&'a GpgpuParticles> for Render<'a> {
    fn from(particles: &'a GpgpuParticles) -> Self {
        Render::Points(particles)
    }
}

impl<'a> From<Shaded<'a>> for Render<'a> {
    fn from(shaded: Shaded<'a>) -> Self {
        Render::Shaded(shaded)
    }
}
