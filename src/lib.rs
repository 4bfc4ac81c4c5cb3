//! flow-gpgpu
//!
//! Two real-time graphics demos on a small cross-platform wgpu engine that
//! runs natively and in the browser (WebGL2):
//!
//! - GPGPU flow-field particles: particle state lives in a float texture that
//!   an off-screen pass advances every frame through a simplex-noise flow field
//! - a shader gallery that switches one mesh between six procedural shaders
//!
//! High-level modules
//! - `camera`: orbit camera, projection and the camera uniform
//! - `context`: GPU device, surface, depth buffer, camera and viewport
//! - `data_structures`: scene graph, transforms, materials, geometry, textures
//! - `debug_panel`: keyboard-driven two-way bindings to runtime values
//! - `demos`: the particles and shader gallery flows
//! - `flow`: event loop and the `GraphicsFlow` lifecycle
//! - `gallery`: shader gallery state machine
//! - `gpgpu`: particle state textures, ping-pong targets and the integrator
//! - `overlay`: debug panel text over the frame (`ui` feature)
//! - `pick`: pointer rays and mesh hit tests
//! - `pipelines`: render pipelines and WGSL sources
//! - `render`: what a flow draws each frame
//! - `resources`: async asset loading
//! - `viewport`: logical size, pixel ratio and drawing-buffer resolution
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod debug_panel;
pub mod demos;
pub mod flow;
pub mod gallery;
pub mod gpgpu;
#[cfg(feature = "ui")]
pub mod overlay;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Web entry point. `?demo=shaders` runs the shader gallery, anything else the particles.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    if let Err(e) = require_canvas() {
        panic!("{:#}", e);
    }
    let demo = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default();
    let result = if demo.contains("demo=shaders") {
        demos::run_shader_gallery(gallery::GalleryConfig::default())
    } else {
        demos::run_particles(gpgpu::ParticlesConfig::default())
    };
    if let Err(e) = result {
        wasm_bindgen::throw_str(&format!("{:#}", e));
    }
}

#[cfg(target_arch = "wasm32")]
fn require_canvas() -> anyhow::Result<()> {
    use anyhow::Context as _;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .context("no document to render into")?;
    document
        .get_element_by_id(flow::CANVAS_ID)
        .with_context(|| format!("missing <canvas id=\"{}\">", flow::CANVAS_ID))?;
    Ok(())
}
