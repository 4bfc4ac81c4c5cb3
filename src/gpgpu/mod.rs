//! GPU-evolved particle state.
//!
//! Particle positions and decay live in a square float texture (see [`grid`]).
//! Each frame an off-screen pass reads the current state through a flow field
//! and writes the next one into the other half of a [`ping_pong::PingPong`]
//! pair; the points pipeline then reads whichever state is current.

pub mod grid;
pub mod particles;
pub mod ping_pong;

use crate::data_structures::material::Color;

/// Where the initial particle positions come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleSource {
    /// Vertices of a UV sphere of the given radius.
    Sphere { radius: f32 },
    /// Vertices of every mesh in a glTF/GLB asset.
    Model(String),
}

/// Flow-field tunables, all exposed in the debug panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowField {
    pub influence: f32,
    pub strength: f32,
    pub frequency: f32,
}

impl Default for FlowField {
    fn default() -> Self {
        Self {
            influence: 0.5,
            strength: 2.0,
            frequency: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticlesConfig {
    /// Base sprite size, multiplied by each particle's random size factor.
    pub size: f32,
    pub flow_field: FlowField,
    pub clear_colour: Color,
    pub source: ParticleSource,
    /// Seed for decay seeds and size factors.
    pub seed: u64,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            size: 0.07,
            flow_field: FlowField::default(),
            clear_colour: Color::new(0x29 as f32 / 255.0, 0x19 as f32 / 255.0, 0x1f as f32 / 255.0),
            source: ParticleSource::Sphere { radius: 3.0 },
            seed: 0x5eed,
        }
    }
}
