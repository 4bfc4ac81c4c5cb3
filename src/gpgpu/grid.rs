//! Mapping between particles and texels of the square state texture.

use anyhow::ensure;
use rand::Rng;

/// Per-particle vertex data read by the points pipeline, one entry per instance.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    /// Texel centre of the particle's state in the state texture.
    pub uv: [f32; 2],
    /// Random size factor in `[0, 1)`.
    pub size: f32,
    pub color: [f32; 3],
}

impl ParticleVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// `N` particles laid out row-major in a `size × size` texture.
///
/// `size` is the smallest side whose square holds every particle. Texels past
/// `N` are slack: they are simulated along with the rest but never drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleGrid {
    count: usize,
    size: u32,
}

impl ParticleGrid {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            size: side_for(count),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texel_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// Number of instances to draw. Slack texels are excluded.
    pub fn draw_count(&self) -> u32 {
        self.count as u32
    }

    /// Texture coordinate of the centre of particle `i`'s texel.
    pub fn uv(&self, i: usize) -> [f32; 2] {
        let size = self.size as usize;
        let side = self.size as f32;
        [
            ((i % size) as f32 + 0.5) / side,
            ((i / size) as f32 + 0.5) / side,
        ]
    }

    /// Texel (column, row) of particle `i`.
    pub fn texel(&self, i: usize) -> (u32, u32) {
        let size = self.size as usize;
        ((i % size) as u32, (i / size) as u32)
    }

    /// Initial contents of the state texture: `(x, y, z, decay)` per particle
    /// with a random decay seed, zeroes in the slack.
    pub fn initial_state(
        &self,
        positions: &[[f32; 3]],
        rng: &mut impl Rng,
    ) -> anyhow::Result<Vec<[f32; 4]>> {
        ensure!(
            positions.len() == self.count,
            "grid holds {} particles but {} positions were given",
            self.count,
            positions.len()
        );
        let mut texels = vec![[0.0; 4]; self.texel_count()];
        for (texel, p) in texels.iter_mut().zip(positions) {
            *texel = [p[0], p[1], p[2], rng.random::<f32>()];
        }
        Ok(texels)
    }

    /// Per-instance attributes. Particles without a colour are white.
    pub fn particle_vertices(
        &self,
        colors: Option<&[[f32; 3]]>,
        rng: &mut impl Rng,
    ) -> Vec<ParticleVertex> {
        (0..self.count)
            .map(|i| ParticleVertex {
                uv: self.uv(i),
                size: rng.random::<f32>(),
                color: colors
                    .and_then(|c| c.get(i).copied())
                    .unwrap_or([1.0, 1.0, 1.0]),
            })
            .collect()
    }
}

/// `max(1, ceil(sqrt(count)))` without trusting float rounding.
fn side_for(count: usize) -> u32 {
    if count <= 1 {
        return 1;
    }
    let mut side = (count as f64).sqrt().ceil() as usize;
    while side * side < count {
        side += 1;
    }
    while side > 1 && (side - 1) * (side - 1) >= count {
        side -= 1;
    }
    side as u32
}
