//! Procedural geometry.
//!
//! The generators follow the vertex ordering of the classic WebGL primitives
//! (plane, UV sphere, cone, torus knot) so UVs and winding line up with shaders
//! written for them.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

/// Describes a mesh that can be (re)generated on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryDesc {
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
}

impl GeometryDesc {
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        GeometryDesc::Plane {
            width,
            height,
            width_segments,
            height_segments,
        }
    }

    /// Unit sphere with 32 x 16 segments.
    pub fn sphere() -> Self {
        GeometryDesc::Sphere {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }

    pub fn cone(radius: f32, height: f32) -> Self {
        GeometryDesc::Cone {
            radius,
            height,
            radial_segments: 32,
        }
    }

    pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32) -> Self {
        GeometryDesc::TorusKnot {
            radius,
            tube,
            tubular_segments,
            radial_segments,
            p: 2,
            q: 3,
        }
    }

    pub fn build(&self) -> MeshData {
        match *self {
            GeometryDesc::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => plane(width, height, width_segments.max(1), height_segments.max(1)),
            GeometryDesc::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere(radius, width_segments.max(3), height_segments.max(2)),
            GeometryDesc::Cone {
                radius,
                height,
                radial_segments,
            } => cone(radius, height, radial_segments.max(3)),
            GeometryDesc::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => torus_knot(
                radius,
                tube,
                tubular_segments.max(3),
                radial_segments.max(3),
                p,
                q,
            ),
        }
    }
}

/// CPU-side mesh: one entry per vertex in each attribute array.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn push(&mut self, position: Vector3<f32>, normal: Vector3<f32>, uv: [f32; 2]) {
        self.positions.push(position.into());
        self.normals.push(normal.into());
        self.uvs.push(uv);
    }

    /// Interleave the attributes with a per-vertex random value produced by `random`.
    pub fn to_vertices(&self, mut random: impl FnMut() -> f32) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(self.normals.iter())
            .zip(self.uvs.iter())
            .map(|((&position, &normal), &uv)| MeshVertex {
                position,
                normal,
                uv,
                random: random(),
            })
            .collect()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub random: f32,
}

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

fn plane(width: f32, height: f32, grid_x: u32, grid_y: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half_width = width / 2.0;
    let half_height = height / 2.0;
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;
    let row = grid_x + 1;

    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - half_height;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - half_width;
            mesh.push(
                Vector3::new(x, -y, 0.0),
                Vector3::unit_z(),
                [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32],
            );
        }
    }

    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = (ix + 1) + row * (iy + 1);
            let d = (ix + 1) + row * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let position = Vector3::new(
                -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
            );
            let normal = if position.magnitude2() > 0.0 {
                position.normalize()
            } else {
                Vector3::unit_y()
            };
            mesh.push(position, normal, [u, 1.0 - v]);
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // The poles collapse into a single point, so only one triangle per quad there.
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn cone(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half_height = height / 2.0;
    let slope = radius / height;
    let row = radial_segments + 1;

    // Side: apex ring (radius 0) on top, base ring below.
    for iy in 0..=1u32 {
        let v = iy as f32;
        let ring_radius = v * radius;
        for ix in 0..=radial_segments {
            let u = ix as f32 / radial_segments as f32;
            let theta = u * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            mesh.push(
                Vector3::new(ring_radius * sin, -v * height + half_height, ring_radius * cos),
                Vector3::new(sin, slope, cos).normalize(),
                [u, 1.0 - v],
            );
        }
    }
    // The apex ring has zero radius, so each quad degenerates to one triangle.
    for ix in 0..radial_segments {
        mesh.indices.extend_from_slice(&[row + ix, row + ix + 1, ix + 1]);
    }

    // Base cap facing down.
    let center_start = mesh.vertex_count() as u32;
    for _ in 0..radial_segments {
        mesh.push(
            Vector3::new(0.0, -half_height, 0.0),
            -Vector3::unit_y(),
            [0.5, 0.5],
        );
    }
    let ring_start = mesh.vertex_count() as u32;
    for ix in 0..=radial_segments {
        let theta = ix as f32 / radial_segments as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        mesh.push(
            Vector3::new(radius * sin, -half_height, radius * cos),
            -Vector3::unit_y(),
            [cos * 0.5 + 0.5, -sin * 0.5 + 0.5],
        );
    }
    for ix in 0..radial_segments {
        let center = center_start + ix;
        let ring = ring_start + ix;
        mesh.indices.extend_from_slice(&[ring + 1, ring, center]);
    }
    mesh
}

fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> MeshData {
    let mut mesh = MeshData::default();
    let (p, q) = (p as f32, q as f32);
    let curve = |u: f32| {
        let quo_p = q / p * u;
        let cs = quo_p.cos();
        Vector3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * u.sin() * 0.5,
            radius * quo_p.sin() * 0.5,
        )
    };

    for j in 0..=tubular_segments {
        let u = j as f32 / tubular_segments as f32 * p * PI * 2.0;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);
        // Frenet-like frame along the curve.
        let tangent = p2 - p1;
        let binormal = tangent.cross(p2 + p1);
        let normal = binormal.cross(tangent).normalize();
        let binormal = binormal.normalize();

        for i in 0..=radial_segments {
            let v = i as f32 / radial_segments as f32 * PI * 2.0;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let position = p1 + normal * cx + binormal * cy;
            mesh.push(
                position,
                (position - p1).normalize(),
                [
                    j as f32 / tubular_segments as f32,
                    i as f32 / radial_segments as f32,
                ],
            );
        }
    }

    let row = radial_segments + 1;
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}
