//! GPU side of the particle simulation: state targets, the integrator pass
//! and the point-cloud draw.

use anyhow::ensure;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::Texture,
    gpgpu::{FlowField, grid::ParticleGrid, grid::ParticleVertex, ping_pong::PingPong},
    pipelines::{
        gpgpu::{SimUniforms, mk_simulation_layout, mk_simulation_pipeline},
        points::{PointsUniforms, mk_points_layout, mk_points_pipeline},
    },
};

/// One state texture together with the bind groups that read it.
#[derive(Debug)]
pub struct StateTarget {
    pub texture: Texture,
    simulation_bind_group: wgpu::BindGroup,
    points_bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct GpgpuParticles {
    grid: ParticleGrid,
    base: Texture,
    targets: PingPong<StateTarget>,
    sim_uniforms: SimUniforms,
    sim_buffer: wgpu::Buffer,
    points_uniforms: PointsUniforms,
    points_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    simulation_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
}

impl GpgpuParticles {
    /**
     * Upload the initial state (which doubles as the base state particles respawn to)
     * and the per-particle attributes, and build both pipelines.
     *
     * `initial_state` must hold `grid.texel_count()` texels and `vertices` one entry
     * per particle.
     */
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        grid: ParticleGrid,
        initial_state: &[[f32; 4]],
        vertices: &[ParticleVertex],
    ) -> anyhow::Result<Self> {
        ensure!(
            vertices.len() == grid.count(),
            "expected {} particle vertices, got {}",
            grid.count(),
            vertices.len()
        );
        let size = grid.size();

        let base = Texture::create_state_texture(device, size, "particles base");
        base.write_state(queue, size, initial_state)?;
        let front = Texture::create_state_texture(device, size, "particles state a");
        front.write_state(queue, size, initial_state)?;
        let back = Texture::create_state_texture(device, size, "particles state b");

        let sim_uniforms = SimUniforms::default();
        let sim_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("GPGPU Uniform Buffer"),
            contents: bytemuck::cast_slice(&[sim_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let points_uniforms = PointsUniforms {
            resolution: [1.0, 1.0],
            size: 0.0,
            _pad: 0.0,
        };
        let points_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Uniform Buffer"),
            contents: bytemuck::cast_slice(&[points_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // wgpu rejects empty vertex buffers.
        let placeholder = [ParticleVertex {
            uv: [0.5, 0.5],
            size: 0.0,
            color: [0.0; 3],
        }];
        let instance_contents: &[ParticleVertex] = if vertices.is_empty() {
            &placeholder
        } else {
            vertices
        };
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Instance Buffer"),
            contents: bytemuck::cast_slice(instance_contents),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let simulation_layout = mk_simulation_layout(device);
        let points_layout = mk_points_layout(device);
        let simulation_pipeline = mk_simulation_pipeline(device, &simulation_layout);
        let points_pipeline =
            mk_points_pipeline(device, color_format, camera_bind_group_layout, &points_layout);

        let mk_target = |texture: Texture, label: &str| StateTarget {
            simulation_bind_group: device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &simulation_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: sim_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&base.view),
                    },
                ],
                label: Some(label),
            }),
            points_bind_group: device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &points_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: points_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                ],
                label: Some(label),
            }),
            texture,
        };
        let targets = PingPong::new(
            mk_target(front, "particles_bind_group_a"),
            mk_target(back, "particles_bind_group_b"),
        );

        log::info!(
            "GPGPU particles ready: {} particles in a {}x{} state texture",
            grid.count(),
            size,
            size
        );

        Ok(Self {
            grid,
            base,
            targets,
            sim_uniforms,
            sim_buffer,
            points_uniforms,
            points_buffer,
            instance_buffer,
            simulation_pipeline,
            points_pipeline,
        })
    }

    pub fn grid(&self) -> &ParticleGrid {
        &self.grid
    }

    /// The state particles respawn to.
    pub fn base(&self) -> &Texture {
        &self.base
    }

    /// The texture holding the current state.
    pub fn current(&self) -> &Texture {
        &self.targets.front().texture
    }

    pub fn generation(&self) -> u64 {
        self.targets.generation()
    }

    /// Sprite uniforms as last written by [`Self::update`].
    pub fn points_uniforms(&self) -> &PointsUniforms {
        &self.points_uniforms
    }

    /// Store this frame's integrator inputs and sprite uniforms on the GPU.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        elapsed: f32,
        delta: f32,
        flow_field: FlowField,
        size: f32,
        resolution: [f32; 2],
    ) {
        self.sim_uniforms.time = elapsed;
        self.sim_uniforms.delta_time = delta;
        self.sim_uniforms.flow_field_influence = flow_field.influence;
        self.sim_uniforms.flow_field_strength = flow_field.strength;
        self.sim_uniforms.flow_field_frequency = flow_field.frequency;
        queue.write_buffer(&self.sim_buffer, 0, bytemuck::cast_slice(&[self.sim_uniforms]));

        self.points_uniforms.resolution = resolution;
        self.points_uniforms.size = size;
        queue.write_buffer(
            &self.points_buffer,
            0,
            bytemuck::cast_slice(&[self.points_uniforms]),
        );
    }

    /// Encode one integrator step: read the current state, write the other
    /// target, then make it current.
    pub fn compute(&mut self, encoder: &mut wgpu::CommandEncoder) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GPGPU Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.back().texture.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.simulation_pipeline);
            pass.set_bind_group(0, &self.targets.front().simulation_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.targets.swap();
    }

    /// Draw one sprite per particle from the current state.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        if self.grid.draw_count() == 0 {
            return;
        }
        render_pass.set_pipeline(&self.points_pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.targets.front().points_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.draw(0..6, 0..self.grid.draw_count());
    }

    /// Copy the current state back to the CPU, one texel per entry in row-major order.
    pub async fn read_state(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Vec<[f32; 4]>> {
        let size = self.grid.size();
        let texel_bytes = std::mem::size_of::<[f32; 4]>() as u32;
        let unpadded_row = size * texel_bytes;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle State Readback"),
            size: (padded_row * size) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Particle State Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.current().texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(size),
                },
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow::anyhow!("readback channel closed"))??;

        let data = buffer_slice.get_mapped_range();
        let mut texels = Vec::with_capacity(self.grid.texel_count());
        for row in data.chunks(padded_row as usize) {
            let row: &[[f32; 4]] = bytemuck::cast_slice(&row[..unpadded_row as usize]);
            texels.extend_from_slice(row);
        }
        drop(data);
        output_buffer.unmap();
        Ok(texels)
    }
}
