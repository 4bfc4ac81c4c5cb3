use crate::{
    data_structures::texture::Texture,
    gpgpu::grid::ParticleVertex,
    pipelines::basic::{PipelineState, mk_render_pipeline, state_texture_entry, uniform_entry},
};

/// Matches `PointsUniforms` in `points.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniforms {
    /// Drawing-buffer size in pixels.
    pub resolution: [f32; 2],
    pub size: f32,
    pub _pad: f32,
}

pub fn mk_points_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            state_texture_entry(1, wgpu::ShaderStages::VERTEX),
        ],
        label: Some("points_bind_group_layout"),
    })
}

pub fn mk_points_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    points_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Points Pipeline Layout"),
        bind_group_layouts: &[Some(camera_bind_group_layout), Some(points_bind_group_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Points Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
    };

    // Sprites always face the camera, so culling never matters.
    let state = PipelineState {
        cull_mode: None,
        ..PipelineState::opaque(Texture::DEPTH_FORMAT)
    };

    mk_render_pipeline(
        device,
        "Points Pipeline",
        &pipeline_layout,
        color_format,
        state,
        &[ParticleVertex::desc()],
        shader,
    )
}
