use crate::{
    data_structures::texture::Texture,
    pipelines::basic::{PipelineState, mk_render_pipeline, state_texture_entry, uniform_entry},
};

/// Inputs of the particle integrator, matches `SimUniforms` in `gpgpu.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimUniforms {
    pub time: f32,
    pub delta_time: f32,
    pub flow_field_influence: f32,
    pub flow_field_strength: f32,
    pub flow_field_frequency: f32,
    pub _pad: [f32; 3],
}

/// uniforms, previous state, base state
pub fn mk_simulation_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
            state_texture_entry(1, wgpu::ShaderStages::FRAGMENT),
            state_texture_entry(2, wgpu::ShaderStages::FRAGMENT),
        ],
        label: Some("gpgpu_bind_group_layout"),
    })
}

pub fn mk_simulation_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("GPGPU Pipeline Layout"),
        bind_group_layouts: &[Some(layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("GPGPU Shader"),
        source: wgpu::ShaderSource::Wgsl(
            concat!(include_str!("noise.wgsl"), "\n", include_str!("gpgpu.wgsl")).into(),
        ),
    };

    mk_render_pipeline(
        device,
        "GPGPU Pipeline",
        &pipeline_layout,
        Texture::STATE_FORMAT,
        PipelineState::offscreen(),
        &[],
        shader,
    )
}
