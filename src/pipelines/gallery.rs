use crate::{
    data_structures::{
        geometry::MeshVertex,
        material::{Blending, Material, Side},
        texture::Texture,
        transform::TransformRaw,
    },
    pipelines::basic::{PipelineState, mk_render_pipeline, uniform_entry},
};

/// Matches `GalleryUniforms` in `gallery.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GalleryUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub depth_color: [f32; 4],
    pub surface_color: [f32; 4],
    pub smoke_color: [f32; 4],
    pub hologram_color: [f32; 4],
    pub frequency: [f32; 2],
    pub big_waves_frequency: [f32; 2],
    pub time: f32,
    pub mode: u32,
    pub color_offset: f32,
    pub color_multiplier: f32,
    pub big_waves_elevation: f32,
    pub big_waves_speed: f32,
    pub small_waves_elevation: f32,
    pub small_waves_frequency: f32,
    pub small_waves_speed: f32,
    pub small_waves_iteration: f32,
    pub fresnel_intensity: f32,
    pub lower_falloff: f32,
    pub upper_falloff: f32,
    pub holographic_power: f32,
    pub glitch_strength: f32,
    /// 1.0 while the pointer is over the mesh.
    pub hovered: f32,
}

impl GalleryUniforms {
    /// Pack the named uniforms of `material`. Names the material does not
    /// have are zero.
    pub fn from_material(material: &Material, mode: u32, transform: &TransformRaw) -> Self {
        let float = |name: &str| material.float(name).unwrap_or(0.0);
        let vec2 = |name: &str| material.vec2(name).unwrap_or([0.0, 0.0]);
        let color = |name: &str| material.color(name).map(|c| c.to_array()).unwrap_or([0.0; 4]);
        Self {
            model: transform.model,
            normal: transform.normal,
            depth_color: color("uDepthColor"),
            surface_color: color("uSurfaceColor"),
            smoke_color: color("uSmokeColor"),
            hologram_color: color("uHologramColor"),
            frequency: vec2("uFrequency"),
            big_waves_frequency: vec2("uBigWavesFrequency"),
            time: float("uTime"),
            mode,
            color_offset: float("uColorOffset"),
            color_multiplier: float("uColorMultiplier"),
            big_waves_elevation: float("uBigWavesElevation"),
            big_waves_speed: float("uBigWavesSpeed"),
            small_waves_elevation: float("uSmallWavesElevation"),
            small_waves_frequency: float("uSmallWavesFrequency"),
            small_waves_speed: float("uSmallWavesSpeed"),
            small_waves_iteration: float("uSmallWavesIteration"),
            fresnel_intensity: float("uFresnelIntensity"),
            lower_falloff: float("uLowerFalloff"),
            upper_falloff: float("uUpperFalloff"),
            holographic_power: float("uHolographicPower"),
            glitch_strength: float("uGlitchStrength"),
            hovered: 0.0,
        }
    }
}

/// The fixed-function switches of a material. One pipeline is built per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub side: Side,
    pub depth_write: bool,
    pub blending: Blending,
    pub transparent: bool,
}

impl From<&Material> for PipelineKey {
    fn from(material: &Material) -> Self {
        Self {
            side: material.side,
            depth_write: material.depth_write,
            blending: material.blending,
            transparent: material.transparent,
        }
    }
}

impl PipelineKey {
    pub fn blend_state(&self) -> wgpu::BlendState {
        match (self.blending, self.transparent) {
            (Blending::Normal, false) => wgpu::BlendState::REPLACE,
            (Blending::Normal, true) => wgpu::BlendState::ALPHA_BLENDING,
            (Blending::Additive, _) => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            },
        }
    }

    fn state(&self) -> PipelineState {
        PipelineState {
            blend: Some(self.blend_state()),
            cull_mode: match self.side {
                Side::Front => Some(wgpu::Face::Back),
                Side::Double => None,
            },
            depth: Some((Texture::DEPTH_FORMAT, self.depth_write)),
        }
    }
}

/// uniforms, colour map, sampler
pub fn mk_gallery_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("gallery_bind_group_layout"),
    })
}

pub fn mk_gallery_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    gallery_bind_group_layout: &wgpu::BindGroupLayout,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Gallery Pipeline Layout"),
        bind_group_layouts: &[Some(camera_bind_group_layout), Some(gallery_bind_group_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Gallery Shader"),
        source: wgpu::ShaderSource::Wgsl(
            concat!(include_str!("noise.wgsl"), "\n", include_str!("gallery.wgsl")).into(),
        ),
    };

    mk_render_pipeline(
        device,
        "Gallery Pipeline",
        &pipeline_layout,
        color_format,
        key.state(),
        &[MeshVertex::desc()],
        shader,
    )
}
