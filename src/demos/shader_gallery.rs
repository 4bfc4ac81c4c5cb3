//! Shader gallery: one mesh, one material, six shaders picked from the panel.
//!
//! CPU-side state lives in [`crate::gallery::Gallery`]; this flow mirrors it
//! onto the GPU every frame and feeds it pointer rays for hover and click.

use std::collections::HashMap;

use bytemuck::Zeroable;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use wgpu::util::DeviceExt;
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::{
    context::{Context, InitContext},
    data_structures::{
        geometry::{GeometryDesc, MeshData},
        texture::Texture,
    },
    debug_panel::Panel,
    flow::{FlowConstructor, FrameTime, GraphicsFlow, Out},
    gallery::{Gallery, GalleryConfig},
    pick::Ray,
    pipelines::gallery::{GalleryUniforms, PipelineKey, mk_gallery_layout, mk_gallery_pipeline},
    render::{Render, Shaded},
    resources::load_image,
};

/// Texture uniforms the gallery shaders sample, in lookup order.
const TEXTURE_UNIFORMS: [&str; 2] = ["uTexture", "uPerlinTexture"];

/// Decoded images waiting for upload, keyed by asset path.
#[derive(Default)]
pub struct GalleryState {
    pub images: Vec<(String, image::DynamicImage, bool)>,
}

struct MeshBuffers {
    geometry: GeometryDesc,
    /// CPU copy for hit tests.
    data: MeshData,
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

pub struct ShaderGalleryFlow {
    gallery: Gallery,
    device: wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_bind_group_layout: wgpu::BindGroupLayout,
    layout: wgpu::BindGroupLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    key: PipelineKey,
    uniform_buffer: wgpu::Buffer,
    placeholder: Texture,
    textures: HashMap<String, Texture>,
    bound_texture: Option<String>,
    bind_group: wgpu::BindGroup,
    mesh: Option<MeshBuffers>,
    /// Last pointer position in normalized device coordinates.
    pointer: Option<[f32; 2]>,
    ready: bool,
    rng: SmallRng,
}

impl ShaderGalleryFlow {
    pub fn new(init: &InitContext, config: GalleryConfig) -> Self {
        let device = init.device.clone();
        let layout = mk_gallery_layout(&device);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gallery Uniform Buffer"),
            contents: bytemuck::cast_slice(&[GalleryUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let placeholder = Texture::create_placeholder(&device, &init.queue);
        let bind_group = mk_bind_group(&device, &layout, &uniform_buffer, &placeholder);

        let gallery = Gallery::new(config);
        let key = PipelineKey::from(&*gallery.material().borrow());
        let mut pipelines = HashMap::new();
        pipelines.insert(
            key,
            mk_gallery_pipeline(
                &device,
                init.color_format,
                &init.camera_bind_group_layout,
                &layout,
                key,
            ),
        );

        Self {
            gallery,
            color_format: init.color_format,
            camera_bind_group_layout: init.camera_bind_group_layout.clone(),
            layout,
            pipelines,
            key,
            uniform_buffer,
            placeholder,
            textures: HashMap::new(),
            bound_texture: None,
            bind_group,
            mesh: None,
            pointer: None,
            ready: false,
            rng: SmallRng::seed_from_u64(0x6a11e7),
            device,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    fn sync_mesh(&mut self) {
        let Some(geometry) = self.gallery.mesh().geometry().copied() else {
            self.mesh = None;
            return;
        };
        if self.mesh.as_ref().is_some_and(|m| m.geometry == geometry) {
            return;
        }
        let data = geometry.build();
        let rng = &mut self.rng;
        let vertices = data.to_vertices(|| rng.random::<f32>());
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Gallery Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Gallery Index Buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        log::info!(
            "Gallery mesh: {} vertices, {} indices",
            data.vertex_count(),
            data.indices.len()
        );
        let index_count = data.indices.len() as u32;
        self.mesh = Some(MeshBuffers {
            geometry,
            data,
            vertex,
            index,
            index_count,
        });
    }

    fn update_hover(&mut self, ctx: &Context) {
        let ray = self
            .pointer
            .and_then(|ndc| Ray::from_camera(ndc, &ctx.camera.camera, &ctx.camera.projection));
        let data = self.mesh.as_ref().map(|mesh| &mesh.data);
        self.gallery.hover(ray.as_ref(), data);
    }

    fn sync_pipeline(&mut self) {
        self.key = PipelineKey::from(&*self.gallery.material().borrow());
        if !self.pipelines.contains_key(&self.key) {
            let pipeline = mk_gallery_pipeline(
                &self.device,
                self.color_format,
                &self.camera_bind_group_layout,
                &self.layout,
                self.key,
            );
            self.pipelines.insert(self.key, pipeline);
        }
    }

    /// Bind the material's texture. Returns false while it is still loading
    /// (or failed to load), in which case the mesh is not drawn.
    fn sync_texture(&mut self) -> bool {
        let wanted = {
            let material = self.gallery.material().borrow();
            TEXTURE_UNIFORMS
                .iter()
                .find_map(|name| material.texture(name).map(str::to_string))
        };
        let texture = match &wanted {
            Some(key) => match self.textures.get(key) {
                Some(texture) => texture,
                None => return false,
            },
            None => &self.placeholder,
        };
        if self.bound_texture != wanted {
            self.bind_group =
                mk_bind_group(&self.device, &self.layout, &self.uniform_buffer, texture);
            self.bound_texture = wanted;
        }
        true
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    texture: &Texture,
) -> wgpu::BindGroup {
    let fallback;
    let sampler = match &texture.sampler {
        Some(sampler) => sampler,
        None => {
            fallback = crate::data_structures::texture::create_default_sampler(device);
            &fallback
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("gallery_bind_group"),
    })
}

impl GraphicsFlow<GalleryState> for ShaderGalleryFlow {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut GalleryState) -> Out<GalleryState> {
        ctx.clear_colour = self.gallery.config.clear_colour;
        ctx.look_at([1.0, 1.0, 2.0], [0.0, 0.0, 0.0]);
        ctx.camera.projection.set_fovy(cgmath::Deg(75.0));

        self.gallery.open_initial();

        let assets = [
            (self.gallery.config.cat_texture.clone(), false),
            (self.gallery.config.perlin_texture.clone(), true),
        ];
        let loads = assets
            .into_iter()
            .map(|(path, data)| {
                Box::new(async move {
                    let loaded = load_image(&path).await;
                    Box::new(move |state: &mut GalleryState| match loaded {
                        Ok(image) => state.images.push((path, image, data)),
                        Err(e) => log::error!("Failed to load {}: {:#}", path, e),
                    }) as Box<dyn FnOnce(&mut GalleryState)>
                }) as Box<dyn Future<Output = Box<dyn FnOnce(&mut GalleryState)>>>
            })
            .collect();
        Out::FutFn(loads)
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut GalleryState,
        time: &FrameTime,
    ) -> Out<GalleryState> {
        for (path, image, data) in state.images.drain(..) {
            let texture = if data {
                Texture::from_data_image(&ctx.device, &ctx.queue, &image, Some(&path))
            } else {
                Texture::from_image(&ctx.device, &ctx.queue, &image, Some(&path))
            };
            match texture {
                Ok(texture) => {
                    self.textures.insert(path, texture);
                }
                Err(e) => log::error!("Failed to upload {}: {:#}", path, e),
            }
        }

        self.gallery.tick(time.elapsed);
        self.sync_mesh();
        self.sync_pipeline();
        self.ready = self.sync_texture();
        // The mesh and camera move under a resting pointer too.
        self.update_hover(ctx);

        if let Some(mode) = self.gallery.mode() {
            let transform = self.gallery.mesh().world_transform().to_raw();
            let mut uniforms = GalleryUniforms::from_material(
                &self.gallery.material().borrow(),
                mode.shader_index(),
                &transform,
            );
            uniforms.hovered = if self.gallery.is_hovered() { 1.0 } else { 0.0 };
            ctx.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        _state: &mut GalleryState,
        event: &WindowEvent,
    ) -> Out<GalleryState> {
        match event {
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.gallery.handle_key(&event.logical_key);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(ctx.window().scale_factor());
                self.pointer = Some(ctx.viewport.normalize_pointer(logical.x, logical.y));
                self.update_hover(ctx);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                self.update_hover(ctx);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.gallery.click();
            }
            _ => {}
        }
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        if !self.ready || self.gallery.mode().is_none() {
            return Render::None;
        }
        let (Some(mesh), Some(pipeline)) = (&self.mesh, self.pipelines.get(&self.key)) else {
            return Render::None;
        };
        Shaded {
            pipeline,
            vertex: &mesh.vertex,
            index: &mesh.index,
            index_count: mesh.index_count,
            bind_group: &self.bind_group,
        }
        .into()
    }

    fn on_panel(&self) -> Option<&Panel> {
        Some(&self.gallery.panel)
    }
}

pub fn shader_gallery_constructor(config: GalleryConfig) -> FlowConstructor<GalleryState> {
    let constructor: FlowConstructor<GalleryState> = Box::new(move |init: InitContext| {
        Box::pin(async move {
            Box::new(ShaderGalleryFlow::new(&init, config)) as Box<dyn GraphicsFlow<_>>
        })
    });
    constructor
}

/// Open a window and run the shader gallery.
pub fn run_shader_gallery(config: GalleryConfig) -> anyhow::Result<()> {
    crate::flow::run(vec![shader_gallery_constructor(config)])
}
