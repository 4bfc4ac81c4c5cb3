//! Shader gallery state.
//!
//! One mesh and one shared material are reused for every shader. Switching
//! shaders is an explicit [`Gallery::transition`]: the mesh and material are
//! torn down to a known baseline, then rebuilt for the requested
//! [`ShaderMode`]. The debug panel holds one folder per mode; opening a folder
//! (exclusively) selects its mode.
//!
//! The mesh is also pickable: [`Gallery::hover`] tracks the pointer entering
//! and leaving it and [`Gallery::click`] reports presses on it.
//!
//! This module owns no GPU resources; the gallery demo renders whatever state
//! it finds here.

use std::{cell::Cell, f32::consts::PI, rc::Rc};

use log::{debug, info, warn};
use winit::keyboard::Key;

use crate::{
    data_structures::{
        geometry::{GeometryDesc, MeshData},
        material::{Blending, Color, Material, MaterialHandle, Side, UniformValue},
        scene_graph::SceneNode,
    },
    debug_panel::{Axis, Binding, ControlValue, Controller, Panel, PanelEvent},
    pick::{Hover, PointerEvent, Ray},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderMode {
    WavingTexture,
    Gradient,
    Noise,
    Water,
    Smoke,
    Hologram,
}

impl ShaderMode {
    /// Folder order in the panel.
    pub const ALL: [ShaderMode; 6] = [
        ShaderMode::WavingTexture,
        ShaderMode::Gradient,
        ShaderMode::Noise,
        ShaderMode::Water,
        ShaderMode::Smoke,
        ShaderMode::Hologram,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ShaderMode::WavingTexture => "Waving Texture",
            ShaderMode::Gradient => "Gradient",
            ShaderMode::Noise => "Noise",
            ShaderMode::Water => "Water",
            ShaderMode::Smoke => "Smoke",
            ShaderMode::Hologram => "Hologram",
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.title() == title)
    }

    /// Branch selector in `gallery.wgsl`.
    pub fn shader_index(&self) -> u32 {
        match self {
            ShaderMode::WavingTexture => 0,
            ShaderMode::Gradient => 1,
            ShaderMode::Noise => 2,
            ShaderMode::Water => 3,
            ShaderMode::Smoke => 4,
            ShaderMode::Hologram => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Folder opened at startup.
    pub initial_mode: ShaderMode,
    pub cat_texture: String,
    pub perlin_texture: String,
    pub clear_colour: Color,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            initial_mode: ShaderMode::Smoke,
            cat_texture: "textures/cat.jpg".to_string(),
            perlin_texture: "textures/perlin.png".to_string(),
            clear_colour: Color::new(0.0, 0.0, 0.0),
        }
    }
}

/// Per-frame hook installed by a mode.
type Tick = Box<dyn Fn(&mut SceneNode, &MaterialHandle, f32)>;

pub const MESH_NAME: &str = "shader mesh";

/// Geometries offered by the hologram's `geometry` option.
pub fn hologram_geometry(choice: usize) -> Option<GeometryDesc> {
    match choice {
        0 => Some(GeometryDesc::torus_knot(0.6, 0.25, 128, 32)),
        1 => Some(GeometryDesc::sphere()),
        2 => Some(GeometryDesc::cone(1.0, 1.0)),
        _ => None,
    }
}

pub struct Gallery {
    pub config: GalleryConfig,
    pub panel: Panel,
    mesh: SceneNode,
    material: MaterialHandle,
    mode: Option<ShaderMode>,
    tick: Option<Tick>,
    geometry_choice: Rc<Cell<usize>>,
    pending_geometry: Rc<Cell<Option<GeometryDesc>>>,
    hover: Hover,
}

impl Gallery {
    pub fn new(config: GalleryConfig) -> Self {
        let material = Material {
            transparent: true,
            ..Material::default()
        }
        .shared();
        let mut panel = Panel::new("Open a folder to create shader").with_exclusive_folders();
        for mode in ShaderMode::ALL {
            panel.add_folder(mode.title());
        }
        Self {
            config,
            panel,
            mesh: SceneNode::mesh(MESH_NAME, GeometryDesc::plane(1.0, 1.0, 1, 1), material.clone()),
            material,
            mode: None,
            tick: None,
            geometry_choice: Rc::new(Cell::new(0)),
            pending_geometry: Rc::new(Cell::new(None)),
            hover: Hover::default(),
        }
    }

    /// Open the configured initial folder.
    pub fn open_initial(&mut self) -> bool {
        self.open(self.config.initial_mode)
    }

    pub fn mode(&self) -> Option<ShaderMode> {
        self.mode
    }

    pub fn mesh(&self) -> &SceneNode {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut SceneNode {
        &mut self.mesh
    }

    pub fn material(&self) -> &MaterialHandle {
        &self.material
    }

    /// Open the mode's folder and switch to it. Returns whether a transition
    /// happened.
    pub fn open(&mut self, mode: ShaderMode) -> bool {
        self.panel.open_folder(mode.title());
        self.transition(mode)
    }

    /// Tear down the current shader and build `mode`. Re-selecting the
    /// current mode does nothing.
    pub fn transition(&mut self, mode: ShaderMode) -> bool {
        if self.mode == Some(mode) {
            return false;
        }
        self.teardown();
        self.build(mode);
        self.mode = Some(mode);
        info!("Shader gallery: {}", mode.title());
        true
    }

    /// Back to a 1x1 plane with 32x32 segments and an empty default material.
    pub fn teardown(&mut self) {
        self.mesh.set_geometry(GeometryDesc::plane(1.0, 1.0, 32, 32));
        {
            let mut material = self.material.borrow_mut();
            material.clear_uniforms();
            material.reset_state();
        }
        self.mesh.local.set_rotation_euler(0.0, 0.0, 0.0);
        self.mesh.local.set_scale(1.0, 1.0, 1.0);
        self.tick = None;
        self.pending_geometry.set(None);
    }

    fn build(&mut self, mode: ShaderMode) {
        match mode {
            ShaderMode::WavingTexture => {
                self.material
                    .borrow_mut()
                    .set("uFrequency", UniformValue::Vec2([10.0, 5.0]));
                self.set_texture("uTexture", &self.config.cat_texture.clone());
                self.tick = Some(Box::new(set_time));
            }
            ShaderMode::Gradient | ShaderMode::Noise => {}
            ShaderMode::Water => {
                self.mesh.set_geometry(GeometryDesc::plane(2.0, 2.0, 512, 512));
                self.mesh.local.set_rotation_euler(-PI * 0.5, 0.0, 0.0);
                let mut material = self.material.borrow_mut();
                material.set("uDepthColor", UniformValue::Color(hex(0x3f, 0x78, 0xd5)));
                material.set("uSurfaceColor", UniformValue::Color(hex(0xa3, 0xd2, 0xf0)));
                material.set("uColorOffset", UniformValue::Float(0.1));
                material.set("uColorMultiplier", UniformValue::Float(2.5));
                material.set("uBigWavesElevation", UniformValue::Float(0.2));
                material.set("uBigWavesFrequency", UniformValue::Vec2([4.0, 1.5]));
                material.set("uBigWavesSpeed", UniformValue::Float(0.75));
                material.set("uSmallWavesElevation", UniformValue::Float(0.15));
                material.set("uSmallWavesFrequency", UniformValue::Float(3.0));
                material.set("uSmallWavesSpeed", UniformValue::Float(0.2));
                material.set("uSmallWavesIteration", UniformValue::Float(3.0));
                drop(material);
                self.tick = Some(Box::new(set_time));
            }
            ShaderMode::Smoke => {
                self.mesh.set_geometry(GeometryDesc::plane(1.0, 1.0, 16, 64));
                self.mesh.local.set_scale(0.75, 3.0, 0.75);
                self.set_texture("uPerlinTexture", &self.config.perlin_texture.clone());
                let mut material = self.material.borrow_mut();
                material.set("uSmokeColor", UniformValue::Color(hex(0x3f, 0x78, 0xd5)));
                material.side = Side::Double;
                material.depth_write = false;
                drop(material);
                self.tick = Some(Box::new(set_time));
            }
            ShaderMode::Hologram => {
                self.geometry_choice.set(0);
                if let Some(geometry) = hologram_geometry(0) {
                    self.mesh.set_geometry(geometry);
                }
                let mut material = self.material.borrow_mut();
                material.side = Side::Double;
                material.depth_write = false;
                material.blending = Blending::Additive;
                material.set("uFresnelIntensity", UniformValue::Float(2.0));
                material.set("uLowerFalloff", UniformValue::Float(0.8));
                material.set("uUpperFalloff", UniformValue::Float(0.0));
                material.set("uHologramColor", UniformValue::Color(hex(0x23, 0xc5, 0x5e)));
                material.set("uHolographicPower", UniformValue::Float(1.25));
                material.set("uGlitchStrength", UniformValue::Float(0.25));
                drop(material);
                self.tick = Some(Box::new(
                    |mesh: &mut SceneNode, material: &MaterialHandle, elapsed: f32| {
                        mesh.local
                            .set_rotation_euler(elapsed * 0.1, 0.0, elapsed * 0.1);
                        set_time(mesh, material, elapsed);
                    },
                ));
            }
        }
        // uTime exists for every animated mode, starting at zero.
        if self.tick.is_some() {
            self.material.borrow_mut().set("uTime", UniformValue::Float(0.0));
        }
        self.populate_folder(mode);
    }

    fn set_texture(&self, name: &str, key: &str) {
        self.material
            .borrow_mut()
            .set(name, UniformValue::Texture(key.to_string()));
    }

    /// Controllers are created the first time a folder is populated and
    /// resolve their uniform by name, so they outlive rebuilds.
    fn populate_folder(&mut self, mode: ShaderMode) {
        let material = self.material.clone();
        let Some(folder) = self.panel.folder_mut(mode.title()) else {
            warn!("No folder for {}", mode.title());
            return;
        };
        if !folder.is_empty() {
            return;
        }
        let slider = |name: &str, min: f32, max: f32, step: f32| {
            Controller::slider(name, Binding::uniform(&material, name), min, max, step)
        };
        let component = |label: &str, name: &str, axis: Axis, min: f32, max: f32, step: f32| {
            Controller::slider(
                label,
                Binding::uniform_component(&material, name, axis),
                min,
                max,
                step,
            )
        };
        match mode {
            ShaderMode::WavingTexture => {
                folder
                    .add(component("uFrequencyX", "uFrequency", Axis::X, 0.0, 20.0, 0.01))
                    .add(component("uFrequencyY", "uFrequency", Axis::Y, 0.0, 20.0, 0.01));
            }
            ShaderMode::Gradient | ShaderMode::Noise => {}
            ShaderMode::Water => {
                folder
                    .add(Controller::color("uDepthColor", Binding::uniform(&material, "uDepthColor")))
                    .add(Controller::color("uSurfaceColor", Binding::uniform(&material, "uSurfaceColor")))
                    .add(slider("uColorOffset", 0.0, 1.0, 0.001))
                    .add(slider("uColorMultiplier", 0.0, 10.0, 0.001))
                    .add(slider("uBigWavesElevation", 0.0, 1.0, 0.001))
                    .add(component("uBigWavesFrequencyX", "uBigWavesFrequency", Axis::X, 0.0, 10.0, 0.001))
                    .add(component("uBigWavesFrequencyY", "uBigWavesFrequency", Axis::Y, 0.0, 10.0, 0.001))
                    .add(slider("uBigWavesSpeed", 0.0, 5.0, 0.001))
                    .add(slider("uSmallWavesElevation", 0.0, 1.0, 0.001))
                    .add(slider("uSmallWavesFrequency", 0.0, 30.0, 0.001))
                    .add(slider("uSmallWavesSpeed", 0.0, 4.0, 0.001))
                    .add(slider("uSmallWavesIteration", 0.0, 5.0, 1.0));
            }
            ShaderMode::Smoke => {
                folder.add(Controller::color(
                    "smokeColor",
                    Binding::uniform(&material, "uSmokeColor"),
                ));
            }
            ShaderMode::Hologram => {
                let pending = self.pending_geometry.clone();
                folder
                    .add(Controller::color(
                        "hologramColor",
                        Binding::uniform(&material, "uHologramColor"),
                    ))
                    .add(slider("uLowerFalloff", 0.0, 1.0, 0.001))
                    .add(slider("uUpperFalloff", 0.0, 1.0, 0.001))
                    .add(slider("uFresnelIntensity", 0.0, 10.0, 0.001))
                    .add(slider("uGlitchStrength", 0.0, 1.0, 0.001))
                    .add(
                        Controller::options(
                            "geometry",
                            Binding::choice(self.geometry_choice.clone()),
                            &[("TorusKnot", 0), ("Sphere", 1), ("Cone", 2)],
                        )
                        .on_change(move |value| {
                            if let ControlValue::Choice(choice) = value {
                                pending.set(hologram_geometry(*choice));
                            }
                        }),
                    )
                    .add(slider("uHolographicPower", 0.0, 5.0, 0.001));
            }
        }
    }

    /// Route a key to the panel; opening a folder switches shaders.
    pub fn handle_key(&mut self, key: &Key) -> Option<PanelEvent> {
        let event = self.panel.handle_key(key);
        if let Some(PanelEvent::FolderOpened(title)) = &event {
            match ShaderMode::from_title(title) {
                Some(mode) => {
                    self.transition(mode);
                }
                None => warn!("Select a folder"),
            }
        }
        event
    }

    /// Per-frame update: apply geometry picked in the panel, run the mode's
    /// tick hook and refresh world transforms.
    pub fn tick(&mut self, elapsed: f32) {
        if let Some(geometry) = self.pending_geometry.take() {
            self.mesh.set_geometry(geometry);
        }
        if let Some(tick) = &self.tick {
            tick(&mut self.mesh, &self.material, elapsed);
        }
        self.mesh.update_world_transform_all();
    }

    /// Distance along `ray` to the mesh, given its current built geometry.
    /// Nothing is pickable before a shader is selected.
    pub fn hit_test(&self, ray: &Ray, data: &MeshData) -> Option<f32> {
        self.mode?;
        ray.intersect_mesh(data, &self.mesh.world_transform().to_matrix())
    }

    /// Pointer moved (`Some`) or left the window (`None`).
    pub fn hover(&mut self, ray: Option<&Ray>, data: Option<&MeshData>) -> Vec<PointerEvent> {
        let hit = match (ray, data) {
            (Some(ray), Some(data)) => self.hit_test(ray, data).is_some(),
            _ => false,
        };
        let events = self.hover.update(hit.then_some(MESH_NAME));
        for event in &events {
            debug!("{:?}", event);
        }
        events
    }

    pub fn click(&self) -> Option<PointerEvent> {
        let event = self.hover.click()?;
        if let Some(mode) = self.mode {
            info!("Clicked the {} mesh", mode.title());
        }
        Some(event)
    }

    pub fn is_hovered(&self) -> bool {
        self.hover.is_hovering()
    }
}

fn set_time(_: &mut SceneNode, material: &MaterialHandle, elapsed: f32) {
    if let Some(UniformValue::Float(time)) = material.borrow_mut().get_mut("uTime") {
        *time = elapsed;
    }
}

fn hex(r: u8, g: u8, b: u8) -> Color {
    Color::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    )
}
