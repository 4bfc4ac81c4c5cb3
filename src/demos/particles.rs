//! Flow-field particles: every vertex of a mesh becomes a particle whose
//! position is advanced on the GPU each frame.

use std::{cell::Cell, rc::Rc};

use rand::{SeedableRng, rngs::SmallRng};
use winit::event::{ElementState, WindowEvent};

use crate::{
    context::{Context, InitContext},
    data_structures::{geometry::GeometryDesc, material::Color},
    debug_panel::{Binding, Controller, Panel},
    flow::{FlowConstructor, FrameTime, GraphicsFlow, Out},
    gpgpu::{FlowField, ParticleSource, ParticlesConfig, grid::ParticleGrid, particles::GpgpuParticles},
    render::Render,
    resources::{MeshSource, load_mesh_positions},
};

/// Filled in by the asset load started in `on_init`.
#[derive(Default)]
pub struct ParticlesState {
    pub source: Option<MeshSource>,
}

pub struct ParticlesFlow {
    config: ParticlesConfig,
    particles: Option<GpgpuParticles>,
    panel: Panel,
    size: Rc<Cell<f32>>,
    influence: Rc<Cell<f32>>,
    strength: Rc<Cell<f32>>,
    frequency: Rc<Cell<f32>>,
    clear_colour: Rc<Cell<Color>>,
    applied_clear_colour: Color,
    rng: SmallRng,
}

impl ParticlesFlow {
    pub fn new(config: ParticlesConfig) -> Self {
        let size = Rc::new(Cell::new(config.size));
        let influence = Rc::new(Cell::new(config.flow_field.influence));
        let strength = Rc::new(Cell::new(config.flow_field.strength));
        let frequency = Rc::new(Cell::new(config.flow_field.frequency));
        let clear_colour = Rc::new(Cell::new(config.clear_colour));

        let mut panel = Panel::new("GPGPU particles");
        panel
            .add(Controller::color("clearColor", Binding::color_cell(clear_colour.clone())))
            .add(Controller::slider("uSize", Binding::cell(size.clone()), 0.0, 1.0, 0.001))
            .add(Controller::slider(
                "uFlowFieldInfluence",
                Binding::cell(influence.clone()),
                0.0,
                1.0,
                0.001,
            ))
            .add(Controller::slider(
                "uFlowFieldStrength",
                Binding::cell(strength.clone()),
                0.0,
                10.0,
                0.001,
            ))
            .add(Controller::slider(
                "uFlowFieldFrequency",
                Binding::cell(frequency.clone()),
                0.0,
                1.0,
                0.001,
            ));

        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            applied_clear_colour: config.clear_colour,
            config,
            particles: None,
            panel,
            size,
            influence,
            strength,
            frequency,
            clear_colour,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    fn flow_field(&self) -> FlowField {
        FlowField {
            influence: self.influence.get(),
            strength: self.strength.get(),
            frequency: self.frequency.get(),
        }
    }

    fn build(&mut self, ctx: &Context, source: MeshSource) -> anyhow::Result<GpgpuParticles> {
        let grid = ParticleGrid::new(source.len());
        let initial_state = grid.initial_state(&source.positions, &mut self.rng)?;
        let vertices = grid.particle_vertices(source.colors.as_deref(), &mut self.rng);
        GpgpuParticles::new(
            &ctx.device,
            &ctx.queue,
            ctx.config.format,
            &ctx.camera.bind_group_layout,
            grid,
            &initial_state,
            &vertices,
        )
    }
}

/// Vertices of a 32x16 UV sphere.
pub fn sphere_source(radius: f32) -> MeshSource {
    let mesh = GeometryDesc::Sphere {
        radius,
        width_segments: 32,
        height_segments: 16,
    }
    .build();
    MeshSource::from(&mesh)
}

impl GraphicsFlow<ParticlesState> for ParticlesFlow {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut ParticlesState) -> Out<ParticlesState> {
        ctx.clear_colour = self.config.clear_colour;
        ctx.look_at([4.5, 4.0, 11.0], [0.0, 0.0, 0.0]);
        ctx.camera.projection.set_fovy(cgmath::Deg(35.0));

        let source = self.config.source.clone();
        Out::FutFn(vec![Box::new(async move {
            let loaded = match source {
                ParticleSource::Sphere { radius } => Ok(sphere_source(radius)),
                ParticleSource::Model(path) => load_mesh_positions(&path).await,
            };
            Box::new(move |state: &mut ParticlesState| match loaded {
                Ok(source) => state.source = Some(source),
                Err(e) => log::error!("Failed to load particle positions: {:#}", e),
            }) as Box<dyn FnOnce(&mut ParticlesState)>
        })])
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut ParticlesState,
        time: &FrameTime,
    ) -> Out<ParticlesState> {
        if self.particles.is_none()
            && let Some(source) = state.source.take()
        {
            match self.build(ctx, source) {
                Ok(particles) => self.particles = Some(particles),
                Err(e) => log::error!("Failed to create particles: {:#}", e),
            }
        }

        let flow_field = self.flow_field();
        let size = self.size.get();
        if let Some(particles) = self.particles.as_mut() {
            particles.update(
                &ctx.queue,
                time.elapsed,
                time.delta,
                flow_field,
                size,
                ctx.viewport.resolution(),
            );
        }

        let clear_colour = self.clear_colour.get();
        if clear_colour != self.applied_clear_colour {
            self.applied_clear_colour = clear_colour;
            return Out::Configure(Box::new(move |ctx| ctx.clear_colour = clear_colour));
        }
        Out::Empty
    }

    fn on_compute(&mut self, _ctx: &Context, encoder: &mut wgpu::CommandEncoder) {
        if let Some(particles) = self.particles.as_mut() {
            particles.compute(encoder);
        }
    }

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        _state: &mut ParticlesState,
        event: &WindowEvent,
    ) -> Out<ParticlesState> {
        if let WindowEvent::KeyboardInput { event, .. } = event
            && event.state == ElementState::Pressed
        {
            self.panel.handle_key(&event.logical_key);
        }
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        match &self.particles {
            Some(particles) => particles.into(),
            None => Render::None,
        }
    }

    fn on_panel(&self) -> Option<&Panel> {
        Some(&self.panel)
    }
}

pub fn particles_constructor(config: ParticlesConfig) -> FlowConstructor<ParticlesState> {
    let constructor: FlowConstructor<ParticlesState> = Box::new(move |_: InitContext| {
        Box::pin(async move { Box::new(ParticlesFlow::new(config)) as Box<dyn GraphicsFlow<_>> })
    });
    constructor
}

/// Open a window and run the particles demo.
pub fn run_particles(config: ParticlesConfig) -> anyhow::Result<()> {
    crate::flow::run(vec![particles_constructor(config)])
}
