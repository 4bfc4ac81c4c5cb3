//! Flow control and application event loop.
//!
//! A "flow" is one demo (or one layer of a demo): it reacts to input, updates
//! its state every frame, may encode off-screen GPU passes and says what to
//! draw. The [`App`] owns the window, the GPU [`Context`] and every flow, and
//! drives them from the winit event loop.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S>`] is the trait every demo implements
//! - [`Out<S>`] is the output type for async work and context configuration
//! - [`FrameTime`] is the clock handed to `on_update`
//!
//! # Lifecycle
//!
//! Each frame (on `RedrawRequested`):
//! 1. advance the clock, which starts at the first frame
//! 2. update the orbit camera, then call every flow's `on_update`
//! 3. call every flow's `on_compute` to encode off-screen passes
//! 4. draw every flow's `on_render` in one render pass, then the debug panel
//!    text when built with the `ui` feature
//! 5. submit, present and request the next frame
//!
//! Futures returned through [`Out`] are resolved between frames, never during
//! one: natively by blocking on a tokio runtime, on the web by spawning a
//! local future that posts its result back through the event-loop proxy.

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use anyhow::Context as _;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

#[cfg(feature = "ui")]
use crate::overlay::PanelOverlay;
use crate::{
    context::{Context, InitContext},
    debug_panel::Panel,
    render::Render,
    viewport::Viewport,
};

///
/// This is the Output Type for every lifecycle hook where the user can pass async work that is
/// handled according to the platform you're running on.
///
/// `Out::FutFn` resolves futures of state mutations that are applied to the state once ready.
/// This is how asset loads reach the scene.
///
/// `Out::Configure` modifies the Context, for instance to change the clear colour or move the
/// camera.
///
/// `Empty` is the default output used when nothing needs to be handled.
///
pub enum Out<S> {
    FutFn(Vec<Box<dyn Future<Output = Box<dyn FnOnce(&mut S)>>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<S> Default for Out<S> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Id of the canvas the app renders into on the web.
pub const CANVAS_ID: &str = "canvas";

/// Seconds since the app started and since the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

impl FrameTime {
    /// Advance to `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f32) {
        self.delta = (elapsed - self.elapsed).max(0.0);
        self.elapsed = elapsed;
    }
}

/// Wall clock behind [`FrameTime`]. It starts on the first tick, so window
/// and GPU setup never show up as one long first frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    time: FrameTime,
}

impl FrameClock {
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let start = *self.start.get_or_insert(now);
        self.time.advance(now.duration_since(start).as_secs_f32());
        self.time
    }
}

/// Trait for implementing a demo.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after the flow is constructed; configure the context (camera,
///    clear colour) and start asset loads here
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame before anything is encoded
/// 4. `on_compute()` is called every frame to encode off-screen passes
/// 5. `on_render()` is called every frame and says how to draw `self`
///
pub trait GraphicsFlow<S> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S>;

    /// Update state every frame.
    fn on_update(&mut self, ctx: &Context, state: &mut S, time: &FrameTime) -> Out<S>;

    /// Encode GPU work that has to finish before the frame is drawn.
    fn on_compute(&mut self, _ctx: &Context, _encoder: &mut wgpu::CommandEncoder) {}

    /// Handle window events (keyboard, mouse, resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<S>;

    /// Return what to draw this frame.
    fn on_render(&self) -> Render<'_>;

    /// The debug panel drawn over the frame, if the flow has one.
    fn on_panel(&self) -> Option<&Panel> {
        None
    }
}

// Dummy impl to make wasm work
impl<State> Debug for dyn GraphicsFlow<State> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`, so flows can build their pipelines before the first frame.
pub type FlowConstructor<S> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S>>>>>>;

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
    #[cfg(feature = "ui")]
    overlay: PanelOverlay,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window)
            .await
            .context("App initialization failed. Cannot create the main context")?;
        #[cfg(feature = "ui")]
        let overlay = PanelOverlay::new(&ctx.device, &ctx.queue, ctx.config.format);
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
            #[cfg(feature = "ui")]
            overlay,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            let viewport = Viewport::from_physical(width, height, self.ctx.window.scale_factor());
            self.ctx.resize(viewport);
            self.is_surface_configured = true;
        }
    }

    fn render(&mut self, graphics_flows: &mut [Box<dyn GraphicsFlow<State>>]) {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return;
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            // Reconfigure the surface if it's lost or outdated
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                let size = self.ctx.window.inner_size();
                self.resize(size.width, size.height);
                return;
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => return,
            wgpu::CurrentSurfaceTexture::Validation => {
                log::error!("Unable to acquire the next frame");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        for flow in graphics_flows.iter_mut() {
            flow.on_compute(&self.ctx, &mut encoder);
        }

        #[cfg(feature = "ui")]
        {
            let text = graphics_flows
                .iter()
                .filter_map(|flow| flow.on_panel())
                .find_map(Panel::overlay_text);
            let size = self.ctx.window.inner_size();
            if let Err(e) = self.overlay.prepare(
                &self.ctx.device,
                &self.ctx.queue,
                text.as_deref(),
                (size.width, size.height),
                self.ctx.window.scale_factor() as f32,
            ) {
                log::error!("{:#}", e);
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            for flow in graphics_flows.iter() {
                flow.on_render().draw(&self.ctx, &mut render_pass);
            }

            #[cfg(feature = "ui")]
            if let Err(e) = self.overlay.render(&mut render_pass) {
                log::error!("{:#}", e);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        #[cfg(feature = "ui")]
        self.overlay.trim();
    }
}

pub struct App<State: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    // Futures only report back through the event loop on the web.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    // We use Option to `take()` the constructors after use.
    constructors: Option<Vec<FlowConstructor<State>>>,
    clock: FrameClock,
}

impl<State: 'static> App<State> {
    fn new(
        event_loop: &EventLoop<FlowEvent<State>>,
        constructors: Vec<FlowConstructor<State>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime =
            tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            clock: FrameClock::default(),
        })
    }

    fn dispatch(&mut self, f: impl Fn(&mut dyn GraphicsFlow<State>, &mut AppState<State>) -> Out<State>) {
        let Some(state) = &mut self.state else {
            return;
        };
        for flow in self.graphics_flows.iter_mut() {
            let out = f(flow.as_mut(), state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut state.state,
                &mut state.ctx,
                #[cfg(target_arch = "wasm32")]
                self.proxy.clone(),
                out,
            );
        }
    }

    fn init_flows(&mut self) {
        self.dispatch(|flow, app| flow.on_init(&mut app.ctx, &mut app.state));
        log::info!("{} flow(s) initialized", self.graphics_flows.len());
    }
}

/// Results of async work posted back to the event loop (web only).
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) enum FlowEvent<State: 'static> {
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State>>>,
    },
    Mut(Box<dyn FnOnce(&mut State)>),
    Exit,
}

impl<State> Debug for FlowEvent<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Mut(_) => f.write_str("Mut(|&mut State| -> {...})"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl<State: 'static + Default> ApplicationHandler<FlowEvent<State>> for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Already running; resumed fires again when returning from the background.
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("flow-gpgpu");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            let Some(canvas) = canvas else {
                log::error!("No <canvas id=\"{}\"> on the page", CANVAS_ID);
                event_loop.exit();
                return;
            };
            window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;

            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((mut app_state, flows)) => {
                    let size = app_state.ctx.window.inner_size();
                    app_state.resize(size.width, size.height);
                    self.state = Some(app_state);
                    self.graphics_flows = flows;
                    self.init_flows();
                }
                Err(e) => {
                    log::error!("{:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => {
                        log::error!("{:#}", e);
                        FlowEvent::Exit
                    }
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // This is the message from our wasm `spawn_local`
                self.state = Some(state);
                self.graphics_flows = flows;

                // Trigger a resize and redraw now that we are initialized
                if let Some(app_state) = self.state.as_mut() {
                    let size = app_state.ctx.window.inner_size();
                    app_state.resize(size.width, size.height);
                }
                self.init_flows();
                if let Some(app_state) = &self.state {
                    app_state.ctx.window.request_redraw();
                }
            }
            FlowEvent::Mut(fn_once) => {
                if let Some(state) = &mut self.state {
                    fn_once(&mut state.state);
                }
            }
            FlowEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera.controller.handle_window_events(&event);

        self.dispatch(|flow, app| flow.on_window_events(&app.ctx, &mut app.state, &event));

        let Some(state) = &mut self.state else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let time = self.clock.tick(Instant::now());

                // Pointer positions arrive in physical pixels.
                let height = state.ctx.window.inner_size().height as f32;
                state.ctx.camera.update(&state.ctx.queue, height);
                self.dispatch(|flow, app| flow.on_update(&app.ctx, &mut app.state, &time));

                let Some(state) = &mut self.state else {
                    return;
                };
                state.render(&mut self.graphics_flows);
            }
            _ => {}
        }
    }
}

fn handle_flow_output<State>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    state: &mut State,
    ctx: &mut Context,
    #[cfg(target_arch = "wasm32")] proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    out: Out<State>,
) {
    match out {
        // Mutate the state if the arch supports blocking, create an event otherwise
        Out::FutFn(futures) => {
            let mutations: Vec<Pin<Box<dyn Future<Output = Box<dyn FnOnce(&mut State)>>>>> =
                futures.into_iter().map(Pin::from).collect();
            let fut = async move { futures::future::join_all(mutations.into_iter()).await };
            #[cfg(not(target_arch = "wasm32"))]
            {
                let resolved: Vec<Box<dyn FnOnce(&mut State)>> = async_runtime.block_on(fut);
                resolved.into_iter().for_each(|mutation| {
                    mutation(state);
                });
            }

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    let resolved = fut.await;
                    for mutation in resolved {
                        if proxy.send_event(FlowEvent::Mut(mutation)).is_err() {
                            log::error!("Event loop was closed before a load could be applied");
                            break;
                        }
                    }
                });
            }
        }
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Initialize logging, open the window and run `constructors` until the window closes.
pub fn run<State: 'static + Default>(constructors: Vec<FlowConstructor<State>>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init()
        {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        // Fails only if a logger is already installed.
        let _ = console_log::init_with_level(log::Level::Info);
    }

    let event_loop: EventLoop<FlowEvent<State>> = EventLoop::with_user_event().build()?;

    let mut app: App<State> = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
