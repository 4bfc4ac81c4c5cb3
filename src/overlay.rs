//! Debug panel text drawn over the frame with glyphon.
//!
//! The overlay lays out whatever [`Panel::overlay_text`](crate::debug_panel::Panel::overlay_text)
//! returns in the top-right corner, in the frame's main render pass after
//! every flow has drawn. A hidden panel is simply not drawn.

use std::fmt;

use anyhow::Context as _;
use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::data_structures::texture::Texture;

const FONT_SIZE: f32 = 13.0;
const LINE_HEIGHT: f32 = 17.0;
const MARGIN: f32 = 8.0;

pub struct PanelOverlay {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    buffer: Buffer,
    /// Text and scale factor of the current layout.
    laid_out: Option<(String, f32)>,
    visible: bool,
}

impl fmt::Debug for PanelOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelOverlay")
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl PanelOverlay {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let mut font_system = FontSystem::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        // The main pass has a depth attachment; text ignores and keeps it.
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::Always),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let buffer = Buffer::new(&mut font_system, Metrics::new(FONT_SIZE, LINE_HEIGHT));
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            viewport,
            atlas,
            renderer,
            buffer,
            laid_out: None,
            visible: false,
        }
    }

    /// Lay out `text` for a `size` (physical pixels) surface and upload its
    /// glyphs. `None` hides the overlay this frame.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        text: Option<&str>,
        size: (u32, u32),
        scale: f32,
    ) -> anyhow::Result<()> {
        let Some(text) = text else {
            self.visible = false;
            return Ok(());
        };
        self.visible = true;

        let stale = self
            .laid_out
            .as_ref()
            .is_none_or(|(laid_out, laid_out_scale)| laid_out != text || *laid_out_scale != scale);
        if stale {
            let font_system = &mut self.font_system;
            self.buffer
                .set_metrics(font_system, Metrics::new(FONT_SIZE * scale, LINE_HEIGHT * scale));
            self.buffer.set_size(font_system, None, None);
            self.buffer.set_text(
                font_system,
                text,
                &Attrs::new().family(Family::Monospace),
                Shaping::Basic,
                None,
            );
            self.buffer.shape_until_scroll(font_system, false);
            self.laid_out = Some((text.to_string(), scale));
        }

        let (width, height) = size;
        self.viewport.update(queue, Resolution { width, height });

        let text_width = self
            .buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max);
        let left = (width as f32 - text_width - MARGIN * scale).max(0.0);
        let area = TextArea {
            buffer: &self.buffer,
            left,
            top: MARGIN * scale,
            scale: 1.0,
            bounds: TextBounds {
                left: 0,
                top: 0,
                right: width as i32,
                bottom: height as i32,
            },
            default_color: Color::rgb(235, 235, 235),
            custom_glyphs: &[],
        };
        self.renderer
            .prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                [area],
                &mut self.swash_cache,
            )
            .context("Failed to prepare the debug panel text")
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) -> anyhow::Result<()> {
        if !self.visible {
            return Ok(());
        }
        self.renderer
            .render(&self.atlas, &self.viewport, pass)
            .context("Failed to draw the debug panel text")
    }

    /// Drop glyphs that were not used this frame.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
