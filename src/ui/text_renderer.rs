use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer as GlyphonTextRenderer, Viewport,
};
use std::sync::Arc;
use wgpu::{Device, Queue, TextureView};
use winit::dpi::PhysicalSize;

/// One piece of text to place this frame.
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: [f32; 4],
    /// Wrap width; None renders a single unwrapped line
    pub max_width: Option<f32>,
    /// Clip rect (x, y, w, h); None clips to the window
    pub bounds: Option<(f32, f32, f32, f32)>,
}

/// Glyphon-backed renderer for all window text: captions, status line,
/// file name, transcript body.
pub struct TextRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderer: GlyphonTextRenderer,
    viewport: Viewport,
    buffers: Vec<Buffer>,
    device: Arc<Device>,
    queue: Arc<Queue>,
    size: PhysicalSize<u32>,
}

impl TextRenderer {
    pub fn new(
        device: Arc<Device>,
        queue: Arc<Queue>,
        size: PhysicalSize<u32>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let mut font_system = FontSystem::new();
        font_system.db_mut().load_system_fonts();
        let swash_cache = SwashCache::new();

        let cache = Cache::new(&device);
        let viewport = Viewport::new(&device, &cache);
        let mut atlas = TextAtlas::new(&device, &queue, &cache, surface_format);
        let renderer =
            GlyphonTextRenderer::new(&mut atlas, &device, wgpu::MultisampleState::default(), None);

        Self {
            font_system,
            swash_cache,
            atlas,
            renderer,
            viewport,
            buffers: Vec::new(),
            device,
            queue,
            size,
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        self.viewport.update(
            &self.queue,
            Resolution {
                width: size.width,
                height: size.height,
            },
        );
    }

    /// Shape and draw all labels in one pass.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &TextureView,
        labels: &[Label],
    ) {
        if labels.is_empty() {
            return;
        }

        // One shaping buffer per label, reused across frames.
        while self.buffers.len() < labels.len() {
            self.buffers
                .push(Buffer::new(&mut self.font_system, Metrics::new(14.0, 18.0)));
        }

        for (buffer, label) in self.buffers.iter_mut().zip(labels) {
            let metrics = Metrics::new(label.font_size, label.font_size * 1.3);
            buffer.set_metrics(&mut self.font_system, metrics);
            buffer.set_size(&mut self.font_system, label.max_width, None);
            buffer.set_text(
                &mut self.font_system,
                &label.text,
                Attrs::new().family(Family::SansSerif),
                Shaping::Advanced,
            );
            buffer.shape_until_scroll(&mut self.font_system, true);
        }

        self.viewport.update(
            &self.queue,
            Resolution {
                width: self.size.width,
                height: self.size.height,
            },
        );

        let text_areas: Vec<TextArea> = self
            .buffers
            .iter()
            .zip(labels)
            .map(|(buffer, label)| {
                let color = Color::rgba(
                    (label.color[0] * 255.0) as u8,
                    (label.color[1] * 255.0) as u8,
                    (label.color[2] * 255.0) as u8,
                    (label.color[3] * 255.0) as u8,
                );
                let bounds = match label.bounds {
                    Some((bx, by, bw, bh)) => TextBounds {
                        left: bx as i32,
                        top: by as i32,
                        right: (bx + bw) as i32,
                        bottom: (by + bh) as i32,
                    },
                    None => TextBounds {
                        left: 0,
                        top: 0,
                        right: self.size.width as i32,
                        bottom: self.size.height as i32,
                    },
                };
                TextArea {
                    buffer,
                    left: label.x,
                    top: label.y,
                    scale: 1.0,
                    bounds,
                    default_color: color,
                    custom_glyphs: &[],
                }
            })
            .collect();

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Text Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if self
            .renderer
            .prepare(
                &self.device,
                &self.queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                text_areas,
                &mut self.swash_cache,
            )
            .is_ok()
        {
            let _ = self
                .renderer
                .render(&self.atlas, &self.viewport, &mut render_pass);
        }

        drop(render_pass);
        self.atlas.trim();
    }
}
