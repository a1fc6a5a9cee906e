use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton},
    window::Window,
};

use crate::config::WaveformConfig;
use crate::controller::TranscriptionController;
use crate::theme::{palette, Palette};

use super::buttons::{ButtonKind, ButtonManager};
use super::common::SessionStatus;
use super::event_handler::EventHandler;
use super::layout::UiLayout;
use super::render_pipeline::{Panel, RenderPipelines};
use super::text_renderer::{Label, TextRenderer};
use super::waveform::WaveField;
use super::waveform_renderer::WaveformRenderer;

const PANEL_RADIUS: f32 = 10.0;
const LABEL_SIZE: f32 = 14.0;
const TRANSCRIPT_SIZE: f32 = 15.0;

/// Everything owned by one application window: the wgpu surface, the
/// renderers, the wave field, and the controls. Redraws continuously so
/// the waveform keeps animating.
pub struct WindowState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    pipelines: RenderPipelines,
    wave_field: WaveField,
    waveform_renderer: WaveformRenderer,
    text_renderer: TextRenderer,
    buttons: ButtonManager,
    result_panel: Panel,
    event_handler: EventHandler,
    controller: Arc<TranscriptionController>,
    started: Instant,
}

impl WindowState {
    pub fn new(
        window: Arc<Window>,
        controller: Arc<TranscriptionController>,
        waveform_config: &WaveformConfig,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("No suitable GPU adapter found")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .context("Failed to create wgpu device")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = RenderPipelines::new(&device, &config);
        let result_panel = pipelines.create_panel(&device);
        let buttons = ButtonManager::new(&device, &pipelines, size);

        let wave_field = WaveField::new(
            size.width as f32,
            size.height as f32,
            waveform_config.wave_count,
        );
        let waveform_renderer = WaveformRenderer::new(&device, surface_format, size);
        let text_renderer = TextRenderer::new(device.clone(), queue.clone(), size, surface_format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipelines,
            wave_field,
            waveform_renderer,
            text_renderer,
            buttons,
            result_panel,
            event_handler: EventHandler::new(),
            controller,
            started: Instant::now(),
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.wave_field
            .resize(size.width as f32, size.height as f32);
        self.waveform_renderer.resize(size);
        self.text_renderer.resize(size);
        self.buttons.resize(size);
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.event_handler
            .handle_cursor_moved(position, &mut self.wave_field, &mut self.buttons);
    }

    pub fn handle_cursor_left(&mut self) {
        self.event_handler.handle_cursor_left(&mut self.buttons);
    }

    pub fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        self.event_handler
            .handle_mouse_input(button, state, &mut self.buttons, &self.controller);
    }

    pub fn draw(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.window.request_redraw();
                return;
            }
            Err(e) => {
                log::error!("Failed to acquire surface frame: {:?}", e);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Snapshot shared state once per frame; the lock is never held
        // across GPU work.
        let state = self.controller.state();
        let state = state.read().clone();
        let colors = palette(state.theme);

        self.buttons.set_transcribe_enabled(!self.controller.is_busy());
        self.buttons.set_copy_visible(state.result_visible);

        self.wave_field
            .update(self.started.elapsed().as_secs_f32());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.pipelines
            .draw_background(&mut encoder, &view, colors.background);
        self.waveform_renderer.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            &self.wave_field,
            &colors,
        );

        let layout = UiLayout::new(PhysicalSize::new(self.config.width, self.config.height));
        if state.result_visible {
            self.pipelines.draw_panel(
                &mut encoder,
                &view,
                &self.queue,
                &self.result_panel,
                layout.result_panel(),
                PANEL_RADIUS,
                colors.panel,
            );
        }
        self.buttons
            .render(&mut encoder, &view, &self.queue, &self.pipelines, &colors);

        let labels = self.build_labels(&state, &colors, &layout);
        self.text_renderer.render(&mut encoder, &view, &labels);

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        // Continuous animation
        self.window.request_redraw();
    }

    fn build_labels(
        &self,
        state: &super::common::SessionState,
        colors: &Palette,
        layout: &UiLayout,
    ) -> Vec<Label> {
        let mut labels = Vec::new();

        labels.push(button_caption(
            self.buttons.rect(ButtonKind::ChooseFile),
            "Choose File",
            colors.button_text,
        ));
        labels.push(button_caption(
            self.buttons.rect(ButtonKind::Transcribe),
            "Transcribe",
            colors.button_text,
        ));
        labels.push(button_caption(
            self.buttons.rect(ButtonKind::ThemeToggle),
            match state.theme {
                crate::theme::Theme::Light => "Dark mode",
                crate::theme::Theme::Dark => "Light mode",
            },
            colors.button_text,
        ));

        let (fx, fy) = layout.file_label_pos();
        labels.push(Label {
            text: state.file_label(),
            x: fx,
            y: fy,
            font_size: LABEL_SIZE,
            color: colors.muted_text,
            max_width: None,
            bounds: None,
        });

        let (sx, sy) = layout.status_pos();
        let (status_text, status_color) = match &state.status {
            SessionStatus::Idle => (String::new(), colors.muted_text),
            SessionStatus::Transcribing => ("Transcribing...".to_string(), colors.muted_text),
            SessionStatus::Done => (
                "Transcription completed successfully!".to_string(),
                colors.success,
            ),
            SessionStatus::Failed(message) => (format!("Error: {}", message), colors.danger),
        };
        if !status_text.is_empty() {
            labels.push(Label {
                text: status_text,
                x: sx,
                y: sy,
                font_size: LABEL_SIZE,
                color: status_color,
                max_width: Some(layout.width - 2.0 * sx),
                bounds: None,
            });
        }

        if state.result_visible {
            labels.push(button_caption(
                self.buttons.rect(ButtonKind::Copy),
                if state.copy_feedback_active() {
                    "Copied!"
                } else {
                    "Copy"
                },
                colors.button_text,
            ));

            if let Some(transcript) = &state.transcript {
                let (tx, ty, wrap) = layout.transcript_text();
                let (px, py, pw, ph) = layout.result_panel();
                labels.push(Label {
                    text: transcript.clone(),
                    x: tx,
                    y: ty,
                    font_size: TRANSCRIPT_SIZE,
                    color: colors.text,
                    max_width: Some(wrap),
                    bounds: Some((px, py, pw, ph)),
                });
            }
        }

        labels
    }
}

fn button_caption(rect: (f32, f32, f32, f32), text: &str, color: [f32; 4]) -> Label {
    let (x, y, w, h) = rect;
    // Approximate centering; glyphon lays out from the top-left.
    let approx_width = text.len() as f32 * LABEL_SIZE * 0.52;
    Label {
        text: text.to_string(),
        x: x + ((w - approx_width) / 2.0).max(6.0),
        y: y + (h - LABEL_SIZE * 1.3) / 2.0,
        font_size: LABEL_SIZE,
        color,
        max_width: None,
        bounds: Some((x, y, w, h)),
    }
}
