use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowId,
};

use crate::config::WaveformConfig;
use crate::controller::TranscriptionController;

use super::window::WindowState;

/// Runs the winit event loop on the calling thread until the window closes.
pub fn run(controller: Arc<TranscriptionController>, waveform: WaveformConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App {
        windows: HashMap::new(),
        controller,
        waveform,
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    windows: HashMap<WindowId, WindowState>,
    controller: Arc<TranscriptionController>,
    waveform: WaveformConfig,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }
        let attributes = winit::window::Window::default_attributes()
            .with_title("undertone")
            .with_inner_size(LogicalSize::new(960.0, 600.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        match WindowState::new(window.clone(), self.controller.clone(), &self.waveform) {
            Ok(state) => {
                window.request_redraw();
                self.windows.insert(window.id(), state);
            }
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.windows.get_mut(&window_id) else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                self.windows.remove(&window_id);
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.windows.remove(&window_id);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => window.resize(size),
            WindowEvent::CursorMoved { position, .. } => window.handle_cursor_moved(position),
            WindowEvent::CursorLeft { .. } => window.handle_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                window.handle_mouse_input(button, state)
            }
            WindowEvent::RedrawRequested => window.draw(),
            _ => {}
        }
    }
}
