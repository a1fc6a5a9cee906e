use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton},
};

use crate::theme::Palette;

use super::layout::{Rect, UiLayout};
use super::render_pipeline::{Panel, RenderPipelines};

const BUTTON_RADIUS: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    ChooseFile,
    Transcribe,
    Copy,
    ThemeToggle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ButtonState {
    Normal,
    Hover,
    Pressed,
}

struct Button {
    kind: ButtonKind,
    state: ButtonState,
    rect: Rect,
    enabled: bool,
    visible: bool,
    panel: Panel,
}

impl Button {
    fn contains(&self, position: PhysicalPosition<f64>) -> bool {
        let (x, y, w, h) = self.rect;
        position.x as f32 >= x
            && position.x as f32 <= x + w
            && position.y as f32 >= y
            && position.y as f32 <= y + h
    }

    fn fill_color(&self, palette: &Palette) -> [f32; 4] {
        if !self.enabled {
            return palette.button_disabled;
        }
        match self.state {
            ButtonState::Normal => palette.button,
            ButtonState::Hover | ButtonState::Pressed => palette.button_hover,
        }
    }
}

/// Owns the four window controls: choose-file, transcribe, copy, theme
/// toggle. Hit testing and hover/press state live here; the actions they
/// trigger live in the controller.
pub struct ButtonManager {
    buttons: Vec<Button>,
    layout: UiLayout,
}

impl ButtonManager {
    pub fn new(device: &wgpu::Device, pipelines: &RenderPipelines, size: PhysicalSize<u32>) -> Self {
        let layout = UiLayout::new(size);
        let buttons = [
            ButtonKind::ChooseFile,
            ButtonKind::Transcribe,
            ButtonKind::Copy,
            ButtonKind::ThemeToggle,
        ]
        .into_iter()
        .map(|kind| Button {
            kind,
            state: ButtonState::Normal,
            rect: (0.0, 0.0, 0.0, 0.0),
            enabled: true,
            visible: kind != ButtonKind::Copy,
            panel: pipelines.create_panel(device),
        })
        .collect();

        let mut manager = Self { buttons, layout };
        manager.apply_layout();
        manager
    }

    fn apply_layout(&mut self) {
        for button in &mut self.buttons {
            button.rect = match button.kind {
                ButtonKind::ChooseFile => self.layout.choose_file_button(),
                ButtonKind::Transcribe => self.layout.transcribe_button(),
                ButtonKind::Copy => self.layout.copy_button(),
                ButtonKind::ThemeToggle => self.layout.theme_button(),
            };
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.layout = UiLayout::new(size);
        self.apply_layout();
    }

    pub fn rect(&self, kind: ButtonKind) -> Rect {
        self.buttons
            .iter()
            .find(|b| b.kind == kind)
            .map(|b| b.rect)
            .unwrap_or((0.0, 0.0, 0.0, 0.0))
    }

    /// The transcribe trigger is disabled while a request is in flight.
    pub fn set_transcribe_enabled(&mut self, enabled: bool) {
        if let Some(button) = self
            .buttons
            .iter_mut()
            .find(|b| b.kind == ButtonKind::Transcribe)
        {
            button.enabled = enabled;
            if !enabled {
                button.state = ButtonState::Normal;
            }
        }
    }

    /// The copy control only exists while a result is displayed.
    pub fn set_copy_visible(&mut self, visible: bool) {
        if let Some(button) = self.buttons.iter_mut().find(|b| b.kind == ButtonKind::Copy) {
            button.visible = visible;
            if !visible {
                button.state = ButtonState::Normal;
            }
        }
    }

    /// Update hover states; returns true when anything changed.
    pub fn handle_mouse_move(&mut self, position: PhysicalPosition<f64>) -> bool {
        let mut changed = false;
        for button in &mut self.buttons {
            let hovered = button.visible && button.enabled && button.contains(position);
            let next = match (button.state, hovered) {
                (ButtonState::Pressed, true) => ButtonState::Pressed,
                (_, true) => ButtonState::Hover,
                (_, false) => ButtonState::Normal,
            };
            if next != button.state {
                button.state = next;
                changed = true;
            }
        }
        changed
    }

    pub fn reset_hover_states(&mut self) {
        for button in &mut self.buttons {
            button.state = ButtonState::Normal;
        }
    }

    /// Press/release tracking. A click fires on release over the same
    /// button that was pressed.
    pub fn handle_pointer_event(
        &mut self,
        mouse_button: MouseButton,
        state: ElementState,
        position: PhysicalPosition<f64>,
    ) -> Option<ButtonKind> {
        if mouse_button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                for button in &mut self.buttons {
                    if button.visible && button.enabled && button.contains(position) {
                        button.state = ButtonState::Pressed;
                    }
                }
                None
            }
            ElementState::Released => {
                let mut clicked = None;
                for button in &mut self.buttons {
                    let was_pressed = button.state == ButtonState::Pressed;
                    if was_pressed && button.contains(position) {
                        clicked = Some(button.kind);
                        button.state = ButtonState::Hover;
                    } else if was_pressed {
                        button.state = ButtonState::Normal;
                    }
                }
                clicked
            }
        }
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        queue: &wgpu::Queue,
        pipelines: &RenderPipelines,
        palette: &Palette,
    ) {
        for button in &self.buttons {
            if !button.visible {
                continue;
            }
            pipelines.draw_panel(
                encoder,
                view,
                queue,
                &button.panel,
                button.rect,
                BUTTON_RADIUS,
                button.fill_color(palette),
            );
        }
    }
}
