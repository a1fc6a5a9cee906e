use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton},
};

use crate::controller::TranscriptionController;

use super::buttons::{ButtonKind, ButtonManager};
use super::waveform::WaveField;

/// Routes pointer events to the wave field (decorative) and the buttons
/// (functional), and maps clicks onto controller actions.
pub struct EventHandler {
    pub cursor_position: Option<PhysicalPosition<f64>>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            cursor_position: None,
        }
    }

    pub fn handle_cursor_moved(
        &mut self,
        position: PhysicalPosition<f64>,
        wave_field: &mut WaveField,
        buttons: &mut ButtonManager,
    ) -> bool {
        self.cursor_position = Some(position);
        wave_field.set_pointer_target(position.x as f32, position.y as f32);
        buttons.handle_mouse_move(position)
    }

    pub fn handle_cursor_left(&mut self, buttons: &mut ButtonManager) {
        self.cursor_position = None;
        buttons.reset_hover_states();
    }

    pub fn handle_mouse_input(
        &self,
        mouse_button: MouseButton,
        state: ElementState,
        buttons: &mut ButtonManager,
        controller: &TranscriptionController,
    ) -> bool {
        let Some(position) = self.cursor_position else {
            return false;
        };
        match buttons.handle_pointer_event(mouse_button, state, position) {
            Some(kind) => {
                Self::dispatch(kind, controller);
                true
            }
            None => state == ElementState::Pressed,
        }
    }

    fn dispatch(kind: ButtonKind, controller: &TranscriptionController) {
        match kind {
            ButtonKind::ChooseFile => controller.choose_file(),
            ButtonKind::Transcribe => controller.transcribe(),
            ButtonKind::Copy => controller.copy_transcript(),
            ButtonKind::ThemeToggle => controller.toggle_theme(),
        }
    }
}
