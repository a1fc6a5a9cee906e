use winit::dpi::PhysicalSize;

pub type Rect = (f32, f32, f32, f32);

pub const MARGIN: f32 = 24.0;
pub const BUTTON_HEIGHT: f32 = 36.0;
pub const BUTTON_WIDTH: f32 = 140.0;
pub const COPY_BUTTON_WIDTH: f32 = 64.0;
pub const COPY_BUTTON_HEIGHT: f32 = 28.0;
pub const PANEL_PADDING: f32 = 16.0;

/// Computes every control rect from the window size. One instance per
/// window, rebuilt on resize.
#[derive(Debug, Clone, Copy)]
pub struct UiLayout {
    pub width: f32,
    pub height: f32,
}

impl UiLayout {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            width: size.width as f32,
            height: size.height as f32,
        }
    }

    pub fn choose_file_button(&self) -> Rect {
        (MARGIN, MARGIN, BUTTON_WIDTH, BUTTON_HEIGHT)
    }

    pub fn transcribe_button(&self) -> Rect {
        (MARGIN + BUTTON_WIDTH + 16.0, MARGIN, BUTTON_WIDTH, BUTTON_HEIGHT)
    }

    pub fn theme_button(&self) -> Rect {
        (self.width - MARGIN - 110.0, MARGIN, 110.0, BUTTON_HEIGHT)
    }

    /// Position of the selected-file label, right of the action buttons.
    pub fn file_label_pos(&self) -> (f32, f32) {
        (MARGIN + 2.0 * (BUTTON_WIDTH + 16.0), MARGIN + 10.0)
    }

    pub fn status_pos(&self) -> (f32, f32) {
        (MARGIN, MARGIN + BUTTON_HEIGHT + 18.0)
    }

    pub fn result_panel(&self) -> Rect {
        let top = MARGIN + BUTTON_HEIGHT + 48.0;
        (
            MARGIN,
            top,
            (self.width - 2.0 * MARGIN).max(0.0),
            (self.height - top - MARGIN).max(0.0),
        )
    }

    /// Copy control sits inside the result panel, top-right.
    pub fn copy_button(&self) -> Rect {
        let (px, py, pw, _ph) = self.result_panel();
        (
            px + pw - COPY_BUTTON_WIDTH - PANEL_PADDING,
            py + PANEL_PADDING * 0.75,
            COPY_BUTTON_WIDTH,
            COPY_BUTTON_HEIGHT,
        )
    }

    /// Transcript text origin and wrap width inside the result panel.
    pub fn transcript_text(&self) -> (f32, f32, f32) {
        let (px, py, pw, _ph) = self.result_panel();
        (
            px + PANEL_PADDING,
            py + PANEL_PADDING + COPY_BUTTON_HEIGHT + 8.0,
            (pw - 2.0 * PANEL_PADDING).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_button_sits_inside_the_result_panel() {
        let layout = UiLayout::new(PhysicalSize::new(960, 600));
        let (px, py, pw, ph) = layout.result_panel();
        let (cx, cy, cw, ch) = layout.copy_button();
        assert!(cx >= px && cx + cw <= px + pw);
        assert!(cy >= py && cy + ch <= py + ph);
    }

    #[test]
    fn rects_degrade_gracefully_on_tiny_windows() {
        let layout = UiLayout::new(PhysicalSize::new(60, 40));
        let (_, _, pw, ph) = layout.result_panel();
        assert!(pw >= 0.0 && ph >= 0.0);
        let (_, _, wrap) = layout.transcript_text();
        assert!(wrap >= 0.0);
    }
}
