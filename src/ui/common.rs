use std::path::PathBuf;
use std::time::Instant;

use crate::theme::Theme;

/// Where the current transcription attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Transcribing,
    Done,
    Failed(String),
}

/// Session data shared between the UI thread and transcription tasks.
/// One instance per page of the app, behind an `Arc<RwLock<_>>`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub selected_file: Option<PathBuf>,
    pub status: SessionStatus,
    pub transcript: Option<String>,
    pub result_visible: bool,
    /// While set and in the future, the copy button reads "Copied!"
    pub copy_feedback_until: Option<Instant>,
    pub theme: Theme,
}

impl SessionState {
    pub fn new(theme: Theme) -> Self {
        Self {
            selected_file: None,
            status: SessionStatus::Idle,
            transcript: None,
            result_visible: false,
            copy_feedback_until: None,
            theme,
        }
    }

    /// Display label for the file slot.
    pub fn file_label(&self) -> String {
        self.selected_file
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No file selected".to_string())
    }

    pub fn copy_feedback_active(&self) -> bool {
        self.copy_feedback_until
            .map(|deadline| Instant::now() < deadline)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn file_label_falls_back_to_placeholder() {
        let mut state = SessionState::new(Theme::Light);
        assert_eq!(state.file_label(), "No file selected");

        state.selected_file = Some(PathBuf::from("/tmp/interview take 3.wav"));
        assert_eq!(state.file_label(), "interview take 3.wav");
    }

    #[test]
    fn copy_feedback_expires() {
        let mut state = SessionState::new(Theme::Dark);
        assert!(!state.copy_feedback_active());

        state.copy_feedback_until = Some(Instant::now() + Duration::from_secs(2));
        assert!(state.copy_feedback_active());

        state.copy_feedback_until = Some(Instant::now() - Duration::from_millis(1));
        assert!(!state.copy_feedback_active());
    }
}
