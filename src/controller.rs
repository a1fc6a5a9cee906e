use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::clipboard;
use crate::theme::{self, Theme};
use crate::transcribe::TranscribeClient;
use crate::ui::common::{SessionState, SessionStatus};

const COPY_FEEDBACK: Duration = Duration::from_secs(2);

/// Drives the transcribe/copy/theme actions from UI events. Owns the shared
/// session state; transcription itself runs as a tokio task so the event
/// loop never blocks on the network.
pub struct TranscriptionController {
    state: Arc<RwLock<SessionState>>,
    busy: Arc<AtomicBool>,
    client: Arc<TranscribeClient>,
    runtime: tokio::runtime::Handle,
}

/// Clears the in-flight flag when the transcription task ends, whatever the
/// outcome. The trigger control must never stay disabled.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl TranscriptionController {
    pub fn new(endpoint: String, initial_theme: Theme, runtime: tokio::runtime::Handle) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::new(initial_theme))),
            busy: Arc::new(AtomicBool::new(false)),
            client: Arc::new(TranscribeClient::new(endpoint)),
            runtime,
        }
    }

    pub fn state(&self) -> Arc<RwLock<SessionState>> {
        self.state.clone()
    }

    /// True while a transcription request is in flight; the trigger button
    /// is rendered disabled and clicks are no-ops.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Open the native file picker. Cancelling clears the selection, which
    /// restores the placeholder label.
    pub fn choose_file(&self) {
        let picked = rfd::FileDialog::new()
            .add_filter(
                "Audio",
                &["wav", "mp3", "flac", "ogg", "opus", "aac", "m4a", "webm"],
            )
            .pick_file();
        self.set_selected_file(picked);
    }

    pub fn set_selected_file(&self, path: Option<PathBuf>) {
        self.state.write().selected_file = path;
    }

    /// Kick off one transcription attempt. At most one runs at a time.
    pub fn transcribe(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            return;
        }
        let guard = BusyGuard(self.busy.clone());

        let Some(path) = self.state.read().selected_file.clone() else {
            self.state.write().status =
                SessionStatus::Failed("Please select an audio file".to_string());
            return;
        };

        {
            let mut state = self.state.write();
            state.status = SessionStatus::Transcribing;
            state.result_visible = false;
        }

        let state = self.state.clone();
        let client = self.client.clone();
        self.runtime.spawn(async move {
            run_transcription(guard, state, client, path).await;
        });
    }

    /// Copy the displayed transcript. Failure is logged, never surfaced:
    /// copying is a convenience, not the critical path.
    pub fn copy_transcript(&self) {
        let text = self.state.read().transcript.clone();
        let Some(text) = text else { return };
        match clipboard::copy_to_clipboard(&text) {
            Ok(()) => {
                self.state.write().copy_feedback_until = Some(Instant::now() + COPY_FEEDBACK);
            }
            Err(e) => log::warn!("Failed to copy transcript: {}", e),
        }
    }

    pub fn toggle_theme(&self) {
        let next = {
            let mut state = self.state.write();
            state.theme = state.theme.toggled();
            state.theme
        };
        if let Err(e) = theme::store_preference(next) {
            log::warn!("Failed to persist theme preference: {}", e);
        }
    }
}

async fn run_transcription(
    _guard: BusyGuard,
    state: Arc<RwLock<SessionState>>,
    client: Arc<TranscribeClient>,
    path: PathBuf,
) {
    match client.transcribe_file(&path).await {
        Ok(transcript) => {
            log::info!("Transcription completed ({} chars)", transcript.len());
            let mut state = state.write();
            state.transcript = Some(transcript);
            state.result_visible = true;
            state.status = SessionStatus::Done;
        }
        Err(err) => {
            log::error!("Transcription failed: {}", err);
            state.write().status = SessionStatus::Failed(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(runtime: &tokio::runtime::Runtime) -> TranscriptionController {
        TranscriptionController::new(
            "http://127.0.0.1:1/api/transcribe".to_string(),
            Theme::Light,
            runtime.handle().clone(),
        )
    }

    #[test]
    fn transcribe_without_file_fails_and_re_enables() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let controller = controller(&runtime);

        controller.transcribe();

        let state = controller.state();
        let state = state.read();
        assert_eq!(
            state.status,
            SessionStatus::Failed("Please select an audio file".to_string())
        );
        assert!(!controller.is_busy());
    }

    #[test]
    fn failed_attempt_re_enables_the_trigger() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let controller = controller(&runtime);
        controller.set_selected_file(Some(PathBuf::from("/nonexistent/audio.wav")));

        controller.transcribe();

        // The spawned task ends quickly: the file read fails before any
        // network traffic. Poll the busy flag rather than racing it.
        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.is_busy() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!controller.is_busy());

        let state = controller.state();
        let state = state.read();
        assert!(matches!(state.status, SessionStatus::Failed(_)));
        assert!(!state.result_visible);
    }

    #[test]
    fn busy_guard_clears_flag_on_drop() {
        let flag = Arc::new(AtomicBool::new(true));
        {
            let _guard = BusyGuard(flag.clone());
        }
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn duplicate_submission_is_a_no_op() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let controller = controller(&runtime);
        controller.busy.store(true, Ordering::SeqCst);

        controller.transcribe();

        // Still marked busy, and the status was left untouched.
        assert!(controller.is_busy());
        let state = controller.state();
        assert_eq!(state.read().status, SessionStatus::Idle);
    }
}
