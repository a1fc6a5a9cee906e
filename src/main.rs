use std::sync::Arc;

use anyhow::Result;

use undertone::config;
use undertone::controller::TranscriptionController;
use undertone::proxy::{self, ProxySettings};
use undertone::theme;
use undertone::ui;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = config::read_app_config();
    let initial_theme = theme::resolve_initial();

    // The proxy runs in-process on the loopback interface; the UI talks to
    // it over HTTP so the upstream credential never leaves this task.
    let settings = ProxySettings::from_config(&config.proxy);
    let port = config.proxy.listen_port;
    tokio::spawn(async move {
        if let Err(e) = proxy::serve(settings, port).await {
            log::error!("Transcription proxy exited: {:#}", e);
        }
    });

    let endpoint = format!("http://127.0.0.1:{}/api/transcribe", port);
    let controller = Arc::new(TranscriptionController::new(
        endpoint,
        initial_theme,
        tokio::runtime::Handle::current(),
    ));

    // winit wants the main thread; transcription tasks stay on the runtime.
    ui::run(controller, config.waveform)
}
