pub mod app;
pub mod buttons;
pub mod common;
pub mod event_handler;
pub mod layout;
pub mod render_pipeline;
pub mod text_renderer;
pub mod waveform;
pub mod waveform_renderer;
pub mod window;

pub use app::run;
