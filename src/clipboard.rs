use wl_clipboard_rs::copy::{MimeType, Options, Source};

/// Place the transcript on the Wayland clipboard as plain text.
pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    Options::new().copy(Source::Bytes(text.as_bytes().into()), MimeType::Text)?;
    Ok(())
}
