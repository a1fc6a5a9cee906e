use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

/// Deepgram response shape, reduced to the path the UI consumes.
/// Every level is optional so a sparse or unexpected payload degrades to
/// "no transcript" instead of a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionResponse {
    pub results: Option<TranscriptionResults>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionResults {
    pub channels: Option<Vec<TranscriptionChannel>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionChannel {
    pub alternatives: Option<Vec<TranscriptionAlternative>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionAlternative {
    pub transcript: Option<String>,
}

/// Pull the transcript out of `results.channels[0].alternatives[0]`.
/// An empty transcript counts as absent.
pub fn extract_transcript(response: &TranscriptionResponse) -> Option<&str> {
    response
        .results
        .as_ref()?
        .channels
        .as_ref()?
        .first()?
        .alternatives
        .as_ref()?
        .first()?
        .transcript
        .as_deref()
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("No transcription found in the response")]
    MissingTranscript,
    #[error("Failed to read audio file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Content type for an audio file, guessed from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("aac") => "audio/aac",
        Some("m4a") => "audio/mp4",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Client side of the transcription flow: one POST to the local proxy,
/// transcript extraction from the relayed Deepgram payload.
pub struct TranscribeClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TranscribeClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub async fn transcribe_file(&self, path: &Path) -> Result<String, TranscribeError> {
        let audio = tokio::fs::read(path).await?;
        self.transcribe_bytes(audio, content_type_for(path)).await
    }

    pub async fn transcribe_bytes(
        &self,
        audio: Vec<u8>,
        content_type: &str,
    ) -> Result<String, TranscribeError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The proxy normalizes errors into {"error": ...}; fall back to a
            // synthesized status line when the body is not usable.
            let payload: serde_json::Value = response
                .json()
                .await
                .unwrap_or_else(|_| serde_json::json!({}));
            let message = payload
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .unwrap_or_else(|| {
                    format!(
                        "API Error: {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("")
                    )
                });
            return Err(TranscribeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        extract_transcript(&parsed)
            .map(str::to_owned)
            .ok_or(TranscribeError::MissingTranscript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TranscriptionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_transcript_at_nested_path() {
        let response = parse(
            r#"{"results": {"channels": [{"alternatives": [{"transcript": "hello world", "confidence": 0.98}]}]}}"#,
        );
        assert_eq!(extract_transcript(&response), Some("hello world"));
    }

    #[test]
    fn first_channel_and_alternative_win() {
        let response = parse(
            r#"{"results": {"channels": [
                {"alternatives": [{"transcript": "first"}, {"transcript": "second"}]},
                {"alternatives": [{"transcript": "other channel"}]}
            ]}}"#,
        );
        assert_eq!(extract_transcript(&response), Some("first"));
    }

    #[test]
    fn missing_levels_yield_none() {
        assert_eq!(extract_transcript(&parse("{}")), None);
        assert_eq!(extract_transcript(&parse(r#"{"results": {}}"#)), None);
        assert_eq!(
            extract_transcript(&parse(r#"{"results": {"channels": []}}"#)),
            None
        );
        assert_eq!(
            extract_transcript(&parse(
                r#"{"results": {"channels": [{"alternatives": []}]}}"#
            )),
            None
        );
    }

    #[test]
    fn empty_transcript_counts_as_absent() {
        let response =
            parse(r#"{"results": {"channels": [{"alternatives": [{"transcript": ""}]}]}}"#);
        assert_eq!(extract_transcript(&response), None);
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for(Path::new("take1.wav")), "audio/wav");
        assert_eq!(content_type_for(Path::new("take1.MP3")), "audio/mpeg");
        assert_eq!(content_type_for(Path::new("voice.opus")), "audio/ogg");
        assert_eq!(
            content_type_for(Path::new("mystery")),
            "application/octet-stream"
        );
    }
}
