use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use thiserror::Error;

use crate::config::ProxyConfig;

/// Pass-through endpoint settings. The credential itself is looked up in the
/// process environment on every request so a key rotated under a running
/// process takes effect immediately.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub upstream_url: String,
    pub api_key_env: String,
    pub upstream_timeout: Option<Duration>,
}

impl ProxySettings {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            upstream_url: config.upstream_url.clone(),
            api_key_env: config.api_key_env.clone(),
            upstream_timeout: config.upstream_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("API key not configured")]
    MissingApiKey,
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Clone)]
struct ProxyState {
    settings: ProxySettings,
    http: reqwest::Client,
}

/// Build the proxy router. Registered with `any()` so the method check and
/// its JSON error body stay under our control.
pub fn router(settings: ProxySettings) -> anyhow::Result<Router> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.upstream_timeout {
        builder = builder.timeout(timeout);
    }
    let http = builder.build()?;
    Ok(Router::new()
        .route("/api/transcribe", any(transcribe))
        .with_state(ProxyState { settings, http }))
}

/// Bind the proxy on the loopback interface and serve until the process exits.
pub async fn serve(settings: ProxySettings, port: u16) -> anyhow::Result<()> {
    let app = router(settings)?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    log::info!("Transcription proxy listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn transcribe(
    axum::extract::State(state): axum::extract::State<ProxyState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Single normalization point: no failure below may escape as a panic.
    match forward(&state, method, &headers, body).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn forward(
    state: &ProxyState,
    method: Method,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if method != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    let api_key = std::env::var(&state.settings.api_key_env)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or(ProxyError::MissingApiKey)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned();

    let upstream = state
        .http
        .post(&state.settings.upstream_url)
        .header("Authorization", format!("Token {}", api_key))
        .header("Content-Type", content_type)
        .body(body)
        .send()
        .await
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    let status = upstream.status();
    if !status.is_success() {
        // Error payloads are best-effort JSON; an unparseable body degrades
        // to an empty object and a synthesized status line.
        let payload: serde_json::Value = upstream
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        let message = payload
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| {
                format!(
                    "API Error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
            });
        return Err(ProxyError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    let relayed = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        relayed,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            ProxyError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ProxyError::MissingApiKey.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ProxyError::Upstream {
                status: 429,
                message: "slow down".into()
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ProxyError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_error_displays_its_message() {
        let err = ProxyError::Upstream {
            status: 400,
            message: "unsupported encoding".into(),
        };
        assert_eq!(err.to_string(), "unsupported encoding");
    }
}
