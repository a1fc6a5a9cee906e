use serde::{Deserialize, Serialize};

/// Settings for the local transcription proxy endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Port the proxy listens on (loopback only)
    pub listen_port: u16,
    /// Upstream speech-to-text API endpoint
    pub upstream_url: String,
    /// Name of the environment variable holding the upstream credential.
    /// The variable is read per request, not at startup.
    pub api_key_env: String,
    /// Optional bound on the upstream call duration, in seconds.
    /// Unset means the call may block indefinitely.
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_port: 8787,
            upstream_url: "https://api.deepgram.com/v1/listen".to_string(),
            api_key_env: "DEEPGRAM_API_KEY".to_string(),
            upstream_timeout_secs: None,
        }
    }
}

/// Decorative waveform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Number of animated wave lines
    pub wave_count: usize,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self { wave_count: 3 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub proxy: ProxyConfig,
    pub waveform: WaveformConfig,
}

/// Helper function to read the application configuration
pub fn read_app_config() -> AppConfig {
    match std::fs::read_to_string("config.json") {
        Ok(config_str) => match serde_json::from_str(&config_str) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Failed to parse config.json: {}. Using default configuration.",
                    e
                );
                AppConfig::default()
            }
        },
        Err(e) => {
            log::debug!(
                "Failed to read config.json: {}. Using default configuration.",
                e
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_deepgram() {
        let config = AppConfig::default();
        assert_eq!(config.proxy.upstream_url, "https://api.deepgram.com/v1/listen");
        assert_eq!(config.proxy.api_key_env, "DEEPGRAM_API_KEY");
        assert!(config.proxy.upstream_timeout_secs.is_none());
        assert_eq!(config.waveform.wave_count, 3);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"proxy": {"listen_port": 9000}}"#).unwrap();
        assert_eq!(config.proxy.listen_port, 9000);
        assert_eq!(config.proxy.api_key_env, "DEEPGRAM_API_KEY");
        assert_eq!(config.waveform.wave_count, 3);
    }
}
