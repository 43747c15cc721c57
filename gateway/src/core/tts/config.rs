//! ElevenLabs streaming TTS configuration and voice settings.

use std::time::Duration;

use serde_json::{Map, Value, json};
use url::Url;
use zeroize::Zeroizing;

use crate::core::error::{BackendError, BackendResult};
use crate::core::types::VoiceOptions;

/// ElevenLabs API base URL.
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default model.
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_v3";

/// Default language code sent with each request.
pub const DEFAULT_LANGUAGE_CODE: &str = "he";

/// Output format requested from the stream endpoint.
pub const ELEVENLABS_OUTPUT_FORMAT: &str = "pcm_16000";

/// Sample rate matching [`ELEVENLABS_OUTPUT_FORMAT`].
pub const ELEVENLABS_OUTPUT_SAMPLE_RATE: u32 = 16000;

/// Default `optimize_streaming_latency` level.
pub const DEFAULT_OPTIMIZE_LATENCY: u8 = 2;

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stability values accepted by the v3 model.
pub const ALLOWED_STABILITY: [f64; 3] = [0.0, 0.5, 1.0];

/// Stability used when the caller's value is rejected in lenient mode.
pub const FALLBACK_STABILITY: f64 = 0.5;

/// Option keys that select request routing instead of voice settings.
const ROUTING_KEYS: [&str; 3] = ["voice_id", "model_id", "language_code"];

/// Settings for [`super::StreamingTTSClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingTtsConfig {
    /// `xi-api-key` header value, wiped on drop
    pub api_key: Option<Zeroizing<String>>,
    /// Scheme and host, without trailing slash
    pub base_url: String,
    /// Voice used when the request does not pick one
    pub voice_id: Option<String>,
    pub model_id: String,
    pub language_code: String,
    pub optimize_streaming_latency: u8,
    pub request_timeout: Duration,
    /// Reject invalid stability instead of coercing it
    pub strict_voice_settings: bool,
}

impl Default for StreamingTtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: ELEVENLABS_BASE_URL.to_string(),
            voice_id: None,
            model_id: DEFAULT_ELEVENLABS_MODEL.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            optimize_streaming_latency: DEFAULT_OPTIMIZE_LATENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            strict_voice_settings: false,
        }
    }
}

impl StreamingTtsConfig {
    /// Stream endpoint for `voice_id`, including query parameters.
    ///
    /// The voice id is appended as a single percent-encoded path segment.
    pub fn stream_url(&self, voice_id: &str) -> BackendResult<Url> {
        if !is_valid_voice_id(voice_id) {
            return Err(BackendError::InvalidRequest(format!(
                "voice id '{voice_id}' may only contain letters, digits, '_' and '-'"
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            BackendError::NotConfigured(format!("Invalid ElevenLabs base URL '{}': {e}", self.base_url))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                BackendError::NotConfigured(format!(
                    "ElevenLabs base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v1", "text-to-speech", voice_id, "stream"]);

        url.query_pairs_mut()
            .clear()
            .append_pair("output_format", ELEVENLABS_OUTPUT_FORMAT)
            .append_pair(
                "optimize_streaming_latency",
                &self.optimize_streaming_latency.to_string(),
            );

        Ok(url)
    }
}

/// Whether `voice_id` is a plain ElevenLabs voice identifier.
pub fn is_valid_voice_id(voice_id: &str) -> bool {
    !voice_id.is_empty()
        && voice_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Default voice settings for the v3 model.
pub fn default_voice_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("stability".to_string(), json!(0.5));
    settings.insert("similarity_boost".to_string(), json!(0.85));
    settings.insert("style".to_string(), json!(0.6));
    settings.insert("use_speaker_boost".to_string(), json!(true));
    settings
}

/// Caller options split into routing overrides and voice settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub language_code: Option<String>,
    /// Defaults merged with caller values; caller values win
    pub voice_settings: Map<String, Value>,
}

impl ResolvedOptions {
    pub fn from_options(options: &VoiceOptions) -> Self {
        let routing = |key: &str| {
            options
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut voice_settings = default_voice_settings();
        for (key, value) in options {
            if !ROUTING_KEYS.contains(&key.as_str()) {
                voice_settings.insert(key.clone(), value.clone());
            }
        }

        Self {
            voice_id: routing("voice_id"),
            model_id: routing("model_id"),
            language_code: routing("language_code"),
            voice_settings,
        }
    }
}

/// Whether `value` is one of [`ALLOWED_STABILITY`].
pub fn is_valid_stability(value: &Value) -> bool {
    value
        .as_f64()
        .is_some_and(|v| ALLOWED_STABILITY.iter().any(|allowed| (v - allowed).abs() < f64::EPSILON))
}

/// Check the stability setting, returning a message describing the problem.
pub fn check_stability(settings: &Map<String, Value>) -> Result<(), String> {
    match settings.get("stability") {
        None => Ok(()),
        Some(value) if is_valid_stability(value) => Ok(()),
        Some(value) => Err(format!(
            "stability must be one of 0.0, 0.5 or 1.0, got {value}"
        )),
    }
}
