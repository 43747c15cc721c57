//! Configuration module for the TTS gateway
//!
//! Server configuration comes from `.env` files, environment variables and an
//! optional YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use vapi_tts_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//!
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::core::SynthesisMode;
use crate::core::realtime::{DEFAULT_INSTRUCTIONS, OpenAIRealtimeVoice, RealtimeVoiceConfig};
use crate::core::tts::StreamingTtsConfig;
use zeroize::Zeroizing;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use env::{
    DEFAULT_ELEVENLABS_TIMEOUT_SECONDS, DEFAULT_HOST, DEFAULT_MAX_RECEIVE_TIMEOUTS, DEFAULT_PORT,
    DEFAULT_REALTIME_VOICE, DEFAULT_RECEIVE_TIMEOUT_MS, DEFAULT_SYNTHESIS_TIMEOUT_SECONDS,
};

/// TLS configuration for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsConfig>,

    /// Shared secret expected in `X-VAPI-SECRET`; when unset `/synthesize` rejects every call
    pub vapi_secret: Option<String>,

    // Realtime backend
    pub openai_api_key: Option<String>,
    pub openai_realtime_url: String,
    pub openai_realtime_model: String,
    pub openai_realtime_voice: String,
    /// Overrides the built-in instruction template
    pub openai_realtime_instructions: Option<String>,
    pub realtime_receive_timeout_ms: u64,
    pub realtime_max_receive_timeouts: u32,

    // Streamed backend
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    pub elevenlabs_voice_id: Option<String>,
    pub elevenlabs_model_id: String,
    pub elevenlabs_language_code: String,
    pub elevenlabs_optimize_latency: u8,
    pub elevenlabs_timeout_seconds: u64,
    pub strict_voice_settings: bool,

    // Router
    /// Overall deadline per synthesis call in seconds, 0 disables it
    pub synthesis_timeout_seconds: u64,
    pub enabled_modes: Vec<SynthesisMode>,
    pub enable_test_endpoint: bool,

    // Security
    /// Comma-separated list of origins, or "*"; unset means no CORS layer
    pub cors_allowed_origins: Option<String>,
}

/// Zeroize secret fields when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut secret) = self.vapi_secret {
            secret.zeroize();
        }
        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (with defaults) form the base, YAML values
    /// override them. The merged result is validated.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is loaded into the environment by main before this runs
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn is_mode_enabled(&self, mode: SynthesisMode) -> bool {
        self.enabled_modes.contains(&mode)
    }

    /// Overall synthesis deadline, `None` when disabled
    pub fn synthesis_timeout(&self) -> Option<Duration> {
        (self.synthesis_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.synthesis_timeout_seconds))
    }

    /// Settings for the realtime voice backend
    pub fn realtime_config(&self) -> RealtimeVoiceConfig {
        RealtimeVoiceConfig {
            api_key: self.openai_api_key.clone().map(Zeroizing::new),
            url: self.openai_realtime_url.clone(),
            model: self.openai_realtime_model.clone(),
            voice: OpenAIRealtimeVoice::from_str_or_default(&self.openai_realtime_voice),
            instructions: self
                .openai_realtime_instructions
                .clone()
                .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            receive_timeout: Duration::from_millis(self.realtime_receive_timeout_ms),
            max_receive_timeouts: self.realtime_max_receive_timeouts,
            ..Default::default()
        }
    }

    /// Settings for the streamed TTS backend
    pub fn streaming_tts_config(&self) -> StreamingTtsConfig {
        StreamingTtsConfig {
            api_key: self.elevenlabs_api_key.clone().map(Zeroizing::new),
            base_url: self.elevenlabs_base_url.trim_end_matches('/').to_string(),
            voice_id: self.elevenlabs_voice_id.clone(),
            model_id: self.elevenlabs_model_id.clone(),
            language_code: self.elevenlabs_language_code.clone(),
            optimize_streaming_latency: self.elevenlabs_optimize_latency,
            request_timeout: Duration::from_secs(self.elevenlabs_timeout_seconds),
            strict_voice_settings: self.strict_voice_settings,
        }
    }
}
