use std::path::PathBuf;

use super::utils::{env_var, parse_env, parse_env_bool, parse_mode_list};
use super::{ServerConfig, TlsConfig, validation};
use crate::core::SynthesisMode;
use crate::core::realtime::{DEFAULT_REALTIME_MODEL, OPENAI_REALTIME_URL};
use crate::core::tts::{
    DEFAULT_ELEVENLABS_MODEL, DEFAULT_LANGUAGE_CODE, DEFAULT_OPTIMIZE_LATENCY, ELEVENLABS_BASE_URL,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REALTIME_VOICE: &str = "alloy";
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RECEIVE_TIMEOUTS: u32 = 1;
pub const DEFAULT_ELEVENLABS_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SYNTHESIS_TIMEOUT_SECONDS: u64 = 60;

/// Build a configuration from environment variables and defaults, without validation.
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let port = match parse_env::<u16>("PORT")? {
        Some(port) => port,
        None => parse_env::<u16>("SERVER_PORT")?.unwrap_or(DEFAULT_PORT),
    };

    let tls = match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        (cert, key) => {
            return Err(format!(
                "TLS_CERT_PATH and TLS_KEY_PATH must be set together (cert: {}, key: {})",
                if cert.is_some() { "set" } else { "missing" },
                if key.is_some() { "set" } else { "missing" },
            )
            .into());
        }
    };

    let enabled_modes = match env_var("ENABLED_MODES") {
        Some(raw) => parse_mode_list(&raw)?,
        None => SynthesisMode::all().to_vec(),
    };

    Ok(ServerConfig {
        host: env_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port,
        tls,
        vapi_secret: env_var("VAPI_SECRET"),
        openai_api_key: env_var("OPENAI_API_KEY"),
        openai_realtime_url: env_var("OPENAI_REALTIME_URL")
            .unwrap_or_else(|| OPENAI_REALTIME_URL.to_string()),
        openai_realtime_model: env_var("OPENAI_REALTIME_MODEL")
            .unwrap_or_else(|| DEFAULT_REALTIME_MODEL.to_string()),
        openai_realtime_voice: env_var("OPENAI_REALTIME_VOICE")
            .unwrap_or_else(|| DEFAULT_REALTIME_VOICE.to_string()),
        openai_realtime_instructions: env_var("OPENAI_REALTIME_INSTRUCTIONS"),
        realtime_receive_timeout_ms: parse_env("REALTIME_RECEIVE_TIMEOUT_MS")?
            .unwrap_or(DEFAULT_RECEIVE_TIMEOUT_MS),
        realtime_max_receive_timeouts: parse_env("REALTIME_MAX_RECEIVE_TIMEOUTS")?
            .unwrap_or(DEFAULT_MAX_RECEIVE_TIMEOUTS),
        elevenlabs_api_key: env_var("ELEVENLABS_API_KEY"),
        elevenlabs_base_url: env_var("ELEVENLABS_BASE_URL")
            .unwrap_or_else(|| ELEVENLABS_BASE_URL.to_string()),
        elevenlabs_voice_id: env_var("ELEVENLABS_VOICE_ID"),
        elevenlabs_model_id: env_var("ELEVENLABS_MODEL_ID")
            .unwrap_or_else(|| DEFAULT_ELEVENLABS_MODEL.to_string()),
        elevenlabs_language_code: env_var("ELEVENLABS_LANGUAGE_CODE")
            .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
        elevenlabs_optimize_latency: parse_env("ELEVENLABS_OPTIMIZE_LATENCY")?
            .unwrap_or(DEFAULT_OPTIMIZE_LATENCY),
        elevenlabs_timeout_seconds: parse_env("ELEVENLABS_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_ELEVENLABS_TIMEOUT_SECONDS),
        strict_voice_settings: parse_env_bool("STRICT_VOICE_SETTINGS")?.unwrap_or(false),
        synthesis_timeout_seconds: parse_env("SYNTHESIS_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_SYNTHESIS_TIMEOUT_SECONDS),
        enabled_modes,
        enable_test_endpoint: parse_env_bool("ENABLE_TEST_ENDPOINT")?.unwrap_or(true),
        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
    })
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults. The `.env` file, if any, is
    /// loaded into the environment by `main` before this runs.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_from_env()?;
        validation::validate(&config)?;
        Ok(config)
    }
}
