use url::Url;

use super::ServerConfig;
use crate::core::realtime::OpenAIRealtimeVoice;
use crate::core::tts::is_valid_voice_id;

/// Run every check against a fully merged configuration.
pub fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_tls(config)?;
    validate_realtime(config)?;
    validate_streamed(config)?;
    validate_modes(config)?;
    Ok(())
}

/// TLS files must exist when TLS is configured.
pub fn validate_tls(config: &ServerConfig) -> Result<(), String> {
    if let Some(tls) = &config.tls {
        if !tls.cert_path.exists() {
            return Err(format!(
                "TLS certificate file not found: {}",
                tls.cert_path.display()
            ));
        }
        if !tls.key_path.exists() {
            return Err(format!(
                "TLS private key file not found: {}",
                tls.key_path.display()
            ));
        }
    }
    Ok(())
}

pub fn validate_realtime(config: &ServerConfig) -> Result<(), String> {
    let url = Url::parse(&config.openai_realtime_url)
        .map_err(|e| format!("Invalid OPENAI_REALTIME_URL '{}': {e}", config.openai_realtime_url))?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(format!(
            "OPENAI_REALTIME_URL must use ws:// or wss://, got '{}'",
            url.scheme()
        ));
    }

    if OpenAIRealtimeVoice::parse(&config.openai_realtime_voice).is_none() {
        return Err(format!(
            "Unknown OPENAI_REALTIME_VOICE '{}'",
            config.openai_realtime_voice
        ));
    }

    if config.realtime_receive_timeout_ms == 0 {
        return Err("REALTIME_RECEIVE_TIMEOUT_MS must be greater than 0".to_string());
    }
    if config.realtime_max_receive_timeouts == 0 {
        return Err("REALTIME_MAX_RECEIVE_TIMEOUTS must be at least 1".to_string());
    }
    Ok(())
}

pub fn validate_streamed(config: &ServerConfig) -> Result<(), String> {
    let url = Url::parse(&config.elevenlabs_base_url).map_err(|e| {
        format!(
            "Invalid ELEVENLABS_BASE_URL '{}': {e}",
            config.elevenlabs_base_url
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "ELEVENLABS_BASE_URL must use http:// or https://, got '{}'",
            url.scheme()
        ));
    }

    if let Some(voice_id) = config.elevenlabs_voice_id.as_deref()
        && !is_valid_voice_id(voice_id)
    {
        return Err(format!(
            "ELEVENLABS_VOICE_ID may only contain letters, digits, '_' and '-', got '{voice_id}'"
        ));
    }

    if config.elevenlabs_optimize_latency > 4 {
        return Err(format!(
            "ELEVENLABS_OPTIMIZE_LATENCY must be between 0 and 4, got {}",
            config.elevenlabs_optimize_latency
        ));
    }
    if config.elevenlabs_timeout_seconds == 0 {
        return Err("ELEVENLABS_TIMEOUT_SECONDS must be greater than 0".to_string());
    }
    Ok(())
}

pub fn validate_modes(config: &ServerConfig) -> Result<(), String> {
    if config.enabled_modes.is_empty() {
        return Err("At least one synthesis mode must be enabled".to_string());
    }
    Ok(())
}
