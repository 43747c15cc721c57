use std::path::PathBuf;

use super::utils::parse_modes;
use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig, env};

/// Overlay YAML values on top of the environment-derived configuration.
///
/// Only keys present in the YAML file replace environment values.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = env::load_from_env()?;
    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            if tls.enabled == Some(false) {
                config.tls = None;
            } else {
                match (tls.cert_path, tls.key_path) {
                    (Some(cert), Some(key)) => {
                        config.tls = Some(TlsConfig {
                            cert_path: PathBuf::from(cert),
                            key_path: PathBuf::from(key),
                        });
                    }
                    (None, None) if tls.enabled.is_none() => {}
                    _ => {
                        return Err("server.tls requires both cert_path and key_path".into());
                    }
                }
            }
        }
    }

    if let Some(auth) = yaml.auth
        && let Some(secret) = auth.vapi_secret
    {
        config.vapi_secret = Some(secret);
    }

    if let Some(openai) = yaml.openai {
        if let Some(key) = openai.api_key {
            config.openai_api_key = Some(key);
        }
        if let Some(url) = openai.realtime_url {
            config.openai_realtime_url = url;
        }
        if let Some(model) = openai.model {
            config.openai_realtime_model = model;
        }
        if let Some(voice) = openai.voice {
            config.openai_realtime_voice = voice;
        }
        if let Some(instructions) = openai.instructions {
            config.openai_realtime_instructions = Some(instructions);
        }
        if let Some(ms) = openai.receive_timeout_ms {
            config.realtime_receive_timeout_ms = ms;
        }
        if let Some(max) = openai.max_receive_timeouts {
            config.realtime_max_receive_timeouts = max;
        }
    }

    if let Some(elevenlabs) = yaml.elevenlabs {
        if let Some(key) = elevenlabs.api_key {
            config.elevenlabs_api_key = Some(key);
        }
        if let Some(base_url) = elevenlabs.base_url {
            config.elevenlabs_base_url = base_url;
        }
        if let Some(voice_id) = elevenlabs.voice_id {
            config.elevenlabs_voice_id = Some(voice_id);
        }
        if let Some(model_id) = elevenlabs.model_id {
            config.elevenlabs_model_id = model_id;
        }
        if let Some(language_code) = elevenlabs.language_code {
            config.elevenlabs_language_code = language_code;
        }
        if let Some(level) = elevenlabs.optimize_streaming_latency {
            config.elevenlabs_optimize_latency = level;
        }
        if let Some(seconds) = elevenlabs.timeout_seconds {
            config.elevenlabs_timeout_seconds = seconds;
        }
        if let Some(strict) = elevenlabs.strict_voice_settings {
            config.strict_voice_settings = strict;
        }
    }

    if let Some(synthesis) = yaml.synthesis {
        if let Some(seconds) = synthesis.timeout_seconds {
            config.synthesis_timeout_seconds = seconds;
        }
        if let Some(modes) = synthesis.enabled_modes {
            config.enabled_modes = parse_modes(&modes)?;
        }
        if let Some(enabled) = synthesis.enable_test_endpoint {
            config.enable_test_endpoint = enabled;
        }
    }

    if let Some(security) = yaml.security
        && let Some(origins) = security.cors_allowed_origins
    {
        config.cors_allowed_origins = Some(origins);
    }

    Ok(config)
}
