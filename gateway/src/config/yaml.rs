use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8000
///   tls:
///     enabled: true
///     cert_path: "/etc/tls/cert.pem"
///     key_path: "/etc/tls/key.pem"
///
/// auth:
///   vapi_secret: "shared-secret"
///
/// openai:
///   api_key: "sk-..."
///   realtime_url: "wss://api.openai.com/v1/realtime"
///   model: "gpt-realtime"
///   voice: "alloy"
///   instructions: "Read the following text aloud: {text}"
///   receive_timeout_ms: 10000
///   max_receive_timeouts: 1
///
/// elevenlabs:
///   api_key: "xi-..."
///   base_url: "https://api.elevenlabs.io"
///   voice_id: "21m00Tcm4TlvDq8ikWAM"
///   model_id: "eleven_v3"
///   language_code: "he"
///   optimize_streaming_latency: 2
///   timeout_seconds: 30
///   strict_voice_settings: false
///
/// synthesis:
///   timeout_seconds: 60
///   enabled_modes: ["realtime", "v3"]
///   enable_test_endpoint: true
///
/// security:
///   cors_allowed_origins: "https://dashboard.vapi.ai"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub auth: Option<AuthYaml>,
    pub openai: Option<OpenAIYaml>,
    pub elevenlabs: Option<ElevenLabsYaml>,
    pub synthesis: Option<SynthesisYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Shared-secret authentication from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthYaml {
    pub vapi_secret: Option<String>,
}

/// OpenAI Realtime backend settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAIYaml {
    pub api_key: Option<String>,
    pub realtime_url: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    /// Instruction template, `{text}` is replaced with the request text
    pub instructions: Option<String>,
    pub receive_timeout_ms: Option<u64>,
    pub max_receive_timeouts: Option<u32>,
}

/// ElevenLabs streaming backend settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ElevenLabsYaml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub language_code: Option<String>,
    pub optimize_streaming_latency: Option<u8>,
    pub timeout_seconds: Option<u64>,
    pub strict_voice_settings: Option<bool>,
}

/// Router settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisYaml {
    /// Overall deadline per synthesis call, 0 disables it
    pub timeout_seconds: Option<u64>,
    pub enabled_modes: Option<Vec<String>>,
    pub enable_test_endpoint: Option<bool>,
}

/// Security settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
