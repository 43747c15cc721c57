//! Configuration fixtures

use vapi_tts_gateway::ServerConfig;
use vapi_tts_gateway::core::SynthesisMode;

pub const TEST_SECRET: &str = "test-vapi-secret";

/// Complete configuration with both modes enabled and no real endpoints.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tls: None,
        vapi_secret: Some(TEST_SECRET.to_string()),
        openai_api_key: Some("sk-test".to_string()),
        openai_realtime_url: "ws://127.0.0.1:1/v1/realtime".to_string(),
        openai_realtime_model: "gpt-realtime".to_string(),
        openai_realtime_voice: "alloy".to_string(),
        openai_realtime_instructions: None,
        realtime_receive_timeout_ms: 500,
        realtime_max_receive_timeouts: 1,
        elevenlabs_api_key: Some("xi-test-key".to_string()),
        elevenlabs_base_url: "http://127.0.0.1:1".to_string(),
        elevenlabs_voice_id: Some("test-voice".to_string()),
        elevenlabs_model_id: "eleven_v3".to_string(),
        elevenlabs_language_code: "he".to_string(),
        elevenlabs_optimize_latency: 2,
        elevenlabs_timeout_seconds: 5,
        strict_voice_settings: false,
        synthesis_timeout_seconds: 10,
        enabled_modes: SynthesisMode::all().to_vec(),
        enable_test_endpoint: true,
        cors_allowed_origins: None,
    }
}
