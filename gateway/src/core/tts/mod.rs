//! Streamed TTS backend (ElevenLabs).
//!
//! One HTTP POST per request; the chunked response body is concatenated in
//! arrival order.

mod client;
mod config;

pub use client::{StreamingTTSClient, reconcile_format};
pub use config::{
    ALLOWED_STABILITY, DEFAULT_ELEVENLABS_MODEL, DEFAULT_LANGUAGE_CODE, DEFAULT_OPTIMIZE_LATENCY,
    DEFAULT_REQUEST_TIMEOUT, ELEVENLABS_BASE_URL, ELEVENLABS_OUTPUT_FORMAT,
    ELEVENLABS_OUTPUT_SAMPLE_RATE, ResolvedOptions, StreamingTtsConfig, default_voice_settings,
    is_valid_voice_id,
};
