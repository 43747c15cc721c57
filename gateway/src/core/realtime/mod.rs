//! Realtime voice backend.
//!
//! Speech is produced by opening a duplex WebSocket session with the
//! OpenAI Realtime API, submitting the text as a user turn and collecting
//! the audio fragments of the response.
//!
//! # Audio Format
//!
//! PCM 16-bit signed little-endian, mono, at 24kHz. The router normalizes it
//! to 16kHz before returning it to callers.
//!
//! # Example
//!
//! ```rust,ignore
//! use vapi_tts_gateway::core::realtime::{RealtimeVoiceClient, RealtimeVoiceConfig};
//!
//! let client = RealtimeVoiceClient::new(RealtimeVoiceConfig {
//!     api_key: Some("sk-...".to_string().into()),
//!     ..Default::default()
//! });
//! let audio = client.synthesize("שלום", &Default::default()).await?;
//! ```

mod client;
mod config;
pub mod messages;

pub use client::{RealtimeVoiceClient, SessionState};
pub use config::{
    DEFAULT_INSTRUCTIONS, DEFAULT_REALTIME_MODEL, DEFAULT_RECEIVE_TIMEOUT,
    OPENAI_REALTIME_SAMPLE_RATE, OPENAI_REALTIME_URL, OpenAIRealtimeVoice, RealtimeVoiceConfig,
};
