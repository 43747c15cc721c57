//! Request and result types for synthesis.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::audio::SourceFormat;
use super::error::SynthesisError;

/// Provider-specific overrides supplied by the caller.
///
/// Keys are provider option names, values are JSON scalars.
pub type VoiceOptions = HashMap<String, serde_json::Value>;

// =============================================================================
// Modes
// =============================================================================

/// Backend delivery model selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    /// Duplex WebSocket session (OpenAI Realtime)
    Realtime,
    /// One-way HTTP stream (ElevenLabs)
    #[default]
    #[serde(rename = "v3", alias = "streamed")]
    Streamed,
}

impl SynthesisMode {
    /// Wire name of the mode as reported to callers.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Streamed => "v3",
        }
    }

    /// Provider label reported in the `X-Voice-Provider` header.
    #[inline]
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Realtime => "openai-realtime",
            Self::Streamed => "elevenlabs-v3",
        }
    }

    /// Parse a wire name. Case-insensitive, surrounding whitespace ignored.
    ///
    /// `"v3"` and `"streamed"` both select [`SynthesisMode::Streamed`].
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" => Some(Self::Realtime),
            "v3" | "streamed" => Some(Self::Streamed),
            _ => None,
        }
    }

    /// All modes the gateway knows about.
    pub fn all() -> &'static [SynthesisMode] {
        &[Self::Realtime, Self::Streamed]
    }
}

impl std::fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SynthesisMode {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            SynthesisError::Validation(format!(
                "Unknown mode '{}'. Use 'realtime' or 'v3'",
                s.trim()
            ))
        })
    }
}

// =============================================================================
// Request / Result
// =============================================================================

/// One synthesis call as received from the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Wire name of the requested mode; empty selects the default
    pub mode: String,
    /// Provider-specific overrides
    pub voice_options: VoiceOptions,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: mode.into(),
            voice_options: VoiceOptions::new(),
        }
    }

    pub fn with_voice_options(mut self, voice_options: VoiceOptions) -> Self {
        self.voice_options = voice_options;
        self
    }
}

/// Successful synthesis output.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Canonical PCM: 16-bit signed, mono, 16 kHz, little-endian, headerless
    pub audio: Bytes,
    /// Wall-clock seconds spent in the backend and normalizer
    pub elapsed_seconds: f64,
    /// Backend that produced the audio
    pub source_mode: SynthesisMode,
}

/// Raw audio returned by a backend before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendAudio {
    pub data: Bytes,
    pub format: SourceFormat,
    pub sample_rate: u32,
    /// Time spent inside the backend call
    pub elapsed: Duration,
}
