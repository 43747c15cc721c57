//! OpenAI Realtime session configuration.
//!
//! Covers the endpoint, voice selection and the fixed session parameters
//! sent in `session.update` for text-to-speech use.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// OpenAI Realtime API WebSocket endpoint.
pub const OPENAI_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

/// Default realtime model.
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-realtime";

/// Sample rate of `pcm16` audio produced by the Realtime API.
pub const OPENAI_REALTIME_SAMPLE_RATE: u32 = 24000;

/// Audio encoding requested for both directions.
pub const REALTIME_AUDIO_FORMAT: &str = "pcm16";

/// Default session instructions. `{text}` is replaced with the request text.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a Hebrew-speaking sales assistant. \
     Please convert the following Hebrew text to natural Hebrew speech: {text}";

/// Default wait for a single server event.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

// Server VAD parameters
pub const VAD_THRESHOLD: f32 = 0.5;
pub const VAD_PREFIX_PADDING_MS: u32 = 300;
pub const VAD_SILENCE_DURATION_MS: u32 = 200;

/// Sampling temperature for response generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

// =============================================================================
// Voices
// =============================================================================

/// Voices accepted by the Realtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenAIRealtimeVoice {
    /// Alloy voice (default)
    #[default]
    Alloy,
    Ash,
    Ballad,
    Cedar,
    Coral,
    Echo,
    Marin,
    Sage,
    Shimmer,
    Verse,
}

impl OpenAIRealtimeVoice {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Cedar => "cedar",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Marin => "marin",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }

    /// Parse a voice name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alloy" => Some(Self::Alloy),
            "ash" => Some(Self::Ash),
            "ballad" => Some(Self::Ballad),
            "cedar" => Some(Self::Cedar),
            "coral" => Some(Self::Coral),
            "echo" => Some(Self::Echo),
            "marin" => Some(Self::Marin),
            "sage" => Some(Self::Sage),
            "shimmer" => Some(Self::Shimmer),
            "verse" => Some(Self::Verse),
            _ => None,
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Get all available voices.
    pub fn all() -> &'static [OpenAIRealtimeVoice] {
        &[
            Self::Alloy,
            Self::Ash,
            Self::Ballad,
            Self::Cedar,
            Self::Coral,
            Self::Echo,
            Self::Marin,
            Self::Sage,
            Self::Shimmer,
            Self::Verse,
        ]
    }
}

impl std::fmt::Display for OpenAIRealtimeVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client configuration
// =============================================================================

/// Settings for [`super::RealtimeVoiceClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeVoiceConfig {
    /// Bearer token, wiped on drop; `None` leaves the backend unconfigured
    pub api_key: Option<Zeroizing<String>>,
    /// WebSocket endpoint without query string
    pub url: String,
    pub model: String,
    /// Voice used when the request does not pick one
    pub voice: OpenAIRealtimeVoice,
    /// Instruction template containing a `{text}` placeholder
    pub instructions: String,
    /// Wait applied to every individual receive
    pub receive_timeout: Duration,
    /// Consecutive receive timeouts tolerated while collecting audio
    pub max_receive_timeouts: u32,
    pub temperature: f32,
}

impl Default for RealtimeVoiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: OPENAI_REALTIME_URL.to_string(),
            model: DEFAULT_REALTIME_MODEL.to_string(),
            voice: OpenAIRealtimeVoice::default(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            max_receive_timeouts: 1,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl RealtimeVoiceConfig {
    /// Full connection URL including the model query parameter.
    pub fn ws_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}model={}", self.url, separator, self.model)
    }

    /// Substitute the request text into the instruction template.
    ///
    /// A template without a placeholder gets the text appended after a blank line.
    pub fn render_instructions(&self, text: &str) -> String {
        if self.instructions.contains("{text}") {
            self.instructions.replace("{text}", text)
        } else {
            format!("{}\n\n{}", self.instructions, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_parse() {
        assert_eq!(OpenAIRealtimeVoice::parse("Shimmer"), Some(OpenAIRealtimeVoice::Shimmer));
        assert_eq!(OpenAIRealtimeVoice::parse("nope"), None);
        assert_eq!(
            OpenAIRealtimeVoice::from_str_or_default("nope"),
            OpenAIRealtimeVoice::Alloy
        );
        for voice in OpenAIRealtimeVoice::all() {
            assert_eq!(OpenAIRealtimeVoice::parse(voice.as_str()), Some(*voice));
        }
    }

    #[test]
    fn test_ws_url() {
        let config = RealtimeVoiceConfig::default();
        assert_eq!(
            config.ws_url(),
            "wss://api.openai.com/v1/realtime?model=gpt-realtime"
        );

        let config = RealtimeVoiceConfig {
            url: "ws://127.0.0.1:9000/v1/realtime?foo=bar".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.ws_url(),
            "ws://127.0.0.1:9000/v1/realtime?foo=bar&model=gpt-realtime"
        );
    }

    #[test]
    fn test_render_instructions() {
        let config = RealtimeVoiceConfig::default();
        let rendered = config.render_instructions("שלום");
        assert!(rendered.ends_with("speech: שלום"));
        assert!(!rendered.contains("{text}"));

        let config = RealtimeVoiceConfig {
            instructions: "Read aloud.".to_string(),
            ..Default::default()
        };
        assert_eq!(config.render_instructions("hi"), "Read aloud.\n\nhi");
    }
}
