//! OpenAI Realtime API WebSocket message types.
//!
//! Only the subset of the protocol used for one-shot speech synthesis is
//! modelled. Every other server event deserializes to [`ServerEvent::Other`].
//!
//! # Protocol Overview
//!
//! Client events (sent to server):
//! - session.update - Configure voice, audio formats and turn detection
//! - conversation.item.create - Add the user text to the conversation
//! - response.create - Ask for an audio-bearing response
//!
//! Server events (received from server):
//! - session.created / session.updated - Session lifecycle
//! - response.created / response.done - Response lifecycle
//! - response.audio.delta - Audio data chunk (base64 PCM16)
//! - response.audio.done - Audio generation complete
//! - error - Error occurred
//!
//! The GA event names `response.output_audio.delta` and
//! `response.output_audio.done` are accepted as aliases.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{
    REALTIME_AUDIO_FORMAT, VAD_PREFIX_PADDING_MS, VAD_SILENCE_DURATION_MS, VAD_THRESHOLD,
};

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration for OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Response modalities (text, audio)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Vec<String>>,

    /// System instructions for the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Voice for audio output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Input audio format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_format: Option<String>,

    /// Output audio format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_audio_format: Option<String>,

    /// Turn detection configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_detection: Option<TurnDetection>,

    /// Temperature for response generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl SessionConfig {
    /// Session parameters for synthesizing one utterance.
    pub fn for_speech(instructions: String, voice: &str, temperature: f32) -> Self {
        Self {
            modalities: Some(text_and_audio()),
            instructions: Some(instructions),
            voice: Some(voice.to_string()),
            input_audio_format: Some(REALTIME_AUDIO_FORMAT.to_string()),
            output_audio_format: Some(REALTIME_AUDIO_FORMAT.to_string()),
            turn_detection: Some(TurnDetection::ServerVad {
                threshold: Some(VAD_THRESHOLD),
                prefix_padding_ms: Some(VAD_PREFIX_PADDING_MS),
                silence_duration_ms: Some(VAD_SILENCE_DURATION_MS),
            }),
            temperature: Some(temperature),
        }
    }
}

fn text_and_audio() -> Vec<String> {
    vec!["text".to_string(), "audio".to_string()]
}

/// Turn detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD
    #[serde(rename = "server_vad")]
    ServerVad {
        /// Activation threshold
        #[serde(skip_serializing_if = "Option::is_none")]
        threshold: Option<f32>,
        /// Audio prefix padding in ms
        #[serde(skip_serializing_if = "Option::is_none")]
        prefix_padding_ms: Option<u32>,
        /// Silence duration in ms
        #[serde(skip_serializing_if = "Option::is_none")]
        silence_duration_ms: Option<u32>,
    },
    /// No turn detection
    #[serde(rename = "none")]
    None {},
}

// =============================================================================
// Conversation Items
// =============================================================================

/// Conversation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationItem {
    /// Item ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Item type
    #[serde(rename = "type")]
    pub item_type: String,
    /// Item role (user, assistant, system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentPart>>,
}

impl ConversationItem {
    /// A user message carrying a single `input_text` part.
    pub fn user_text(text: &str) -> Self {
        Self {
            id: None,
            item_type: "message".to_string(),
            role: Some("user".to_string()),
            content: Some(vec![ContentPart {
                content_type: "input_text".to_string(),
                text: Some(text.to_string()),
            }]),
        }
    }
}

/// Content part within a conversation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// Content type (input_text, text, audio)
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// =============================================================================
// Response Configuration
// =============================================================================

/// Response configuration for creating responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Response modalities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Vec<String>>,
}

impl ResponseConfig {
    pub fn text_and_audio() -> Self {
        Self {
            modalities: Some(text_and_audio()),
        }
    }
}

// =============================================================================
// Client Events (sent to server)
// =============================================================================

/// Client events sent to the OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// Session configuration
        session: SessionConfig,
    },

    /// Create a conversation item
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate {
        /// Item to create
        item: ConversationItem,
    },

    /// Create a response
    #[serde(rename = "response.create")]
    ResponseCreate {
        /// Response configuration
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<ResponseConfig>,
    },
}

impl ClientEvent {
    /// Event name as it appears in the `type` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::ConversationItemCreate { .. } => "conversation.item.create",
            Self::ResponseCreate { .. } => "response.create",
        }
    }
}

// =============================================================================
// Server Events (received from server)
// =============================================================================

/// Server events received from the OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Error occurred
    #[serde(rename = "error")]
    Error {
        /// Error details
        error: ApiError,
    },

    /// Session created
    #[serde(rename = "session.created")]
    SessionCreated {
        #[serde(default)]
        session: Option<Session>,
    },

    /// Session updated
    #[serde(rename = "session.updated")]
    SessionUpdated {
        #[serde(default)]
        session: Option<Session>,
    },

    /// Response created
    #[serde(rename = "response.created")]
    ResponseCreated {
        #[serde(default)]
        response: Option<Response>,
    },

    /// Response done
    #[serde(rename = "response.done")]
    ResponseDone {
        #[serde(default)]
        response: Option<Response>,
    },

    /// Audio delta (audio data chunk)
    #[serde(
        rename = "response.audio.delta",
        alias = "response.output_audio.delta"
    )]
    AudioDelta {
        /// Response ID
        #[serde(default)]
        response_id: Option<String>,
        /// Item ID
        #[serde(default)]
        item_id: Option<String>,
        /// Base64-encoded audio delta
        delta: String,
    },

    /// Audio done
    #[serde(rename = "response.audio.done", alias = "response.output_audio.done")]
    AudioDone {
        /// Response ID
        #[serde(default)]
        response_id: Option<String>,
        /// Item ID
        #[serde(default)]
        item_id: Option<String>,
    },

    /// Any event this client does not act on
    #[serde(other)]
    Other,
}

impl ServerEvent {
    /// Decode base64 audio from an AudioDelta event.
    pub fn decode_audio_delta(delta: &str) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(delta)
    }
}

// =============================================================================
// Supporting Types
// =============================================================================

/// API error information.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiError {
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error message
    #[serde(default)]
    pub message: String,
    /// Parameter that caused the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Event ID that caused the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.error_type) {
            (Some(code), _) => write!(f, "{} ({})", self.message, code),
            (None, Some(kind)) => write!(f, "{} ({})", self.message, kind),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Session information.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Session ID
    pub id: Option<String>,
    /// Model used
    pub model: Option<String>,
    /// Voice
    pub voice: Option<String>,
    /// Output audio format
    pub output_audio_format: Option<String>,
}

/// Response information.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Response {
    /// Response ID
    pub id: Option<String>,
    /// Response status
    pub status: Option<String>,
    /// Status details
    pub status_details: Option<serde_json::Value>,
}

// =============================================================================
// Tests
// =============================================================================
