//! Synthesis endpoints.
//!
//! `/synthesize` accepts either the flat request shape
//! `{message|text, mode, voice_settings|voiceOptions}` or the Vapi envelope
//! `{message: {type: "voice-request", text, sampleRate, call}}` and answers
//! with raw canonical PCM. `/test` runs the same pipeline but reports a JSON
//! summary instead of audio.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::audio::{CANONICAL_CHANNELS, CANONICAL_FORMAT_NAME, CANONICAL_SAMPLE_RATE};
use crate::core::{SynthesisMode, SynthesisRequest, VoiceOptions};
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Envelope type Vapi sends for speech requests
pub const VOICE_REQUEST_TYPE: &str = "voice-request";

/// Request body accepted by `/synthesize` and `/test`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SynthesizeBody {
    /// Plain text, or the Vapi message envelope
    pub message: Option<MessageField>,
    pub text: Option<String>,
    pub mode: Option<String>,
    #[serde(alias = "voiceOptions")]
    pub voice_settings: Option<VoiceOptions>,
    #[serde(alias = "sampleRate")]
    pub sample_rate: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageField {
    Text(String),
    Envelope(VapiMessage),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VapiMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(rename = "sampleRate")]
    pub sample_rate: Option<u32>,
    pub call: Option<serde_json::Value>,
}

impl SynthesizeBody {
    /// Parse a raw JSON body.
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
    }

    /// Convert into a router request, rejecting envelopes of the wrong type.
    pub fn into_request(self, request_id: &Uuid) -> AppResult<SynthesisRequest> {
        let mut sample_rate = self.sample_rate;
        let text = match self.message {
            Some(MessageField::Envelope(envelope)) => {
                if envelope.kind != VOICE_REQUEST_TYPE {
                    return Err(AppError::BadRequest(format!(
                        "Invalid message type '{}'. Expected '{VOICE_REQUEST_TYPE}'",
                        envelope.kind
                    )));
                }
                let call_id = envelope
                    .call
                    .as_ref()
                    .and_then(|call| call.get("id"))
                    .and_then(|id| id.as_str());
                info!(
                    request_id = %request_id,
                    call_id = call_id.unwrap_or("-"),
                    "Received Vapi voice-request"
                );
                sample_rate = envelope.sample_rate.or(sample_rate);
                envelope.text
            }
            Some(MessageField::Text(text)) => text,
            None => self.text.unwrap_or_default(),
        };

        if let Some(rate) = sample_rate
            && rate != CANONICAL_SAMPLE_RATE
        {
            warn!(
                request_id = %request_id,
                requested = rate,
                served = CANONICAL_SAMPLE_RATE,
                "Requested sample rate differs from canonical output"
            );
        }

        Ok(SynthesisRequest::new(text, self.mode.unwrap_or_default())
            .with_voice_options(self.voice_settings.unwrap_or_default()))
    }
}

/// POST /synthesize
pub async fn synthesize_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Response> {
    let request_id = Uuid::new_v4();
    let request = SynthesizeBody::parse(&body)?.into_request(&request_id)?;

    info!(
        request_id = %request_id,
        mode = %request.mode,
        chars = request.text.chars().count(),
        "Synthesis request"
    );

    let result = state.router.synthesize(&request).await?;

    info!(
        request_id = %request_id,
        mode = %result.source_mode,
        bytes = result.audio.len(),
        elapsed_ms = (result.elapsed_seconds * 1000.0) as u64,
        "Returning audio"
    );

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("audio/raw")),
        (
            header::HeaderName::from_static("x-audio-format"),
            HeaderValue::from_static(CANONICAL_FORMAT_NAME),
        ),
        (
            header::HeaderName::from_static("x-audio-rate"),
            HeaderValue::from(CANONICAL_SAMPLE_RATE),
        ),
        (
            header::HeaderName::from_static("x-audio-channels"),
            HeaderValue::from(CANONICAL_CHANNELS),
        ),
        (
            header::HeaderName::from_static("x-generation-time"),
            header_value(format!("{:.3}", result.elapsed_seconds)),
        ),
        (
            header::HeaderName::from_static("x-voice-provider"),
            HeaderValue::from_static(result.source_mode.provider_name()),
        ),
        (
            header::HeaderName::from_static("x-request-id"),
            header_value(request_id.to_string()),
        ),
    ];

    Ok((StatusCode::OK, headers, Body::from(result.audio)).into_response())
}

fn header_value(value: String) -> HeaderValue {
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TestResponse {
    Success {
        success: bool,
        mode: String,
        audio_size_bytes: usize,
        generation_time_seconds: f64,
        message: &'static str,
        sample_rate: &'static str,
        format: &'static str,
    },
    Failure {
        success: bool,
        error: String,
        mode: String,
        generation_time_seconds: f64,
    },
}

/// POST /test - run a synthesis and report a summary
pub async fn test_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<TestResponse> {
    let request_id = Uuid::new_v4();
    let requested_mode = |mode: &str| {
        if mode.trim().is_empty() {
            SynthesisMode::default().as_str().to_string()
        } else {
            mode.trim().to_string()
        }
    };

    let request = match SynthesizeBody::parse(&body).and_then(|b| b.into_request(&request_id)) {
        Ok(request) => request,
        Err(e) => {
            return Json(TestResponse::Failure {
                success: false,
                error: e.to_string(),
                mode: requested_mode(""),
                generation_time_seconds: 0.0,
            });
        }
    };

    match state.router.synthesize(&request).await {
        Ok(result) => Json(TestResponse::Success {
            success: true,
            mode: result.source_mode.as_str().to_string(),
            audio_size_bytes: result.audio.len(),
            generation_time_seconds: (result.elapsed_seconds * 1000.0).round() / 1000.0,
            message: "Audio generated successfully",
            sample_rate: "16kHz",
            format: "PCM 16-bit mono",
        }),
        Err(e) => {
            warn!(request_id = %request_id, kind = e.kind(), error = %e, "Test synthesis failed");
            Json(TestResponse::Failure {
                success: false,
                error: e.to_string(),
                mode: requested_mode(&request.mode),
                generation_time_seconds: 0.0,
            })
        }
    }
}
