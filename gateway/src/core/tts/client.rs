//! ElevenLabs streaming TTS client.
//!
//! # API Reference
//!
//! - Endpoint: `POST {base}/v1/text-to-speech/{voice_id}/stream`
//! - Query: `output_format=pcm_16000&optimize_streaming_latency=2`
//! - Auth: `xi-api-key` header
//! - Output: raw PCM 16-bit, 16kHz, mono (identity for the normalizer)

use std::time::Instant;

use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::config::{
    ELEVENLABS_OUTPUT_SAMPLE_RATE, FALLBACK_STABILITY, ResolvedOptions, StreamingTtsConfig,
    check_stability, is_valid_voice_id,
};
use crate::core::audio::SourceFormat;
use crate::core::backend::SynthesisBackend;
use crate::core::error::{BackendError, BackendResult, SynthesisError};
use crate::core::types::{BackendAudio, SynthesisMode, VoiceOptions};

// =============================================================================
// Format Detection
// =============================================================================

/// Decide the payload format from its leading bytes and the response `Content-Type`.
///
/// Container signatures win over the header. Anything unrecognized is taken
/// to be the requested raw PCM.
pub fn reconcile_format(content_type: Option<&str>, data: &[u8]) -> SourceFormat {
    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WAVE" {
        return SourceFormat::Wav;
    }
    if data.starts_with(b"ID3") {
        return SourceFormat::Mp3;
    }
    if data.starts_with(b"fLaC") {
        return SourceFormat::Flac;
    }
    if data.starts_with(b"OggS") {
        return SourceFormat::Ogg;
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave") => SourceFormat::Wav,
        Some("audio/mpeg" | "audio/mp3") => SourceFormat::Mp3,
        Some("audio/flac" | "audio/x-flac") => SourceFormat::Flac,
        Some("audio/ogg" | "application/ogg") => SourceFormat::Ogg,
        _ => SourceFormat::MONO_PCM16,
    }
}

fn map_request_error(err: reqwest::Error, config: &StreamingTtsConfig) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(config.request_timeout)
    } else if err.is_connect() {
        BackendError::ConnectionFailed(err.to_string())
    } else {
        BackendError::Transport(err.to_string())
    }
}

// =============================================================================
// Streaming TTS Client
// =============================================================================

/// Synthesis backend backed by the ElevenLabs streaming endpoint.
#[derive(Debug, Clone)]
pub struct StreamingTTSClient {
    config: StreamingTtsConfig,
    http: Client,
}

impl StreamingTTSClient {
    /// Build the client. Idle connections are not pooled between requests.
    pub fn new(config: StreamingTtsConfig) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                BackendError::NotConfigured(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &StreamingTtsConfig {
        &self.config
    }

    /// Resolve options into the request body, coercing an invalid stability.
    fn build_body(&self, text: &str, resolved: ResolvedOptions) -> Value {
        let mut voice_settings = resolved.voice_settings;
        if let Err(reason) = check_stability(&voice_settings) {
            warn!(%reason, fallback = FALLBACK_STABILITY, "Coercing invalid stability");
            voice_settings.insert("stability".to_string(), json!(FALLBACK_STABILITY));
        }

        json!({
            "text": text,
            "model_id": resolved.model_id.as_deref().unwrap_or(&self.config.model_id),
            "language_code": resolved
                .language_code
                .as_deref()
                .unwrap_or(&self.config.language_code),
            "voice_settings": voice_settings,
        })
    }

    /// Synthesize `text` and collect the streamed body.
    pub async fn synthesize(&self, text: &str, options: &VoiceOptions) -> BackendResult<BackendAudio> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .map(|k| k.as_str())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                BackendError::NotConfigured("ElevenLabs API key is not set".to_string())
            })?;

        let resolved = ResolvedOptions::from_options(options);
        let voice_id = resolved
            .voice_id
            .clone()
            .or_else(|| self.config.voice_id.clone())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                BackendError::NotConfigured("ElevenLabs voice id is not set".to_string())
            })?;

        let url = self.config.stream_url(&voice_id)?;
        let body = self.build_body(text, resolved);

        debug!(%voice_id, model = %body["model_id"], "Requesting ElevenLabs stream");

        let start = Instant::now();
        let response = self
            .http
            .post(url)
            .header("xi-api-key", api_key)
            .header(ACCEPT, "application/octet-stream")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_request_error(e, &self.config))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            error!(status = status.as_u16(), %body, "ElevenLabs API error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut stream = response.bytes_stream();
        let mut audio = BytesMut::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_request_error(e, &self.config))?;
            if chunk.is_empty() {
                continue;
            }
            audio.extend_from_slice(&chunk);
            chunks += 1;
        }

        if audio.is_empty() {
            return Err(BackendError::EmptyAudio);
        }

        let data = audio.freeze();
        let format = reconcile_format(content_type.as_deref(), &data);
        let elapsed = start.elapsed();

        info!(
            %voice_id,
            chunks,
            bytes = data.len(),
            format = %format,
            elapsed_ms = elapsed.as_millis() as u64,
            "ElevenLabs synthesis finished"
        );

        Ok(BackendAudio {
            data,
            format,
            sample_rate: ELEVENLABS_OUTPUT_SAMPLE_RATE,
            elapsed,
        })
    }
}

#[async_trait]
impl SynthesisBackend for StreamingTTSClient {
    fn mode(&self) -> SynthesisMode {
        SynthesisMode::Streamed
    }

    fn validate_options(&self, options: &VoiceOptions) -> Result<(), SynthesisError> {
        let resolved = ResolvedOptions::from_options(options);
        if let Some(voice_id) = resolved.voice_id.as_deref()
            && !is_valid_voice_id(voice_id)
        {
            return Err(SynthesisError::Validation(format!(
                "voice_id '{voice_id}' may only contain letters, digits, '_' and '-'"
            )));
        }

        if !self.config.strict_voice_settings {
            return Ok(());
        }
        check_stability(&resolved.voice_settings).map_err(SynthesisError::Validation)
    }

    async fn synthesize(&self, text: &str, options: &VoiceOptions) -> BackendResult<BackendAudio> {
        StreamingTTSClient::synthesize(self, text, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(strict: bool) -> StreamingTTSClient {
        StreamingTTSClient::new(StreamingTtsConfig {
            api_key: Some("xi-test".to_string().into()),
            voice_id: Some("voice".to_string()),
            strict_voice_settings: strict,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_reconcile_format_signatures() {
        let mut wav = b"RIFF".to_vec();
        wav.extend_from_slice(&[0, 0, 0, 0]);
        wav.extend_from_slice(b"WAVEfmt ");
        assert_eq!(reconcile_format(None, &wav), SourceFormat::Wav);
        assert_eq!(reconcile_format(None, b"ID3\x04\x00"), SourceFormat::Mp3);
        assert_eq!(reconcile_format(None, b"fLaC\x00"), SourceFormat::Flac);
        assert_eq!(reconcile_format(None, b"OggS\x00"), SourceFormat::Ogg);
    }

    #[test]
    fn test_reconcile_format_content_type() {
        assert_eq!(
            reconcile_format(Some("audio/mpeg"), &[0xFF, 0xFB, 0x90]),
            SourceFormat::Mp3
        );
        assert_eq!(
            reconcile_format(Some("audio/wav; charset=binary"), &[0, 0]),
            SourceFormat::Wav
        );
    }

    #[test]
    fn test_reconcile_format_defaults_to_pcm() {
        // A PCM stream starting with -1 looks like an MPEG frame sync
        assert_eq!(
            reconcile_format(Some("application/octet-stream"), &[0xFF, 0xFF, 0x00, 0x00]),
            SourceFormat::MONO_PCM16
        );
        assert_eq!(reconcile_format(None, &[1, 2]), SourceFormat::MONO_PCM16);
    }

    #[test]
    fn test_build_body_coerces_stability() {
        let mut options = VoiceOptions::new();
        options.insert("stability".to_string(), json!(0.7));
        let body = client(false).build_body("hi", ResolvedOptions::from_options(&options));
        assert_eq!(body["voice_settings"]["stability"], json!(0.5));
        assert_eq!(body["model_id"], "eleven_v3");
        assert_eq!(body["language_code"], "he");
        assert_eq!(body["text"], "hi");
    }

    #[test]
    fn test_validate_options_strict_mode() {
        let mut options = VoiceOptions::new();
        options.insert("stability".to_string(), json!(0.7));

        assert!(client(false).validate_options(&options).is_ok());
        assert!(matches!(
            client(true).validate_options(&options),
            Err(SynthesisError::Validation(_))
        ));

        options.insert("stability".to_string(), json!(1.0));
        assert!(client(true).validate_options(&options).is_ok());
    }

    #[test]
    fn test_validate_options_rejects_path_like_voice_id() {
        let mut options = VoiceOptions::new();
        options.insert("voice_id".to_string(), json!("x/../../v1/user?"));

        for strict in [false, true] {
            assert!(matches!(
                client(strict).validate_options(&options),
                Err(SynthesisError::Validation(msg)) if msg.contains("voice_id")
            ));
        }

        options.insert("voice_id".to_string(), json!("21m00Tcm4TlvDq8ikWAM"));
        assert!(client(false).validate_options(&options).is_ok());
    }

    #[tokio::test]
    async fn test_missing_credentials_are_not_configured() {
        let client = StreamingTTSClient::new(StreamingTtsConfig::default()).unwrap();
        let err = client.synthesize("hi", &VoiceOptions::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));

        let client = StreamingTTSClient::new(StreamingTtsConfig {
            api_key: Some("xi-test".to_string().into()),
            ..Default::default()
        })
        .unwrap();
        let err = client.synthesize("hi", &VoiceOptions::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(msg) if msg.contains("voice")));
    }
}
