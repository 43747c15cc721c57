//! Synthesis routing.
//!
//! [`SynthesisRouter`] validates a request, picks the backend for its mode,
//! times the call and normalizes whatever audio comes back into canonical
//! PCM. There is no retry and no fallback from one backend to the other.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use super::audio::normalize;
use super::backend::SharedBackend;
use super::error::{BackendError, SynthesisError};
use super::realtime::RealtimeVoiceClient;
use super::tts::StreamingTTSClient;
use super::types::{SynthesisMode, SynthesisRequest, SynthesisResult};
use crate::config::ServerConfig;

/// Routes synthesis requests to the backend selected by mode.
#[derive(Clone)]
pub struct SynthesisRouter {
    realtime: SharedBackend,
    streamed: SharedBackend,
    enabled_modes: Vec<SynthesisMode>,
    deadline: Option<Duration>,
}

impl std::fmt::Debug for SynthesisRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisRouter")
            .field("enabled_modes", &self.enabled_modes)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl SynthesisRouter {
    /// Router with both modes enabled and no overall deadline.
    ///
    /// Each backend must serve the mode of the slot it is placed in.
    pub fn new(realtime: SharedBackend, streamed: SharedBackend) -> Self {
        debug_assert_eq!(
            realtime.mode(),
            SynthesisMode::Realtime,
            "realtime slot holds a backend for another mode"
        );
        debug_assert_eq!(
            streamed.mode(),
            SynthesisMode::Streamed,
            "streamed slot holds a backend for another mode"
        );
        Self {
            realtime,
            streamed,
            enabled_modes: SynthesisMode::all().to_vec(),
            deadline: None,
        }
    }

    /// Build the production backends from server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, BackendError> {
        let realtime = RealtimeVoiceClient::new(config.realtime_config());
        let streamed = StreamingTTSClient::new(config.streaming_tts_config())?;

        Ok(Self::new(Arc::new(realtime), Arc::new(streamed))
            .with_enabled_modes(config.enabled_modes.clone())
            .with_deadline(config.synthesis_timeout()))
    }

    pub fn with_enabled_modes(mut self, modes: Vec<SynthesisMode>) -> Self {
        self.enabled_modes = modes;
        self
    }

    /// Overall bound on one backend call. `None` waits indefinitely.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn enabled_modes(&self) -> &[SynthesisMode] {
        &self.enabled_modes
    }

    fn backend(&self, mode: SynthesisMode) -> &SharedBackend {
        match mode {
            SynthesisMode::Realtime => &self.realtime,
            SynthesisMode::Streamed => &self.streamed,
        }
    }

    /// Validate the request and resolve its mode without touching a backend.
    pub fn resolve_mode(&self, request: &SynthesisRequest) -> Result<SynthesisMode, SynthesisError> {
        if request.text.trim().is_empty() {
            return Err(SynthesisError::Validation(
                "Text cannot be empty".to_string(),
            ));
        }

        let mode = if request.mode.trim().is_empty() {
            SynthesisMode::default()
        } else {
            request.mode.parse::<SynthesisMode>()?
        };

        if !self.enabled_modes.contains(&mode) {
            return Err(SynthesisError::Validation(format!(
                "Mode '{mode}' is disabled on this server"
            )));
        }

        Ok(mode)
    }

    /// Synthesize speech for `request`, returning canonical PCM.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, SynthesisError> {
        let mode = self.resolve_mode(request)?;
        let backend = self.backend(mode);
        backend.validate_options(&request.voice_options)?;

        let text = request.text.trim();
        let start = Instant::now();

        let outcome = self.run(backend, mode, text, request).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(audio) => {
                info!(
                    mode = %mode,
                    chars = text.chars().count(),
                    bytes = audio.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Synthesis completed"
                );
                Ok(SynthesisResult {
                    audio,
                    elapsed_seconds: elapsed.as_secs_f64(),
                    source_mode: mode,
                })
            }
            Err(e) => {
                error!(
                    mode = %mode,
                    kind = e.kind(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Synthesis failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        backend: &SharedBackend,
        mode: SynthesisMode,
        text: &str,
        request: &SynthesisRequest,
    ) -> Result<bytes::Bytes, SynthesisError> {
        let call = backend.synthesize(text, &request.voice_options);
        let raw = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| BackendError::Timeout(deadline))??,
            None => call.await?,
        };

        if raw.data.is_empty() {
            return Err(BackendError::EmptyAudio.into());
        }

        tracing::debug!(
            mode = %mode,
            provider = backend.mode().provider_name(),
            format = %raw.format,
            sample_rate = raw.sample_rate,
            bytes = raw.data.len(),
            backend_ms = raw.elapsed.as_millis() as u64,
            "Normalizing backend audio"
        );

        let audio = normalize(&raw.data, raw.format, raw.sample_rate)?;
        if audio.is_empty() {
            return Err(BackendError::EmptyAudio.into());
        }
        Ok(audio)
    }
}
