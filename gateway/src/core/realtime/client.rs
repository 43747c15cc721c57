//! OpenAI Realtime synthesis client.
//!
//! Each call opens its own WebSocket session, drives it through a fixed
//! sequence of states and tears it down before returning.
//!
//! # API Reference
//!
//! - Endpoint: `wss://api.openai.com/v1/realtime?model=<model>`
//! - Protocol: WebSocket with JSON events
//! - Audio: PCM 16-bit, 24kHz, mono, little-endian, base64 encoded
//!
//! # Session states
//!
//! ```text
//! Connecting -> Configuring -> AwaitingAck -> Submitting -> Requesting -> Collecting -> Done
//!      \             \              \              \             \             \
//!       +-------------+--------------+--------------+-------------+-------------+--> Failed
//! ```
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
//! let audio = client.synthesize("שלום", &VoiceOptions::new()).await?;
//! assert_eq!(audio.sample_rate, 24000);
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::config::{OPENAI_REALTIME_SAMPLE_RATE, OpenAIRealtimeVoice, RealtimeVoiceConfig};
use super::messages::{ClientEvent, ConversationItem, ResponseConfig, ServerEvent, SessionConfig};
use crate::core::audio::SourceFormat;
use crate::core::backend::SynthesisBackend;
use crate::core::error::{BackendError, BackendResult};
use crate::core::types::{BackendAudio, SynthesisMode, VoiceOptions};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on the best-effort close handshake during teardown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// =============================================================================
// Session State
// =============================================================================

/// Position of a [`BackendSession`] in the synthesis protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Configuring,
    AwaitingAck,
    Submitting,
    Requesting,
    Collecting,
    Done,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Configuring => "configuring",
            Self::AwaitingAck => "awaiting_ack",
            Self::Submitting => "submitting",
            Self::Requesting => "requesting",
            Self::Collecting => "collecting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one bounded receive.
#[derive(Debug)]
enum Incoming {
    Event(ServerEvent),
    Closed,
    TimedOut,
}

// =============================================================================
// Backend Session
// =============================================================================

/// One WebSocket session, owned by the request that opened it.
///
/// Dropping the session drops the socket, which is how cancellation tears it down.
struct BackendSession {
    ws: WsStream,
    state: SessionState,
    audio: BytesMut,
    fragments: usize,
    consecutive_timeouts: u32,
    receive_timeout: Duration,
    max_receive_timeouts: u32,
    peer_closed: bool,
}

impl BackendSession {
    /// Perform the WebSocket handshake.
    async fn connect(config: &RealtimeVoiceConfig, api_key: &str) -> BackendResult<Self> {
        let url = config.ws_url();
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| BackendError::ConnectionFailed(format!("invalid realtime URL: {e}")))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| BackendError::ConnectionFailed(format!("invalid API key header: {e}")))?;
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        let (ws, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        debug!(model = %config.model, "Connected to OpenAI Realtime API");

        Ok(Self {
            ws,
            state: SessionState::Connecting,
            audio: BytesMut::new(),
            fragments: 0,
            consecutive_timeouts: 0,
            receive_timeout: config.receive_timeout,
            max_receive_timeouts: config.max_receive_timeouts.max(1),
            peer_closed: false,
        })
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "Realtime session transition");
        self.state = next;
    }

    /// Run the protocol from configuration through collection.
    async fn run(&mut self, session: SessionConfig, text: &str) -> BackendResult<Bytes> {
        self.transition(SessionState::Configuring);
        self.send(ClientEvent::SessionUpdate { session }).await?;

        self.transition(SessionState::AwaitingAck);
        self.await_ack().await?;

        self.transition(SessionState::Submitting);
        self.send(ClientEvent::ConversationItemCreate {
            item: ConversationItem::user_text(text),
        })
        .await?;

        self.transition(SessionState::Requesting);
        self.send(ClientEvent::ResponseCreate {
            response: Some(ResponseConfig::text_and_audio()),
        })
        .await?;

        self.transition(SessionState::Collecting);
        self.collect().await?;

        if self.audio.is_empty() {
            return Err(BackendError::EmptyAudio);
        }
        Ok(std::mem::take(&mut self.audio).freeze())
    }

    async fn send(&mut self, event: ClientEvent) -> BackendResult<()> {
        let json = serde_json::to_string(&event)
            .map_err(|e| BackendError::Transport(format!("failed to encode event: {e}")))?;
        debug!(event = event.event_type(), "Sending realtime event");
        let result = self.ws.send(Message::Text(json.into())).await;
        match result {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.peer_closed = true;
                Err(BackendError::ConnectionFailed(format!(
                    "connection closed while {}",
                    self.state
                )))
            }
            Err(e) => Err(BackendError::Transport(e.to_string())),
        }
    }

    /// Wait for the next server event, bounded by the per-receive timeout.
    async fn next_event(&mut self) -> BackendResult<Incoming> {
        loop {
            let frame = match tokio::time::timeout(self.receive_timeout, self.ws.next()).await {
                Ok(frame) => frame,
                Err(_) => return Ok(Incoming::TimedOut),
            };

            match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => return Ok(Incoming::Event(event)),
                    Err(e) => {
                        debug!(error = %e, "Skipping unparseable realtime event");
                    }
                },
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = self.ws.send(Message::Pong(data)).await {
                        warn!(error = %e, "Failed to answer ping");
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Realtime server closed the connection");
                    self.peer_closed = true;
                    return Ok(Incoming::Closed);
                }
                Some(Ok(_)) => {}
                Some(Err(
                    tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed
                    | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake),
                ))
                | None => {
                    self.peer_closed = true;
                    return Ok(Incoming::Closed);
                }
                Some(Err(e)) => return Err(BackendError::Transport(e.to_string())),
            }
        }
    }

    /// Wait for `session.updated`.
    async fn await_ack(&mut self) -> BackendResult<()> {
        loop {
            match self.next_event().await? {
                Incoming::Event(ServerEvent::SessionUpdated { .. }) => {
                    debug!("Realtime session acknowledged");
                    return Ok(());
                }
                Incoming::Event(ServerEvent::Error { error }) => {
                    return Err(BackendError::SessionRejected(error.to_string()));
                }
                Incoming::Event(other) => {
                    debug!(?other, "Ignoring event before session acknowledgement");
                }
                Incoming::Closed => {
                    return Err(BackendError::ConnectionFailed(
                        "connection closed before session acknowledgement".to_string(),
                    ));
                }
                Incoming::TimedOut => {
                    return Err(BackendError::Timeout(self.receive_timeout));
                }
            }
        }
    }

    /// Append audio fragments until completion, close, error or timeout.
    async fn collect(&mut self) -> BackendResult<()> {
        loop {
            match self.next_event().await? {
                Incoming::Event(ServerEvent::AudioDelta { delta, .. }) => {
                    let chunk = ServerEvent::decode_audio_delta(&delta).map_err(|e| {
                        BackendError::InvalidResponse(format!("audio delta is not base64: {e}"))
                    })?;
                    self.audio.extend_from_slice(&chunk);
                    self.fragments += 1;
                    self.consecutive_timeouts = 0;
                }
                Incoming::Event(ServerEvent::AudioDone { .. }) => {
                    debug!(fragments = self.fragments, "Realtime audio complete");
                    return Ok(());
                }
                Incoming::Event(ServerEvent::ResponseDone { response }) => {
                    debug!(
                        status = response.as_ref().and_then(|r| r.status.as_deref()),
                        fragments = self.fragments,
                        "Realtime response complete"
                    );
                    return Ok(());
                }
                Incoming::Event(ServerEvent::Error { error }) => {
                    return Err(BackendError::Provider(error.to_string()));
                }
                Incoming::Event(_) => {}
                Incoming::Closed => {
                    info!(
                        fragments = self.fragments,
                        bytes = self.audio.len(),
                        "Realtime connection closed during collection, keeping partial audio"
                    );
                    return Ok(());
                }
                Incoming::TimedOut => {
                    self.consecutive_timeouts += 1;
                    if self.consecutive_timeouts >= self.max_receive_timeouts {
                        warn!(
                            timeouts = self.consecutive_timeouts,
                            fragments = self.fragments,
                            "Realtime receive timed out, finishing with collected audio"
                        );
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Best-effort close handshake.
    async fn close(&mut self) {
        if self.peer_closed {
            return;
        }
        match tokio::time::timeout(CLOSE_TIMEOUT, self.ws.close(None)).await {
            Ok(Ok(())) => debug!("Realtime session closed"),
            Ok(Err(e)) => debug!(error = %e, "Realtime close handshake failed"),
            Err(_) => debug!("Realtime close handshake timed out"),
        }
    }
}

// =============================================================================
// Realtime Voice Client
// =============================================================================

/// Synthesis backend backed by the OpenAI Realtime API.
///
/// Holds only immutable configuration; every call opens a fresh session.
#[derive(Debug, Clone)]
pub struct RealtimeVoiceClient {
    config: RealtimeVoiceConfig,
}

impl RealtimeVoiceClient {
    pub fn new(config: RealtimeVoiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RealtimeVoiceConfig {
        &self.config
    }

    /// Voice for this request: `voice_options["voice"]` or the configured default.
    fn resolve_voice(&self, options: &VoiceOptions) -> OpenAIRealtimeVoice {
        match options.get("voice").and_then(|v| v.as_str()) {
            Some(name) => OpenAIRealtimeVoice::parse(name).unwrap_or_else(|| {
                warn!(voice = name, default = %self.config.voice, "Unknown realtime voice, using default");
                self.config.voice
            }),
            None => self.config.voice,
        }
    }

    /// Synthesize `text` into raw 24 kHz mono PCM16.
    pub async fn synthesize(&self, text: &str, options: &VoiceOptions) -> BackendResult<BackendAudio> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .map(|k| k.as_str())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BackendError::NotConfigured("OpenAI API key is not set".to_string()))?;

        let voice = self.resolve_voice(options);
        let session_config = SessionConfig::for_speech(
            self.config.render_instructions(text),
            voice.as_str(),
            self.config.temperature,
        );

        let start = Instant::now();
        let mut session = BackendSession::connect(&self.config, api_key).await?;

        let outcome = session.run(session_config, text).await;
        session.transition(if outcome.is_ok() {
            SessionState::Done
        } else {
            SessionState::Failed
        });
        session.close().await;

        let data = outcome?;
        let elapsed = start.elapsed();

        info!(
            voice = %voice,
            fragments = session.fragments,
            bytes = data.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Realtime synthesis finished"
        );

        Ok(BackendAudio {
            data,
            format: SourceFormat::MONO_PCM16,
            sample_rate: OPENAI_REALTIME_SAMPLE_RATE,
            elapsed,
        })
    }
}

#[async_trait]
impl SynthesisBackend for RealtimeVoiceClient {
    fn mode(&self) -> SynthesisMode {
        SynthesisMode::Realtime
    }

    async fn synthesize(&self, text: &str, options: &VoiceOptions) -> BackendResult<BackendAudio> {
        RealtimeVoiceClient::synthesize(self, text, options).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_terminal() {
        assert!(SessionState::Done.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Collecting.is_terminal());
        assert_eq!(SessionState::AwaitingAck.to_string(), "awaiting_ack");
    }

    #[test]
    fn test_resolve_voice() {
        let client = RealtimeVoiceClient::new(RealtimeVoiceConfig {
            voice: OpenAIRealtimeVoice::Coral,
            ..Default::default()
        });

        assert_eq!(client.resolve_voice(&VoiceOptions::new()), OpenAIRealtimeVoice::Coral);

        let mut options = VoiceOptions::new();
        options.insert("voice".to_string(), serde_json::json!("shimmer"));
        assert_eq!(client.resolve_voice(&options), OpenAIRealtimeVoice::Shimmer);

        options.insert("voice".to_string(), serde_json::json!("unknown"));
        assert_eq!(client.resolve_voice(&options), OpenAIRealtimeVoice::Coral);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let client = RealtimeVoiceClient::new(RealtimeVoiceConfig::default());
        let err = client.synthesize("hello", &VoiceOptions::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_failed() {
        let client = RealtimeVoiceClient::new(RealtimeVoiceConfig {
            api_key: Some("sk-test".to_string().into()),
            url: "ws://127.0.0.1:1/v1/realtime".to_string(),
            ..Default::default()
        });
        let err = client.synthesize("hello", &VoiceOptions::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::ConnectionFailed(_)));
    }
}
