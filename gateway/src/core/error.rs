//! Error types shared by the synthesis backends and the router.

use std::time::Duration;

use thiserror::Error;

use super::audio::ConversionError;

/// Errors raised by a synthesis backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Transport could not be established or closed before the session was ready
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The provider refused the session configuration
    #[error("Session rejected: {0}")]
    SessionRejected(String),

    /// The provider reported an error while producing audio
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider answered with a non-success HTTP status
    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend finished without producing any audio
    #[error("Backend produced no audio")]
    EmptyAudio,

    /// A bounded wait expired
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// I/O failure on an established transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider sent something that could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credentials or endpoint missing from configuration
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    /// A request parameter cannot be sent to the provider
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by [`crate::core::SynthesisRouter::synthesize`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    /// The request was rejected before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl SynthesisError {
    /// Stable machine-readable label for the failure category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conversion(_) => "conversion",
            Self::Backend(e) => match e {
                BackendError::ConnectionFailed(_) => "connection_failed",
                BackendError::SessionRejected(_) => "session_rejected",
                BackendError::Provider(_) => "provider",
                BackendError::Status { .. } => "upstream_status",
                BackendError::EmptyAudio => "empty_audio",
                BackendError::Timeout(_) => "timeout",
                BackendError::Transport(_) => "transport",
                BackendError::InvalidResponse(_) => "invalid_response",
                BackendError::NotConfigured(_) => "not_configured",
                BackendError::InvalidRequest(_) => "invalid_request",
            },
        }
    }
}
