//! Backend abstraction used by the router.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::{BackendResult, SynthesisError};
use super::types::{BackendAudio, SynthesisMode, VoiceOptions};

/// A speech synthesis provider reachable over the network.
///
/// Implementors hold only immutable configuration so a single instance can
/// serve concurrent requests.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Mode served by this backend.
    fn mode(&self) -> SynthesisMode;

    /// Reject caller options before any network activity.
    fn validate_options(&self, _options: &VoiceOptions) -> Result<(), SynthesisError> {
        Ok(())
    }

    /// Produce raw audio for `text` in the backend's declared format.
    async fn synthesize(&self, text: &str, options: &VoiceOptions) -> BackendResult<BackendAudio>;
}

/// Shared, type-erased backend.
pub type SharedBackend = Arc<dyn SynthesisBackend>;
