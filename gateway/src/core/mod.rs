pub mod audio;
pub mod backend;
pub mod error;
pub mod realtime;
pub mod router;
pub mod tts;
pub mod types;

// Re-export commonly used types for convenience
pub use audio::{ConversionError, SourceFormat, normalize};
pub use backend::{SharedBackend, SynthesisBackend};
pub use error::{BackendError, BackendResult, SynthesisError};
pub use realtime::{RealtimeVoiceClient, RealtimeVoiceConfig};
pub use router::SynthesisRouter;
pub use tts::{StreamingTTSClient, StreamingTtsConfig};
pub use types::{BackendAudio, SynthesisMode, SynthesisRequest, SynthesisResult, VoiceOptions};
