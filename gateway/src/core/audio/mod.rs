//! Audio normalization to the canonical output format.
//!
//! Every synthesis result leaves the gateway as 16-bit signed PCM, mono,
//! 16 kHz, little-endian, with no container header. This module converts
//! whatever a backend produced into that representation.
//!
//! # Pipeline
//!
//! 1. Decode the input per its declared [`SourceFormat`]
//!    (raw PCM, WAV via `hound`, MP3/FLAC/OGG via `symphonia`)
//! 2. Down-mix to mono when more than one channel is present
//! 3. Resample to 16 kHz when the source rate differs (band-limited, `rubato`)
//! 4. Quantize to 16-bit signed and emit raw little-endian samples
//!
//! Input that is already canonical PCM is returned unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use vapi_tts_gateway::core::audio::{normalize, SourceFormat};
//!
//! let pcm_24k: Vec<u8> = fetch_realtime_audio();
//! let canonical = normalize(&pcm_24k, SourceFormat::Pcm16Le { channels: 1 }, 24000)?;
//! ```

mod decode;
mod resample;

use bytes::Bytes;
use thiserror::Error;

pub use resample::{downmix_to_mono, resample, resample_linear};

/// Canonical output sample rate in Hz.
pub const CANONICAL_SAMPLE_RATE: u32 = 16000;

/// Canonical output channel count.
pub const CANONICAL_CHANNELS: u16 = 1;

/// Canonical output bit depth.
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;

/// Wire name of the canonical encoding, as reported in response headers.
pub const CANONICAL_FORMAT_NAME: &str = "pcm_s16le";

/// Errors produced while converting audio.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The byte sequence does not match its declared layout
    #[error("Malformed audio input: {0}")]
    MalformedInput(String),

    /// The declared format parameters are unusable
    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),

    /// The container or codec could not be decoded
    #[error("Audio decoding failed: {0}")]
    Decode(String),

    /// The encoding is recognized but not supported
    #[error("Unsupported audio encoding: {0}")]
    Unsupported(String),
}

/// Result type for audio conversion.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Declared encoding of a backend payload.
///
/// Raw PCM carries no header, so its channel count travels with the variant
/// and its sample rate is passed alongside. Container formats describe their
/// own layout in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Headerless signed 16-bit little-endian PCM, interleaved
    Pcm16Le { channels: u16 },
    /// RIFF/WAVE container
    Wav,
    /// MPEG-1/2 Layer III
    Mp3,
    /// FLAC
    Flac,
    /// Ogg container (Vorbis)
    Ogg,
}

impl SourceFormat {
    /// Mono 16-bit PCM, the layout both backends are asked to produce.
    pub const MONO_PCM16: SourceFormat = SourceFormat::Pcm16Le { channels: 1 };

    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm16Le { .. } => "pcm_s16le",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
        }
    }

    /// Symphonia probe hint for compressed formats.
    fn extension_hint(&self) -> Option<&'static str> {
        match self {
            Self::Mp3 => Some("mp3"),
            Self::Flac => Some("flac"),
            Self::Ogg => Some("ogg"),
            Self::Pcm16Le { .. } | Self::Wav => None,
        }
    }

    /// Whether this format at `sample_rate` is already canonical.
    #[inline]
    pub fn is_canonical(&self, sample_rate: u32) -> bool {
        matches!(self, Self::Pcm16Le { channels: CANONICAL_CHANNELS })
            && sample_rate == CANONICAL_SAMPLE_RATE
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pcm16Le { channels } => write!(f, "pcm_s16le/{channels}ch"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Decoded interleaved samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Convert `data` into canonical PCM (16-bit, mono, 16 kHz, little-endian).
///
/// `sample_rate` is the declared source rate. It is authoritative for raw PCM;
/// for container formats the header rate wins.
///
/// Pure and deterministic: identical inputs always yield identical bytes.
pub fn normalize(data: &[u8], format: SourceFormat, sample_rate: u32) -> ConversionResult<Bytes> {
    if format.is_canonical(sample_rate) {
        if data.len() % 2 != 0 {
            return Err(ConversionError::MalformedInput(format!(
                "PCM16 payload has odd length {}",
                data.len()
            )));
        }
        return Ok(Bytes::copy_from_slice(data));
    }

    let decoded = match format {
        SourceFormat::Pcm16Le { channels } => decode::decode_pcm16le(data, channels, sample_rate)?,
        SourceFormat::Wav => decode::decode_wav(data)?,
        SourceFormat::Mp3 | SourceFormat::Flac | SourceFormat::Ogg => {
            decode::decode_compressed(data, format.extension_hint())?
        }
    };

    if decoded.sample_rate != sample_rate && !matches!(format, SourceFormat::Pcm16Le { .. }) {
        tracing::debug!(
            declared = sample_rate,
            actual = decoded.sample_rate,
            format = %format,
            "Container sample rate differs from declared rate, using container rate"
        );
    }

    Ok(encode_canonical(decoded))
}

/// Down-mix, resample and quantize decoded samples into canonical PCM bytes.
fn encode_canonical(decoded: DecodedAudio) -> Bytes {
    let mono = if decoded.channels > 1 {
        downmix_to_mono(&decoded.samples, decoded.channels)
    } else {
        decoded.samples
    };

    let resampled = if decoded.sample_rate != CANONICAL_SAMPLE_RATE {
        resample(&mono, decoded.sample_rate, CANONICAL_SAMPLE_RATE)
    } else {
        mono
    };

    let bytes_per_sample = usize::from(CANONICAL_BITS_PER_SAMPLE / 8);
    let mut out = Vec::with_capacity(resampled.len() * bytes_per_sample);
    for sample in resampled {
        out.extend_from_slice(&quantize_i16(sample).to_le_bytes());
    }
    Bytes::from(out)
}

/// Map a float sample back onto the i16 grid used by [`decode::decode_pcm16le`].
#[inline]
fn quantize_i16(sample: f32) -> i16 {
    let scaled = (sample * 32768.0).round();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
