//! Decoders from backend payloads to interleaved `f32` samples.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{ConversionError, ConversionResult, DecodedAudio};

/// Full-scale divisor shared with the quantizer so i16 values survive a round trip.
const I16_SCALE: f32 = 32768.0;

/// Decode headerless signed 16-bit little-endian PCM.
pub(crate) fn decode_pcm16le(
    data: &[u8],
    channels: u16,
    sample_rate: u32,
) -> ConversionResult<DecodedAudio> {
    if channels == 0 {
        return Err(ConversionError::InvalidFormat(
            "channel count must be at least 1".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(ConversionError::InvalidFormat(
            "sample rate must be positive".to_string(),
        ));
    }
    if data.len() % 2 != 0 {
        return Err(ConversionError::MalformedInput(format!(
            "PCM16 payload has odd length {}",
            data.len()
        )));
    }

    let frame_bytes = 2 * channels as usize;
    if data.len() % frame_bytes != 0 {
        return Err(ConversionError::MalformedInput(format!(
            "PCM16 payload of {} bytes is not a whole number of {}-channel frames",
            data.len(),
            channels
        )));
    }

    let samples = data
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / I16_SCALE)
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels: channels as usize,
    })
}

/// Decode a RIFF/WAVE container.
pub(crate) fn decode_wav(data: &[u8]) -> ConversionResult<DecodedAudio> {
    let mut reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| ConversionError::Decode(format!("invalid WAV: {e}")))?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(ConversionError::InvalidFormat(format!(
            "WAV header declares {} channels at {} Hz",
            spec.channels, spec.sample_rate
        )));
    }

    let decode_err = |e: hound::Error| ConversionError::Decode(format!("WAV samples: {e}"));

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / I16_SCALE))
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        (hound::SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        (format, bits) => {
            return Err(ConversionError::Unsupported(format!(
                "WAV {format:?} with {bits} bits per sample"
            )));
        }
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels as usize,
    })
}

/// Decode MP3, FLAC or Ogg Vorbis through symphonia's probe.
pub(crate) fn decode_compressed(
    data: &[u8],
    extension: Option<&str>,
) -> ConversionResult<DecodedAudio> {
    let source = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ConversionError::Decode(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| ConversionError::Decode("no audio track found".into()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ConversionError::InvalidFormat("unknown sample rate".into()))?;
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => ConversionError::Unsupported(what.to_string()),
            other => ConversionError::Decode(other.to_string()),
        })?;

    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(ConversionError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if channels == 0 {
                    channels = decoded.spec().channels.count();
                }
                let sb = sample_buf.get_or_insert_with(|| {
                    SampleBuffer::new(decoded.capacity() as u64, *decoded.spec())
                });
                sb.copy_interleaved_ref(decoded);
                samples.extend_from_slice(sb.samples());
            }
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(ConversionError::Decode(e.to_string())),
        }
    }

    if samples.is_empty() {
        return Err(ConversionError::Decode(
            "stream contained no decodable audio".into(),
        ));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels: channels.max(1),
    })
}
