//! Audio test fixtures
//!
//! Raw buffers are 16-bit signed little-endian PCM. WAV containers are
//! authored with `hound`.

use std::f32::consts::PI;
use std::io::Cursor;

/// Canonical output rate
pub const SAMPLE_RATE: u32 = 16000;
/// Native realtime backend rate
pub const REALTIME_RATE: u32 = 24000;

/// Generate a sine tone at `sample_rate`
pub fn generate_sine_wave(
    duration_samples: usize,
    frequency: f32,
    amplitude: f32,
    sample_rate: u32,
) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / sample_rate as f32;

    (0..duration_samples)
        .map(|i| ((angular_freq * i as f32).sin() * max_amplitude) as i16)
        .collect()
}

/// Sine tone as raw PCM bytes
pub fn generate_sine_wave_bytes(
    duration_samples: usize,
    frequency: f32,
    amplitude: f32,
    sample_rate: u32,
) -> Vec<u8> {
    samples_to_bytes(&generate_sine_wave(
        duration_samples,
        frequency,
        amplitude,
        sample_rate,
    ))
}

pub fn generate_silence_bytes(duration_samples: usize) -> Vec<u8> {
    vec![0u8; duration_samples * 2]
}

pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}

/// 16-bit WAV container with interleaved `samples`
pub fn create_wav_file(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Interleave a mono signal into identical stereo frames
pub fn to_stereo(samples: &[i16]) -> Vec<i16> {
    samples.iter().flat_map(|&s| [s, s]).collect()
}
