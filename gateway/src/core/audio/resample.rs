//! Channel down-mixing and sample-rate conversion.

use rubato::{FftFixedIn, Resampler};

/// Inputs shorter than this skip the FFT resampler.
const MIN_FFT_INPUT: usize = 64;

/// Requested input chunk for the FFT resampler.
const FFT_CHUNK_SIZE: usize = 1024;

/// Sub-chunks per FFT chunk.
const FFT_SUB_CHUNKS: usize = 2;

/// Average interleaved channels into a single channel.
///
/// A trailing partial frame is averaged over the samples it has.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// Number of output frames for `input_len` frames: `ceil(len * to / from)`.
#[inline]
fn output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    (input_len as f64 * to_rate as f64 / from_rate as f64).ceil() as usize
}

/// Resample mono samples with a band-limited FFT resampler.
///
/// Content above the target Nyquist frequency is filtered out. The output is
/// aligned to the input (filter delay removed) and has exactly
/// `ceil(len * to_rate / from_rate)` samples. Very short inputs, and any
/// resampler failure, fall back to [`resample_linear`].
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() || from_rate == 0 || to_rate == 0 {
        return input.to_vec();
    }

    if input.len() < MIN_FFT_INPUT {
        return resample_linear(input, from_rate, to_rate);
    }

    match resample_fft(input, from_rate, to_rate) {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(
                error = %e,
                from_rate,
                to_rate,
                "FFT resampler failed, falling back to linear interpolation"
            );
            resample_linear(input, from_rate, to_rate)
        }
    }
}

fn resample_fft(
    input: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        FFT_CHUNK_SIZE.min(input.len()),
        FFT_SUB_CHUNKS,
        1,
    )?;

    let expected = output_len(input.len(), from_rate, to_rate);
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(delay + expected + resampler.output_frames_max());

    let mut pos = 0;
    loop {
        let needed = resampler.input_frames_next();
        if input.len() - pos < needed {
            break;
        }
        let chunk = vec![&input[pos..pos + needed]];
        let frames = resampler.process(chunk.as_slice(), None)?;
        output.extend_from_slice(&frames[0]);
        pos += needed;
    }

    if pos < input.len() {
        let chunk = vec![&input[pos..]];
        let frames = resampler.process_partial(Some(chunk.as_slice()), None)?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush the samples still held back by the filter delay
    while output.len() < delay + expected {
        let frames = resampler.process_partial::<Vec<f32>>(None, None)?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);
    Ok(output)
}

/// Resample mono samples by linear interpolation.
///
/// Produces `ceil(len * to_rate / from_rate)` output samples. No anti-alias
/// filtering is applied.
pub fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() || from_rate == 0 || to_rate == 0 {
        return input.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = output_len(input.len(), from_rate, to_rate);
    let last = input.len() - 1;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 / ratio;
        let idx_floor = (src_idx.floor() as usize).min(last);
        let idx_ceil = (idx_floor + 1).min(last);
        let frac = (src_idx - idx_floor as f64) as f32;

        output.push(input[idx_floor] * (1.0 - frac) + input[idx_ceil] * frac);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let mono = downmix_to_mono(&[0.2, 0.4, -1.0, 1.0], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn test_downmix_mono_is_passthrough() {
        assert_eq!(downmix_to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }

    #[test]
    fn test_resample_output_length_uses_ceiling() {
        assert_eq!(resample_linear(&vec![0.0; 1000], 24000, 16000).len(), 667);
        assert_eq!(resample_linear(&vec![0.0; 480], 48000, 16000).len(), 160);
        assert_eq!(resample_linear(&vec![0.0; 80], 8000, 16000).len(), 160);
    }

    #[test]
    fn test_resample_interpolates_between_neighbours() {
        // Upsampling 2x puts a midpoint between every pair
        let out = resample_linear(&[0.0, 1.0], 8000, 16000);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
        assert!((out[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_linear(&input, 16000, 16000), input);
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample_linear(&[], 24000, 16000).is_empty());
        assert!(resample(&[], 24000, 16000).is_empty());
    }

    fn sine(len: usize, freq: f32, rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_fft_resample_output_length_uses_ceiling() {
        assert_eq!(resample(&vec![0.0; 1000], 24000, 16000).len(), 667);
        assert_eq!(resample(&vec![0.0; 2400], 24000, 16000).len(), 1600);
        assert_eq!(resample(&vec![0.0; 4801], 48000, 16000).len(), 1601);
        assert_eq!(resample(&vec![0.0; 800], 8000, 16000).len(), 1600);
        assert_eq!(resample(&vec![0.0; 3000], 22050, 16000).len(), 2177);
    }

    #[test]
    fn test_short_input_uses_linear_path() {
        let input = [0.0, 1.0];
        assert_eq!(resample(&input, 8000, 16000), resample_linear(&input, 8000, 16000));
    }

    #[test]
    fn test_fft_resample_removes_content_above_nyquist() {
        // 10 kHz cannot be represented at 16 kHz and must not fold back as 6 kHz
        let input = sine(4800, 10_000.0, 24000);
        let output = resample(&input, 24000, 16000);
        let middle = &output[400..2800];
        assert!(rms(middle) < 0.02, "aliased energy rms {}", rms(middle));

        // Linear interpolation lets most of it through
        let linear = resample_linear(&input, 24000, 16000);
        assert!(rms(&linear[400..2800]) > 0.1);
    }

    #[test]
    fn test_fft_resample_keeps_passband() {
        let input = sine(4800, 1000.0, 24000);
        let output = resample(&input, 24000, 16000);
        let level = rms(&output[400..2800]);
        let expected = 0.5 / std::f32::consts::SQRT_2;
        assert!((level - expected).abs() < 0.01, "passband rms {level}");
    }
}
