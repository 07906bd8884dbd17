//! WAV decoding and sample conditioning for the voice pipeline.
//!
//! Uploads arrive as complete WAV byte buffers. Decoding normalizes to mono
//! f32, then the pipeline window is applied: the first half second is
//! skipped (microphone settle / button click) and at most five seconds are
//! analysed, resampled to the classifier's 22.05 kHz rate.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use neuroscreen_core::{CoreError, Result};

/// Sample rate the classifier was trained at.
pub const TARGET_SAMPLE_RATE: u32 = 22_050;
/// Seconds skipped at the start of the recording.
pub const OFFSET_SECS: f32 = 0.5;
/// Maximum analysed duration in seconds.
pub const MAX_DURATION_SECS: f32 = 5.0;

/// Decoded mono audio with its source sample rate.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode a WAV byte buffer into mono f32 samples.
///
/// Integer formats are normalized by their bit depth; multi-channel
/// streams are downmixed by averaging.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| CoreError::invalid_audio(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| CoreError::invalid_audio(e.to_string()))?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| CoreError::invalid_audio(e.to_string()))?
        }
    };

    if interleaved.is_empty() {
        return Err(CoreError::invalid_audio("no samples in WAV stream"));
    }
    if spec.sample_rate == 0 {
        return Err(CoreError::invalid_audio("WAV header declares zero sample rate"));
    }

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        downmix(&interleaved, channels)
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Average interleaved channels into a mono stream.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Apply the pipeline window (skip lead-in, cap duration) and resample to
/// [`TARGET_SAMPLE_RATE`].
pub fn prepare_samples(audio: &DecodedAudio) -> Vec<f32> {
    let sr = audio.sample_rate as f32;
    let start = ((OFFSET_SECS * sr) as usize).min(audio.samples.len());
    let max_len = (MAX_DURATION_SECS * sr) as usize;
    let end = (start + max_len).min(audio.samples.len());
    let window = &audio.samples[start..end];

    if audio.sample_rate == TARGET_SAMPLE_RATE {
        window.to_vec()
    } else {
        resample_linear(window, sr, TARGET_SAMPLE_RATE as f32)
    }
}

/// Simple linear interpolation resampling
fn resample_linear(samples: &[f32], from_sr: f32, to_sr: f32) -> Vec<f32> {
    let ratio = from_sr / to_sr;
    let output_len = (samples.len() as f32 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f32 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };
        output.push(sample);
    }

    output
}
