//! MFCC extraction matching the trained model's preprocessing.
//!
//! 2048-point frames with 512-sample hop, Hann window, power spectrum via
//! real FFT, 128-band HTK mel filterbank with log compression, orthonormal
//! DCT-II, first 40 coefficients. Coefficients are averaged over time so a
//! recording reduces to a single 40-dim vector.

use neuroscreen_core::{CoreError, Result};
use realfft::RealFftPlanner;

use crate::wav::TARGET_SAMPLE_RATE;

/// FFT frame size.
pub const N_FFT: usize = 2048;
/// Hop between successive frames.
pub const HOP_LENGTH: usize = 512;
/// Mel filterbank size.
pub const N_MELS: usize = 128;
/// Number of cepstral coefficients kept.
pub const N_MFCC: usize = 40;

/// Compute the 40 time-averaged MFCCs of a mono 22.05 kHz sample buffer.
pub fn extract_mfcc_means(samples: &[f32]) -> Result<Vec<f32>> {
    if samples.is_empty() {
        return Err(CoreError::feature_extraction("empty audio window"));
    }
    if samples.len() < N_FFT {
        return Err(CoreError::audio_too_short(N_FFT, samples.len()));
    }

    let window = hann_window(N_FFT);
    let filterbank = create_mel_filterbank(N_MELS, N_FFT, TARGET_SAMPLE_RATE as f32);
    let dct = dct_matrix(N_MFCC, N_MELS);

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(N_FFT);
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let n_frames = (samples.len() - N_FFT) / HOP_LENGTH + 1;
    let mut sums = vec![0.0f64; N_MFCC];
    let mut power = vec![0.0f32; N_FFT / 2 + 1];
    let mut log_mel = vec![0.0f32; N_MELS];

    for frame_idx in 0..n_frames {
        let start = frame_idx * HOP_LENGTH;
        for i in 0..N_FFT {
            input[i] = samples[start + i] * window[i];
        }

        fft.process(&mut input, &mut spectrum)
            .map_err(|e| CoreError::feature_extraction(e.to_string()))?;

        for (bin, c) in spectrum.iter().enumerate() {
            power[bin] = (c.re * c.re + c.im * c.im) / N_FFT as f32;
        }

        for (band, filter) in filterbank.iter().enumerate() {
            let mut energy = 0.0f32;
            for (&coeff, &p) in filter.iter().zip(power.iter()) {
                energy += coeff * p;
            }
            log_mel[band] = energy.max(1e-10).ln();
        }

        for (k, row) in dct.iter().enumerate() {
            let mut acc = 0.0f32;
            for (&d, &m) in row.iter().zip(log_mel.iter()) {
                acc += d * m;
            }
            sums[k] += acc as f64;
        }
    }

    Ok(sums
        .iter()
        .map(|s| (s / n_frames as f64) as f32)
        .collect())
}

/// Generate a Hann window of given size
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Create mel filterbank matrix
///
/// Returns a Vec of `n_bands` triangular filters, each with N_FFT/2+1
/// coefficients.
fn create_mel_filterbank(n_bands: usize, frame_size: usize, sample_rate: f32) -> Vec<Vec<f32>> {
    let n_bins = frame_size / 2 + 1;
    let f_max = sample_rate / 2.0;

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(f_max);

    // Evenly-spaced points on the mel axis, band edges included
    let n_points = n_bands + 2;
    let mel_points: Vec<f32> = (0..n_points)
        .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_points - 1) as f32)
        .collect();

    let hz_points: Vec<f32> = mel_points.iter().map(|&m| mel_to_hz(m)).collect();
    let bin_points: Vec<f32> = hz_points
        .iter()
        .map(|&hz| hz * frame_size as f32 / sample_rate)
        .collect();

    let mut filterbank = Vec::with_capacity(n_bands);
    for band in 0..n_bands {
        let mut filter = vec![0.0f32; n_bins];
        let left = bin_points[band];
        let center = bin_points[band + 1];
        let right = bin_points[band + 2];

        for (bin, value) in filter.iter_mut().enumerate() {
            let bin_f = bin as f32;
            if bin_f >= left && bin_f <= center && (center - left) > 0.0 {
                *value = (bin_f - left) / (center - left);
            } else if bin_f > center && bin_f <= right && (right - center) > 0.0 {
                *value = (right - bin_f) / (right - center);
            }
        }
        filterbank.push(filter);
    }

    filterbank
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Orthonormal DCT-II basis, `n_coeffs` rows over `n_input` mel bands.
fn dct_matrix(n_coeffs: usize, n_input: usize) -> Vec<Vec<f32>> {
    let norm0 = (1.0 / n_input as f32).sqrt();
    let norm = (2.0 / n_input as f32).sqrt();
    (0..n_coeffs)
        .map(|k| {
            let scale = if k == 0 { norm0 } else { norm };
            (0..n_input)
                .map(|n| {
                    let angle = std::f32::consts::PI * k as f32 * (2 * n + 1) as f32
                        / (2 * n_input) as f32;
                    scale * angle.cos()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_hz_roundtrip() {
        let hz = 1000.0;
        let mel = hz_to_mel(hz);
        let back = mel_to_hz(mel);
        assert!(
            (back - hz).abs() < 0.1,
            "Roundtrip: {} -> {} -> {}",
            hz,
            mel,
            back
        );
    }

    #[test]
    fn test_extract_mfcc_means_basic() {
        // Two seconds of 440 Hz sine at the pipeline rate
        let sr = TARGET_SAMPLE_RATE as f32;
        let samples: Vec<f32> = (0..(sr as usize * 2))
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr).sin() * 0.5)
            .collect();

        let mfcc = extract_mfcc_means(&samples).unwrap();
        assert_eq!(mfcc.len(), N_MFCC);
        assert!(mfcc.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(extract_mfcc_means(&[]).is_err());
    }

    #[test]
    fn test_too_short_input_fails() {
        let short = vec![0.0f32; N_FFT - 1];
        let err = extract_mfcc_means(&short).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_silence_is_finite() {
        // Digital silence hits the log floor in every band, never NaN
        let silence = vec![0.0f32; N_FFT * 4];
        let mfcc = extract_mfcc_means(&silence).unwrap();
        assert!(mfcc.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_filterbank_shape_and_coverage() {
        let fb = create_mel_filterbank(N_MELS, N_FFT, TARGET_SAMPLE_RATE as f32);
        assert_eq!(fb.len(), N_MELS);
        assert!(fb.iter().all(|f| f.len() == N_FFT / 2 + 1));
        // every filter carries some weight
        assert!(fb.iter().all(|f| f.iter().any(|&c| c > 0.0)));
    }

    #[test]
    fn test_dct_first_row_is_constant() {
        let dct = dct_matrix(N_MFCC, N_MELS);
        assert_eq!(dct.len(), N_MFCC);
        let first = dct[0][0];
        assert!(dct[0].iter().all(|&v| (v - first).abs() < 1e-6));
    }

    #[test]
    fn test_tonal_input_differs_from_silence() {
        let sr = TARGET_SAMPLE_RATE as f32;
        let tone: Vec<f32> = (0..(sr as usize))
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sr).sin())
            .collect();
        let silence = vec![0.0f32; sr as usize];

        let tone_mfcc = extract_mfcc_means(&tone).unwrap();
        let silence_mfcc = extract_mfcc_means(&silence).unwrap();
        let distance: f32 = tone_mfcc
            .iter()
            .zip(silence_mfcc.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(distance > 1.0, "tone and silence should separate: {distance}");
    }
}
