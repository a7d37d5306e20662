//! Scalar DSP helpers shared by the preprocessing and whistle paths.
//!
//! All filters here are first-order recursions; they trade flatness for
//! per-sample O(1) cost on the hot path.

/// Root-mean-square of a sample buffer.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|&s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// One-pole low-pass over a whole buffer, seeded from the first sample.
///
/// `y[n] = y[n-1] + alpha * (x[n] - y[n-1])`, `alpha = dt / (rc + dt)`.
pub fn low_pass(samples: &[f32], cutoff_hz: f32, sample_rate: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let rc = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
    let dt = 1.0 / sample_rate;
    let alpha = dt / (rc + dt);

    let mut out = Vec::with_capacity(samples.len());
    let mut prev = samples[0];
    out.push(prev);
    for &x in &samples[1..] {
        prev += alpha * (x - prev);
        out.push(prev);
    }
    out
}

/// One-pole high-pass over a whole buffer, seeded from the first sample.
///
/// `y[n] = alpha * (y[n-1] + x[n] - x[n-1])`, `alpha = rc / (rc + dt)`.
pub fn high_pass(samples: &[f32], cutoff_hz: f32, sample_rate: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let rc = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
    let dt = 1.0 / sample_rate;
    let alpha = rc / (rc + dt);

    let mut out = Vec::with_capacity(samples.len());
    let mut prev_x = samples[0];
    let mut prev_y = samples[0];
    out.push(prev_y);
    for &x in &samples[1..] {
        let y = alpha * (prev_y + x - prev_x);
        out.push(y);
        prev_x = x;
        prev_y = y;
    }
    out
}

/// Band-pass approximation: low-pass at the upper corner, then high-pass
/// at the lower corner.
pub fn band_pass(samples: &[f32], low_hz: f32, high_hz: f32, sample_rate: f32) -> Vec<f32> {
    let lp = low_pass(samples, high_hz, sample_rate);
    high_pass(&lp, low_hz, sample_rate)
}

/// Z-score normalization in place; skipped for near-constant buffers
/// (std below `1e-4`) where it would blow up noise.
pub fn zscore_normalize(samples: &mut [f32]) {
    if samples.is_empty() {
        return;
    }
    let n = samples.len() as f32;
    let mean: f32 = samples.iter().sum::<f32>() / n;
    let variance: f32 = samples.iter().map(|&s| (s - mean) * (s - mean)).sum::<f32>() / n;
    let std = variance.sqrt();

    if std > 1e-4 {
        for s in samples.iter_mut() {
            *s = (*s - mean) / std;
        }
    }
}

/// Scale so the peak lands at `target`, but only when the peak already
/// exceeds `floor` (silence stays silence).
pub fn peak_normalize(samples: &mut [f32], target: f32, floor: f32) {
    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    if peak > floor {
        let scale = target / peak;
        for s in samples.iter_mut() {
            *s *= scale;
        }
    }
}

/// Pad with trailing zeros or truncate to exactly `len` samples.
pub fn pad_or_truncate(mut samples: Vec<f32>, len: usize) -> Vec<f32> {
    if samples.len() < len {
        samples.resize(len, 0.0);
    } else {
        samples.truncate(len);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, n: usize, amplitude: f32) -> Vec<f32> {
        (0..n)
            .map(|i| {
                (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * amplitude
            })
            .collect()
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 256]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_sine_near_theoretical() {
        let tone = sine(1000.0, 16_000.0, 16_000, 1.0);
        let r = rms(&tone);
        assert!((r - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01, "rms {}", r);
    }

    #[test]
    fn high_pass_kills_dc() {
        let dc = vec![0.75f32; 8000];
        let out = high_pass(&dc, 90.0, 16_000.0);
        // After warm-up the output converges to zero
        assert!(out[7999].abs() < 1e-3, "residual {}", out[7999]);
    }

    #[test]
    fn low_pass_passes_dc() {
        let dc = vec![0.5f32; 8000];
        let out = low_pass(&dc, 90.0, 16_000.0);
        assert!((out[7999] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn band_pass_attenuates_out_of_band() {
        let fs = 16_000.0;
        let in_band = sine(3000.0, fs, 16_000, 0.5);
        let below = sine(100.0, fs, 16_000, 0.5);

        let in_band_rms = rms(&band_pass(&in_band, 1500.0, 5000.0, fs));
        let below_rms = rms(&band_pass(&below, 1500.0, 5000.0, fs));
        assert!(in_band_rms > below_rms * 3.0, "{} vs {}", in_band_rms, below_rms);
    }

    #[test]
    fn zscore_produces_unit_variance() {
        let mut tone = sine(440.0, 16_000.0, 4096, 0.1);
        zscore_normalize(&mut tone);
        let r = rms(&tone);
        assert!((r - 1.0).abs() < 0.05, "rms after zscore {}", r);
    }

    #[test]
    fn zscore_skips_near_silence() {
        let mut quiet = vec![1e-6f32; 1024];
        let before = quiet.clone();
        zscore_normalize(&mut quiet);
        assert_eq!(quiet, before);
    }

    #[test]
    fn peak_normalize_respects_floor() {
        let mut quiet = vec![0.05f32; 16];
        peak_normalize(&mut quiet, 0.9, 0.1);
        assert_eq!(quiet[0], 0.05);

        let mut loud = vec![0.5f32; 16];
        peak_normalize(&mut loud, 0.9, 0.1);
        assert!((loud[0] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn pad_or_truncate_exact_lengths() {
        assert_eq!(pad_or_truncate(vec![1.0; 3], 5), vec![1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(pad_or_truncate(vec![1.0; 5], 3).len(), 3);
        assert_eq!(pad_or_truncate(vec![1.0; 4], 4).len(), 4);
    }
}
