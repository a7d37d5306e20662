use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

/// FFT-based spectral measurements for gating decisions.
///
/// Keeps a planner so repeated calls on same-sized windows reuse the
/// computed twiddle tables.
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f32>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Frequency of the strongest magnitude bin, DC excluded.
    ///
    /// The input is zero-padded (or truncated) to the next power of two.
    /// Returns 0.0 for empty input.
    pub fn dominant_frequency(&mut self, samples: &[f32], sample_rate: f32) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let fft_size = samples.len().next_power_of_two();
        let fft = self.planner.plan_fft_forward(fft_size);

        let mut buffer: Vec<Complex32> = samples
            .iter()
            .map(|&s| Complex32::new(s, 0.0))
            .chain(std::iter::repeat(Complex32::new(0.0, 0.0)))
            .take(fft_size)
            .collect();
        fft.process(&mut buffer);

        // Only the first half carries unique information for real input;
        // skip bin 0 so DC never wins.
        let mut max_mag = 0.0f32;
        let mut max_idx = 0usize;
        for (i, c) in buffer.iter().enumerate().take(fft_size / 2).skip(1) {
            let mag = c.norm_sqr();
            if mag > max_mag {
                max_mag = mag;
                max_idx = i;
            }
        }

        max_idx as f32 * sample_rate / fft_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn finds_pure_tone_frequency() {
        let mut analyzer = SpectrumAnalyzer::new();
        let fs = 16_000.0;
        for freq in [200.0, 1000.0, 3000.0, 4500.0] {
            let tone = sine(freq, fs, 16_000);
            let detected = analyzer.dominant_frequency(&tone, fs);
            assert!(
                (detected - freq).abs() < 10.0,
                "expected ~{} Hz, got {}",
                freq,
                detected
            );
        }
    }

    #[test]
    fn dc_offset_does_not_win() {
        let mut analyzer = SpectrumAnalyzer::new();
        let fs = 16_000.0;
        let mut tone = sine(3000.0, fs, 8192);
        for s in tone.iter_mut() {
            *s = *s * 0.1 + 0.9; // heavy DC bias, weak tone
        }
        let detected = analyzer.dominant_frequency(&tone, fs);
        assert!((detected - 3000.0).abs() < 20.0, "got {}", detected);
    }

    #[test]
    fn strongest_of_two_tones_wins() {
        let mut analyzer = SpectrumAnalyzer::new();
        let fs = 16_000.0;
        let weak = sine(500.0, fs, 8192);
        let strong = sine(2500.0, fs, 8192);
        let mixed: Vec<f32> = weak
            .iter()
            .zip(&strong)
            .map(|(w, s)| w * 0.2 + s * 0.8)
            .collect();
        let detected = analyzer.dominant_frequency(&mixed, fs);
        assert!((detected - 2500.0).abs() < 20.0, "got {}", detected);
    }

    #[test]
    fn empty_input_is_zero() {
        let mut analyzer = SpectrumAnalyzer::new();
        assert_eq!(analyzer.dominant_frequency(&[], 16_000.0), 0.0);
    }
}
