use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HP_CUTOFF_HZ;
use crate::frame::AudioFrame;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseGateConfig {
    pub enabled: bool,
    /// Attenuation applied when the gate is closed (dB, negative)
    pub attenuation_db: f32,
    /// Gate closes when RMS falls below `ema_rms * open_ratio`
    pub open_ratio: f32,
    /// EMA coefficient for the quiet-RMS tracker
    pub ema_alpha: f32,
}

impl Default for NoiseGateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            attenuation_db: -6.0,
            open_ratio: 1.5,
            ema_alpha: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    pub hp_cutoff_hz: f64,
    pub noise_gate: NoiseGateConfig,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            hp_cutoff_hz: DEFAULT_HP_CUTOFF_HZ,
            noise_gate: NoiseGateConfig::default(),
        }
    }
}

/// Downmix + high-pass + optional noise gate, run synchronously inside the
/// capture delivery path.
///
/// Filter registers persist across calls so the stream stays continuous
/// between buffers; `reset()` clears them for a fresh session.
pub struct Preprocessor {
    config: PreprocessorConfig,
    sample_rate: u32,
    hp_alpha: f32,
    // High-pass registers
    x1: f32,
    y1: f32,
    // Quiet-RMS tracker for the gate
    ema_rms: f32,
    gate_attenuation: f32,
}

impl Preprocessor {
    pub fn new(sample_rate: u32, config: PreprocessorConfig) -> Self {
        let dt = 1.0 / sample_rate as f64;
        let rc = 1.0 / (2.0 * std::f64::consts::PI * config.hp_cutoff_hz);
        Self {
            hp_alpha: (rc / (rc + dt)) as f32,
            gate_attenuation: 10f32.powf(config.noise_gate.attenuation_db / 20.0),
            config,
            sample_rate,
            x1: 0.0,
            y1: 0.0,
            ema_rms: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Downmix channels 0/1 as `0.5*(L+R)` (center-emphasis mid recovery).
    ///
    /// Mono input is copied bit-identically.
    pub fn downmix(&self, frame: &AudioFrame) -> Vec<f32> {
        let n = frame.frame_len();
        if frame.is_mono() {
            return frame.samples.clone();
        }
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(0.5 * (frame.sample(0, i) + frame.sample(1, i)));
        }
        out
    }

    /// Produce the cleaned mono frame for transcription and analysis.
    ///
    /// A frame with no channels cannot be processed; it is returned
    /// unchanged rather than propagated as an error.
    pub fn process(&mut self, frame: &AudioFrame) -> AudioFrame {
        if frame.channels == 0 || frame.samples.is_empty() {
            tracing::warn!(
                channels = frame.channels,
                len = frame.samples.len(),
                "Frame cannot be preprocessed, passing through"
            );
            return frame.clone();
        }

        let mut mono = self.downmix(frame);

        // One-pole high-pass, state carried across buffers
        let a = self.hp_alpha;
        let mut prev_x = self.x1;
        let mut prev_y = self.y1;
        for s in mono.iter_mut() {
            let x = *s;
            let y = a * (prev_y + x - prev_x);
            *s = y;
            prev_x = x;
            prev_y = y;
        }
        self.x1 = prev_x;
        self.y1 = prev_y;

        if self.config.noise_gate.enabled {
            self.apply_gate(&mut mono);
        }

        AudioFrame::mono(mono, frame.sample_rate, frame.timestamp)
    }

    fn apply_gate(&mut self, mono: &mut [f32]) {
        let gate = &self.config.noise_gate;
        let rms = crate::dsp::rms(mono);

        // Track the quiet floor only outside bursts, with hysteresis
        if rms < self.ema_rms * 1.5 || self.ema_rms == 0.0 {
            self.ema_rms = gate.ema_alpha * self.ema_rms + (1.0 - gate.ema_alpha) * rms;
        }

        let open_threshold = (self.ema_rms * gate.open_ratio).max(1e-6);
        if rms < open_threshold {
            for s in mono.iter_mut() {
                *s *= self.gate_attenuation;
            }
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
        self.ema_rms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SampleLayout;
    use std::time::Instant;

    fn stereo_frame(left: &[f32], right: &[f32], rate: u32) -> AudioFrame {
        let mut samples = Vec::with_capacity(left.len() * 2);
        for (l, r) in left.iter().zip(right) {
            samples.push(*l);
            samples.push(*r);
        }
        AudioFrame {
            samples,
            sample_rate: rate,
            channels: 2,
            layout: SampleLayout::Interleaved,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn downmix_length_matches_frame_len() {
        let pp = Preprocessor::new(48_000, PreprocessorConfig::default());
        for n in [1usize, 7, 128, 480] {
            let frame = stereo_frame(&vec![0.5; n], &vec![-0.5; n], 48_000);
            assert_eq!(pp.downmix(&frame).len(), n);
        }
    }

    #[test]
    fn downmix_mono_is_bit_identical() {
        let pp = Preprocessor::new(48_000, PreprocessorConfig::default());
        let samples: Vec<f32> = (0..256).map(|i| (i as f32 * 0.013).sin()).collect();
        let frame = AudioFrame::mono(samples.clone(), 48_000, Instant::now());
        assert_eq!(pp.downmix(&frame), samples);
    }

    #[test]
    fn downmix_averages_channels() {
        let pp = Preprocessor::new(48_000, PreprocessorConfig::default());
        let frame = stereo_frame(&[1.0, 0.2], &[0.0, 0.6], 48_000);
        let mono = pp.downmix(&frame);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!((mono[1] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn dc_input_converges_to_zero() {
        for cutoff in [30.0, 90.0, 250.0] {
            let mut pp = Preprocessor::new(
                16_000,
                PreprocessorConfig {
                    hp_cutoff_hz: cutoff,
                    ..Default::default()
                },
            );
            let frame = AudioFrame::mono(vec![0.8; 4096], 16_000, Instant::now());
            // Run several buffers so the filter warms up
            let mut out = pp.process(&frame);
            for _ in 0..3 {
                out = pp.process(&frame);
            }
            let tail = out.samples[out.samples.len() - 1];
            assert!(tail.abs() < 1e-3, "cutoff {} residual {}", cutoff, tail);
        }
    }

    #[test]
    fn filter_state_persists_across_buffers() {
        let mut pp = Preprocessor::new(16_000, PreprocessorConfig::default());
        let frame = AudioFrame::mono(vec![0.5; 512], 16_000, Instant::now());

        let first = pp.process(&frame);
        let second = pp.process(&frame);
        // The first sample of a fresh filter sees the full step; the
        // continuation buffer must not re-trigger it.
        assert!(first.samples[0].abs() > second.samples[0].abs());
    }

    #[test]
    fn zero_channel_frame_passes_through() {
        let mut pp = Preprocessor::new(16_000, PreprocessorConfig::default());
        let frame = AudioFrame {
            samples: vec![0.3, 0.4],
            sample_rate: 16_000,
            channels: 0,
            layout: SampleLayout::Interleaved,
            timestamp: Instant::now(),
        };
        let out = pp.process(&frame);
        assert_eq!(out.samples, frame.samples);
        assert_eq!(out.channels, 0);
    }

    #[test]
    fn noise_gate_attenuates_quiet_buffers() {
        let mut cfg = PreprocessorConfig::default();
        cfg.noise_gate.enabled = true;
        cfg.hp_cutoff_hz = 1.0; // keep the HPF out of the way
        let mut pp = Preprocessor::new(16_000, cfg);

        // Establish a quiet floor, then a slightly-below-threshold buffer
        let quiet: Vec<f32> = (0..512).map(|i| ((i as f32) * 0.7).sin() * 0.01).collect();
        let quiet_frame = AudioFrame::mono(quiet, 16_000, Instant::now());
        let mut last_rms = 0.0;
        for _ in 0..20 {
            let out = pp.process(&quiet_frame);
            last_rms = crate::dsp::rms(&out.samples);
        }
        let raw_rms = crate::dsp::rms(&quiet_frame.samples);
        assert!(last_rms < raw_rms, "gated {} raw {}", last_rms, raw_rms);
    }

    #[test]
    fn reset_clears_filter_registers() {
        let mut pp = Preprocessor::new(16_000, PreprocessorConfig::default());
        let frame = AudioFrame::mono(vec![0.5; 512], 16_000, Instant::now());
        let first = pp.process(&frame);
        pp.reset();
        let again = pp.process(&frame);
        assert_eq!(first.samples[0], again.samples[0]);
    }
}
