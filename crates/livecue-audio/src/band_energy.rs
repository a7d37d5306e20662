use serde::{Deserialize, Serialize};

use crate::constants::{BASS_ENVELOPE_HZ, BASS_HIGH_CORNER_HZ, BASS_LOW_CORNER_HZ, BASS_SCALE_K};
use crate::frame::AudioFrame;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BandEnergyConfig {
    pub low_corner_hz: f64,
    pub high_corner_hz: f64,
    pub envelope_hz: f64,
    /// Scale factor for the `1 - e^(-k*env)` mapping into [0,1]
    pub scale_k: f32,
}

impl Default for BandEnergyConfig {
    fn default() -> Self {
        Self {
            low_corner_hz: BASS_LOW_CORNER_HZ,
            high_corner_hz: BASS_HIGH_CORNER_HZ,
            envelope_hz: BASS_ENVELOPE_HZ,
            scale_k: BASS_SCALE_K,
        }
    }
}

/// Smoothed low-band ("bass") envelope driving the visual pulse.
///
/// Two one-pole low-passes with different corners approximate a band-pass
/// (fast minus slow); the squared band signal is smoothed by a third,
/// slower envelope filter. All per-sample work is O(1) and allocation-free,
/// safe for the capture callback.
pub struct BandEnergyExtractor {
    config: BandEnergyConfig,
    low_alpha: f32,
    high_alpha: f32,
    env_alpha: f32,
    slow_lpf: f32,
    fast_lpf: f32,
    envelope: f32,
}

impl BandEnergyExtractor {
    pub fn new(sample_rate: u32, config: BandEnergyConfig) -> Self {
        let fs = (sample_rate.max(8_000)) as f64;
        // y += alpha * (x - y), alpha = 1 - e^(-2*pi*f/fs)
        let alpha = |f: f64| (1.0 - (-2.0 * std::f64::consts::PI * f / fs).exp()) as f32;
        Self {
            low_alpha: alpha(config.low_corner_hz),
            high_alpha: alpha(config.high_corner_hz),
            env_alpha: alpha(config.envelope_hz),
            config,
            slow_lpf: 0.0,
            fast_lpf: 0.0,
            envelope: 0.0,
        }
    }

    /// Fold one frame into the running envelope. Stereo frames are averaged
    /// across channels 0/1; mono passes straight through.
    pub fn update(&mut self, frame: &AudioFrame) {
        if frame.channels == 0 {
            return;
        }
        let n = frame.frame_len();
        let stereo = frame.channels >= 2;
        for i in 0..n {
            let m = if stereo {
                0.5 * (frame.sample(0, i) + frame.sample(1, i))
            } else {
                frame.sample(0, i)
            };
            self.slow_lpf += self.low_alpha * (m - self.slow_lpf);
            self.fast_lpf += self.high_alpha * (m - self.fast_lpf);
            let band = self.fast_lpf - self.slow_lpf;
            let energy = band * band;
            self.envelope += self.env_alpha * (energy - self.envelope);
        }
    }

    /// Current bass level in [0,1].
    pub fn level(&self) -> f32 {
        let level = 1.0 - (-self.config.scale_k * self.envelope.max(0.0)).exp();
        level.clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.slow_lpf = 0.0;
        self.fast_lpf = 0.0;
        self.envelope = 0.0;
    }
}
