use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Signal enhancement applied to stage-2 windows before classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnhanceConfig {
    /// Flat gain before filtering
    pub amplify: f32,
    /// Compression knee
    pub compress_threshold: f32,
    /// Ratio applied above the knee (n:1)
    pub compress_ratio: f32,
    /// Boost applied below the knee
    pub below_knee_boost: f32,
    /// Peak-normalization target
    pub normalize_target: f32,
    /// Peaks below this are left untouched
    pub normalize_floor: f32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            amplify: 5.0,
            compress_threshold: 0.3,
            compress_ratio: 4.0,
            below_knee_boost: 1.5,
            normalize_target: 0.9,
            normalize_floor: 0.1,
        }
    }
}

/// Tunables for the whistle detection pipeline.
///
/// The thresholds are empirically chosen; treat them as configuration
/// rather than derived constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhistleConfig {
    /// Loose first-pass probability threshold
    pub stage1_threshold: f32,
    /// Strict verification threshold; stage-2 max must exceed this
    pub stage2_threshold: f32,
    /// Minimum elapsed time between confirmations (seconds)
    pub cooldown_secs: f32,
    /// Absolute RMS floor below which a frame counts as near-silence
    pub energy_floor: f32,
    /// RMS floor after band isolation
    pub band_energy_floor: f32,
    /// Whistle band lower edge (Hz)
    pub band_low_hz: f32,
    /// Whistle band upper edge (Hz)
    pub band_high_hz: f32,
    /// Stage-2 passes needed on consecutive frames before confirming
    pub required_consecutive_hits: u32,
    /// Sub-buffers retained for re-verification (~2 s of callbacks)
    pub ring_capacity: usize,
    /// Stage-2 window sizes in sub-buffers, checked in the given order
    pub stage2_windows: Vec<usize>,
    /// Sample rate the classifier was trained at
    pub classifier_sample_rate: u32,
    /// Fixed classifier input length in samples
    pub classifier_input_len: usize,
    pub enhance: EnhanceConfig,
}

impl Default for WhistleConfig {
    fn default() -> Self {
        Self {
            stage1_threshold: 0.50,
            stage2_threshold: 0.75,
            cooldown_secs: 5.0,
            energy_floor: 0.001,
            band_energy_floor: 0.004,
            band_low_hz: 1500.0,
            band_high_hz: 5000.0,
            required_consecutive_hits: 1,
            ring_capacity: 120,
            stage2_windows: vec![60, 42, 30],
            classifier_sample_rate: 16_000,
            classifier_input_len: 16_000,
            enhance: EnhanceConfig::default(),
        }
    }
}

impl WhistleConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs.max(0.0))
    }

    /// Largest stage-2 window; the ring must hold at least this much
    /// history before verification can run.
    pub fn min_history(&self) -> usize {
        self.stage2_windows.iter().copied().max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.stage1_threshold)
            || !(0.0..=1.0).contains(&self.stage2_threshold)
        {
            return Err("whistle thresholds must lie in [0,1]".into());
        }
        if self.band_low_hz >= self.band_high_hz {
            return Err("whistle band_low_hz must be below band_high_hz".into());
        }
        if self.stage2_windows.is_empty() {
            return Err("at least one stage-2 window size is required".into());
        }
        if self.min_history() > self.ring_capacity {
            return Err("stage-2 window exceeds ring capacity".into());
        }
        if self.classifier_input_len == 0 {
            return Err("classifier input length must be non-zero".into());
        }
        Ok(())
    }
}
