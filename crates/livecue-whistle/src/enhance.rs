use livecue_audio::dsp;

use crate::config::EnhanceConfig;

/// Boost a stage-2 window so faint, distant whistles survive verification:
/// amplify, isolate the whistle band, compress the dynamic range, and
/// peak-normalize.
pub fn enhance_whistle_window(
    samples: &[f32],
    sample_rate: f32,
    band_low_hz: f32,
    band_high_hz: f32,
    cfg: &EnhanceConfig,
) -> Vec<f32> {
    let mut enhanced: Vec<f32> = samples.iter().map(|&s| s * cfg.amplify).collect();

    enhanced = dsp::band_pass(&enhanced, band_low_hz, band_high_hz, sample_rate);

    compress(&mut enhanced, cfg);

    dsp::peak_normalize(&mut enhanced, cfg.normalize_target, cfg.normalize_floor);
    enhanced
}

/// Downward compression above the knee, gentle boost below it.
fn compress(samples: &mut [f32], cfg: &EnhanceConfig) {
    let threshold = cfg.compress_threshold;
    let ratio = cfg.compress_ratio;
    for s in samples.iter_mut() {
        let magnitude = s.abs();
        if magnitude > threshold {
            let excess = magnitude - threshold;
            let compressed = threshold + excess / ratio;
            *s = if *s >= 0.0 { compressed } else { -compressed };
        } else {
            *s *= cfg.below_knee_boost;
        }
    }
}
