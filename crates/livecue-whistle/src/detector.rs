use std::time::Instant;

use livecue_audio::{dsp, resample_linear, RetentionRing, SpectrumAnalyzer};
use livecue_foundation::ClassifierError;

use crate::classifier::WhistleClassifier;
use crate::config::WhistleConfig;
use crate::enhance::enhance_whistle_window;

/// Why a frame did not produce a whistle event. Every variant is a normal
/// negative outcome; nearly every frame ends up here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// Within the cooldown window after a confirmation
    Cooldown,
    /// Raw frame RMS under the near-silence floor
    LowEnergy,
    /// Not enough energy left after band isolation
    LowBandEnergy,
    /// Dominant frequency outside the whistle band
    FrequencyOutOfRange { hz: f32 },
    /// Loose first-pass probability under threshold
    Stage1 { probability: f32 },
    /// Retention ring too short for verification
    InsufficientHistory,
    /// Strict verification max probability under threshold
    Stage2 { probability: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhistleOutcome {
    Rejected(RejectReason),
    /// Stage 2 passed but more consecutive hits are required
    Pending { hits: u32 },
    Confirmed,
}

/// Read-only observability values; no behavioral effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhistleSnapshot {
    pub last_probability: f32,
    pub last_stage1_probability: f32,
    pub last_stage2_probability: f32,
    pub last_rms: f32,
    pub last_dominant_hz: f32,
}

/// Two-stage whistle detection with strict false-positive suppression.
///
/// Gate order: cooldown, energy, band energy, dominant frequency, loose
/// stage-1 classification, strict multi-window stage-2 verification,
/// consecutive-hit confirmation. The single processing path owns all
/// mutable state; nothing here is shared across threads.
pub struct WhistleDetector<C: WhistleClassifier> {
    classifier: C,
    config: WhistleConfig,
    ring: RetentionRing,
    analyzer: SpectrumAnalyzer,
    last_detection: Option<Instant>,
    consecutive_hits: u32,
    snapshot: WhistleSnapshot,
    model_warned: bool,
}

impl<C: WhistleClassifier> WhistleDetector<C> {
    pub fn new(classifier: C, config: WhistleConfig) -> Self {
        Self {
            ring: RetentionRing::new(config.ring_capacity),
            analyzer: SpectrumAnalyzer::new(),
            classifier,
            config,
            last_detection: None,
            consecutive_hits: 0,
            snapshot: WhistleSnapshot::default(),
            model_warned: false,
        }
    }

    pub fn snapshot(&self) -> WhistleSnapshot {
        self.snapshot
    }

    pub fn config(&self) -> &WhistleConfig {
        &self.config
    }

    /// Run one mono frame through the gate sequence.
    ///
    /// `now` is the delivery timestamp; passing it in keeps the cooldown
    /// logic deterministic under test.
    pub fn process(&mut self, samples: &[f32], sample_rate: u32, now: Instant) -> WhistleOutcome {
        if let Some(last) = self.last_detection {
            if now.saturating_duration_since(last) < self.config.cooldown() {
                return WhistleOutcome::Rejected(RejectReason::Cooldown);
            }
        }

        if samples.is_empty() {
            return WhistleOutcome::Rejected(RejectReason::LowEnergy);
        }

        // History for stage-2 re-verification. Appended after the cooldown
        // gate, so a confirmation quiets the ring for the cooldown span.
        self.ring.push(samples.to_vec());

        let rms = dsp::rms(samples);
        self.snapshot.last_rms = rms;
        if rms < self.config.energy_floor {
            self.reject_probabilities();
            self.snapshot.last_dominant_hz = 0.0;
            self.consecutive_hits = 0;
            return WhistleOutcome::Rejected(RejectReason::LowEnergy);
        }

        let fs = sample_rate as f32;
        let band = dsp::band_pass(samples, self.config.band_low_hz, self.config.band_high_hz, fs);

        let band_rms = dsp::rms(&band);
        if band_rms < self.config.band_energy_floor {
            tracing::trace!(band_rms, "Insufficient energy in whistle band");
            self.reject_probabilities();
            self.snapshot.last_dominant_hz = 0.0;
            self.consecutive_hits = 0;
            return WhistleOutcome::Rejected(RejectReason::LowBandEnergy);
        }

        let dominant_hz = self.analyzer.dominant_frequency(&band, fs);
        self.snapshot.last_dominant_hz = dominant_hz;
        if dominant_hz < self.config.band_low_hz || dominant_hz > self.config.band_high_hz {
            tracing::trace!(dominant_hz, "Dominant frequency outside whistle band");
            self.reject_probabilities();
            self.consecutive_hits = 0;
            return WhistleOutcome::Rejected(RejectReason::FrequencyOutOfRange { hz: dominant_hz });
        }

        let stage1 = self.classify_window(&band, sample_rate);
        self.snapshot.last_stage1_probability = stage1;
        if stage1 < self.config.stage1_threshold {
            self.snapshot.last_probability = stage1;
            self.snapshot.last_stage2_probability = 0.0;
            self.consecutive_hits = 0;
            return WhistleOutcome::Rejected(RejectReason::Stage1 { probability: stage1 });
        }

        tracing::debug!(stage1, dominant_hz, "Stage 1 passed, verifying");

        if self.ring.len() < self.config.min_history() {
            self.snapshot.last_probability = stage1;
            self.snapshot.last_stage2_probability = 0.0;
            return WhistleOutcome::Rejected(RejectReason::InsufficientHistory);
        }

        let stage2 = self.verify_stage2(sample_rate);
        self.snapshot.last_stage2_probability = stage2;
        self.snapshot.last_probability = stage2;

        if stage2 <= self.config.stage2_threshold {
            if self.consecutive_hits > 0 {
                tracing::debug!(stage2, "Detection streak interrupted");
            }
            self.consecutive_hits = 0;
            return WhistleOutcome::Rejected(RejectReason::Stage2 { probability: stage2 });
        }

        self.consecutive_hits += 1;
        if self.consecutive_hits >= self.config.required_consecutive_hits {
            tracing::info!(stage1, stage2, dominant_hz, "Whistle confirmed");
            self.last_detection = Some(now);
            self.consecutive_hits = 0;
            WhistleOutcome::Confirmed
        } else {
            WhistleOutcome::Pending {
                hits: self.consecutive_hits,
            }
        }
    }

    /// Max probability across the configured sliding windows, each enhanced
    /// before classification.
    fn verify_stage2(&mut self, sample_rate: u32) -> f32 {
        let windows = self.config.stage2_windows.clone();
        let mut max_prob = 0.0f32;
        for size in windows {
            let Some(window) = self.ring.tail(size) else {
                continue;
            };
            let enhanced = enhance_whistle_window(
                &window,
                sample_rate as f32,
                self.config.band_low_hz,
                self.config.band_high_hz,
                &self.config.enhance,
            );
            let prob = self.classify_window(&enhanced, sample_rate);
            tracing::trace!(size, prob, "Stage 2 window scored");
            if prob > max_prob {
                max_prob = prob;
            }
        }
        max_prob
    }

    /// Shape a window to the classifier contract and score it. A failed
    /// inference scores 0.0 for this window only.
    fn classify_window(&mut self, samples: &[f32], sample_rate: u32) -> f32 {
        let resampled = resample_linear(samples, sample_rate, self.config.classifier_sample_rate);
        let mut window = dsp::pad_or_truncate(resampled, self.config.classifier_input_len);
        dsp::zscore_normalize(&mut window);

        match self.classifier.classify(&window) {
            Ok(logits) => logits.whistle_probability(),
            Err(ClassifierError::ModelUnavailable) => {
                if !self.model_warned {
                    tracing::warn!("Whistle model unavailable, detector will never confirm");
                    self.model_warned = true;
                }
                0.0
            }
            Err(e) => {
                tracing::warn!(error = %e, "Whistle inference failed for this window");
                0.0
            }
        }
    }

    fn reject_probabilities(&mut self) {
        self.snapshot.last_probability = 0.0;
        self.snapshot.last_stage1_probability = 0.0;
        self.snapshot.last_stage2_probability = 0.0;
    }

    /// Drop all spectral and timing history for a fresh session.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.last_detection = None;
        self.consecutive_hits = 0;
        self.snapshot = WhistleSnapshot::default();
    }
}
