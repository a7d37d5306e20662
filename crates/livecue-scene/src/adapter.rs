use std::collections::HashMap;

use livecue_audio::{resample_linear, FrameWindower};

use crate::classifier::SceneClassifier;
use crate::config::SceneCueConfig;

/// Acoustic scene cue for the captioning overlay.
///
/// Cues are one-shot: the adapter publishes one each time a window
/// satisfies the condition and never clears a previously published cue.
/// Lifetime and expiry belong to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCue {
    Cheer,
    Boo,
}

/// Feeds fixed windows to the scene classifier and maps label scores onto
/// the cue vocabulary.
pub struct SceneCueAdapter<C: SceneClassifier> {
    classifier: C,
    windower: FrameWindower,
    config: SceneCueConfig,
    windows_classified: u64,
    model_warned: bool,
}

impl<C: SceneClassifier> SceneCueAdapter<C> {
    pub fn new(classifier: C, config: SceneCueConfig) -> Self {
        Self {
            windower: FrameWindower::new(config.window_len),
            classifier,
            config,
            windows_classified: 0,
            model_warned: false,
        }
    }

    pub fn config(&self) -> &SceneCueConfig {
        &self.config
    }

    /// Total complete windows handed to the classifier so far.
    pub fn windows_classified(&self) -> u64 {
        self.windows_classified
    }

    /// Ingest mono samples at any rate; runs the classifier once per
    /// completed window and returns any cues fired. A single call may
    /// complete zero, one, or several windows.
    pub fn ingest(&mut self, samples: &[f32], sample_rate: u32) -> Vec<SceneCue> {
        let converted = resample_linear(samples, sample_rate, self.config.sample_rate);
        self.windower.ingest(&converted);

        let mut cues = Vec::new();
        while let Some(window) = self.windower.next_window() {
            self.windows_classified += 1;
            if let Some(cue) = self.classify_window(&window) {
                cues.push(cue);
            }
        }
        cues
    }

    fn classify_window(&mut self, window: &[f32]) -> Option<SceneCue> {
        let results = match self.classifier.classify(window, self.config.top_k) {
            Ok(results) => results,
            Err(livecue_foundation::ClassifierError::ModelUnavailable) => {
                if !self.model_warned {
                    tracing::warn!("Scene model unavailable, cues disabled");
                    self.model_warned = true;
                }
                return None;
            }
            Err(e) => {
                // A failed inference drops this window's scores only
                tracing::warn!(error = %e, "Scene inference failed for this window");
                return None;
            }
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let summary: Vec<String> = results
                .iter()
                .take(3)
                .map(|r| format!("{} {:.2}", r.label, r.score))
                .collect();
            tracing::debug!(top = %summary.join(", "), "Scene window scored");
        }

        // Case-insensitive label -> score map over the full top-K
        let scores: HashMap<String, f32> = results
            .into_iter()
            .map(|r| (r.label.to_lowercase(), r.score))
            .collect();

        let best = |labels: &[String]| {
            labels
                .iter()
                .filter_map(|l| scores.get(&l.to_lowercase()).copied())
                .fold(0.0f32, f32::max)
        };

        let cheer_score = best(&self.config.cheer_labels);
        let boo_score = best(&self.config.boo_labels);

        let cheer_hit = cheer_score >= self.config.cheer_threshold;
        let boo_hit = boo_score >= self.config.boo_threshold;

        match (cheer_hit, boo_hit) {
            // Both fired: higher score wins, ties go to cheer
            (true, true) => Some(if cheer_score >= boo_score {
                SceneCue::Cheer
            } else {
                SceneCue::Boo
            }),
            (true, false) => Some(SceneCue::Cheer),
            (false, true) => Some(SceneCue::Boo),
            (false, false) => None,
        }
    }

    /// Drop buffered samples for a fresh session.
    pub fn reset(&mut self) {
        self.windower.clear();
    }
}
