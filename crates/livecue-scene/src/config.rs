use serde::{Deserialize, Serialize};

/// Tunables for mapping classifier label scores to overlay cues.
///
/// The cheer/boo thresholds are intentionally asymmetric and empirically
/// tuned; they are configuration, not derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCueConfig {
    /// Labels whose max score counts as "cheer"
    pub cheer_labels: Vec<String>,
    /// Labels whose max score counts as "boo"
    pub boo_labels: Vec<String>,
    pub cheer_threshold: f32,
    pub boo_threshold: f32,
    /// Fixed classifier window length in samples
    pub window_len: usize,
    /// Sample rate the classifier expects
    pub sample_rate: u32,
    /// Top-K requested from the classifier; large enough to guarantee
    /// coverage of all labels of interest
    pub top_k: usize,
}

impl Default for SceneCueConfig {
    fn default() -> Self {
        Self {
            cheer_labels: vec!["cheering".into(), "crowd".into()],
            boo_labels: vec!["vehicle".into()],
            cheer_threshold: 0.13,
            boo_threshold: 0.2,
            window_len: 15_600,
            sample_rate: 16_000,
            top_k: 521,
        }
    }
}

impl SceneCueConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.window_len == 0 {
            return Err("scene window length must be non-zero".into());
        }
        if self.cheer_labels.is_empty() || self.boo_labels.is_empty() {
            return Err("scene cue label sets must be non-empty".into());
        }
        if !(0.0..=1.0).contains(&self.cheer_threshold)
            || !(0.0..=1.0).contains(&self.boo_threshold)
        {
            return Err("scene cue thresholds must lie in [0,1]".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SceneCueConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_labels_rejected() {
        let cfg = SceneCueConfig {
            boo_labels: vec![],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
