use livecue_foundation::ClassifierError;

/// Raw two-class output of the whistle model.
#[derive(Debug, Clone, Copy)]
pub struct WhistleLogits {
    pub non_whistle: f32,
    pub whistle: f32,
}

impl WhistleLogits {
    /// Two-class softmax probability of the whistle label, computed with
    /// the usual max-subtraction for numerical stability.
    pub fn whistle_probability(&self) -> f32 {
        let max = self.non_whistle.max(self.whistle);
        let e0 = (self.non_whistle - max).exp();
        let e1 = (self.whistle - max).exp();
        e1 / (e0 + e1)
    }
}

/// Boundary to the external whistle model.
///
/// Implementations receive a fixed-length, z-score-normalized window at the
/// model's training rate. Inference failures are isolated per window by the
/// detector.
pub trait WhistleClassifier: Send {
    fn classify(&mut self, window: &[f32]) -> Result<WhistleLogits, ClassifierError>;
}

/// Stand-in used when the model cannot be loaded: every window fails
/// classification, so the detector never confirms.
pub struct NullWhistleClassifier;

impl WhistleClassifier for NullWhistleClassifier {
    fn classify(&mut self, _window: &[f32]) -> Result<WhistleLogits, ClassifierError> {
        Err(ClassifierError::ModelUnavailable)
    }
}

impl<F> WhistleClassifier for F
where
    F: FnMut(&[f32]) -> Result<WhistleLogits, ClassifierError> + Send,
{
    fn classify(&mut self, window: &[f32]) -> Result<WhistleLogits, ClassifierError> {
        self(window)
    }
}
