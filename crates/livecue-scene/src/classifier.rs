use livecue_foundation::ClassifierError;

/// One (label, score) pair from the multi-label classifier, score in [0,1].
#[derive(Debug, Clone)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Boundary to the external multi-label acoustic scene model.
///
/// `classify` receives exactly one complete fixed-length window at the
/// model's native rate and returns its top-K scored labels, best first.
pub trait SceneClassifier: Send {
    fn classify(&mut self, window: &[f32], top_k: usize)
        -> Result<Vec<LabelScore>, ClassifierError>;
}

/// Stand-in for a missing model: every window fails, so no cue ever fires.
pub struct NullSceneClassifier;

impl SceneClassifier for NullSceneClassifier {
    fn classify(
        &mut self,
        _window: &[f32],
        _top_k: usize,
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        Err(ClassifierError::ModelUnavailable)
    }
}

impl<F> SceneClassifier for F
where
    F: FnMut(&[f32], usize) -> Result<Vec<LabelScore>, ClassifierError> + Send,
{
    fn classify(
        &mut self,
        window: &[f32],
        top_k: usize,
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        self(window, top_k)
    }
}
