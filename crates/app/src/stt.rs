use livecue_audio::AudioFrame;

/// Boundary to the transcription engine.
///
/// The engine has an independent lifecycle; the pipeline only pushes
/// cleaned mono frames into it. Implementations copy out whatever they
/// need during the call.
pub trait TranscriptionSink: Send {
    fn feed(&mut self, frame: &AudioFrame);
}

/// Used when transcription is disabled or the engine failed to start.
pub struct NullTranscriptionSink;

impl TranscriptionSink for NullTranscriptionSink {
    fn feed(&mut self, _frame: &AudioFrame) {}
}

impl<F> TranscriptionSink for F
where
    F: FnMut(&AudioFrame) + Send,
{
    fn feed(&mut self, frame: &AudioFrame) {
        self(frame)
    }
}
