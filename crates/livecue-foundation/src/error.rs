use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Unsupported channel layout: {channels} channels")]
    UnsupportedChannelLayout { channels: u16 },

    #[error("Sample rate {rate} Hz out of usable range")]
    SampleRateOutOfRange { rate: u32 },
}

/// Errors surfaced by external classifier collaborators.
///
/// A failed inference is isolated per-window: callers treat it as a
/// zero-probability result and keep their buffers intact.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier model unavailable")]
    ModelUnavailable,

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Unexpected input length: expected {expected}, got {got}")]
    InputLength { expected: usize, got: usize },
}
