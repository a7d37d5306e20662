//! Shared constants for the audio processing path

/// Default one-pole high-pass cutoff for speech preprocessing (Hz)
pub const DEFAULT_HP_CUTOFF_HZ: f64 = 90.0;

/// Bass band lower corner, chosen below speech fundamentals (Hz)
pub const BASS_LOW_CORNER_HZ: f64 = 30.0;

/// Bass band upper corner (Hz)
pub const BASS_HIGH_CORNER_HZ: f64 = 90.0;

/// Envelope smoothing corner for the bass meter (Hz)
pub const BASS_ENVELOPE_HZ: f64 = 6.0;

/// Exponential scale factor mapping bass energy into [0,1]
pub const BASS_SCALE_K: f32 = 10.0;
