pub mod classifier;
pub mod config;
pub mod detector;
pub mod enhance;

pub use classifier::{NullWhistleClassifier, WhistleClassifier, WhistleLogits};
pub use config::{EnhanceConfig, WhistleConfig};
pub use detector::{RejectReason, WhistleDetector, WhistleOutcome, WhistleSnapshot};
