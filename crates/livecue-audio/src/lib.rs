pub mod band_energy;
pub mod constants;
pub mod dsp;
pub mod frame;
pub mod preprocessor;
pub mod resampler;
pub mod spectral;
pub mod windower;

// Public API
pub use band_energy::{BandEnergyConfig, BandEnergyExtractor};
pub use frame::{AudioFrame, SampleLayout};
pub use preprocessor::{NoiseGateConfig, Preprocessor, PreprocessorConfig};
pub use resampler::resample_linear;
pub use spectral::SpectrumAnalyzer;
pub use windower::{FrameWindower, RetentionRing};
