use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use livecue_audio::{BandEnergyConfig, PreprocessorConfig};
use livecue_foundation::AppError;
use livecue_scene::SceneCueConfig;
use livecue_whistle::WhistleConfig;

use crate::runtime::PipelineOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub level_update_interval: u64,
    pub worker_queue_depth: usize,
    pub reset_on_restart: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let defaults = PipelineOptions::default();
        Self {
            level_update_interval: defaults.level_update_interval,
            worker_queue_depth: defaults.worker_queue_depth,
            reset_on_restart: defaults.reset_on_restart,
        }
    }
}

/// Application settings: file plus `LIVECUE__`-prefixed environment
/// overrides, falling back to built-in defaults for anything omitted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub preprocessor: PreprocessorConfig,
    #[serde(default)]
    pub band: BandEnergyConfig,
    #[serde(default)]
    pub whistle: WhistleConfig,
    #[serde(default)]
    pub scene: SceneCueConfig,
}

impl Settings {
    /// Load settings from a specific config file path (for tests).
    pub fn from_path(config_path: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::load(Some(config_path.as_ref()))
    }

    pub fn new() -> Result<Self, AppError> {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            tracing::info!("Loading configuration from: {}", default_path.display());
            Self::load(Some(default_path))
        } else {
            tracing::debug!("No config/default.toml, using defaults and environment");
            Self::load(None)
        }
    }

    fn load(config_path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Environment overrides the file, e.g. LIVECUE_WHISTLE__COOLDOWN_SECS=10
        builder = builder.add_source(
            Environment::with_prefix("LIVECUE")
                .separator("__")
                .list_separator(" "),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build config: {}", e)))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to deserialize settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.options().validate()
    }

    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            preprocessor: self.preprocessor,
            band: self.band,
            whistle: self.whistle.clone(),
            scene: self.scene.clone(),
            level_update_interval: self.pipeline.level_update_interval,
            worker_queue_depth: self.pipeline.worker_queue_depth,
            reset_on_restart: self.pipeline.reset_on_restart,
        }
    }
}
