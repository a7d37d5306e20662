pub mod adapter;
pub mod classifier;
pub mod config;

pub use adapter::{SceneCue, SceneCueAdapter};
pub use classifier::{LabelScore, NullSceneClassifier, SceneClassifier};
pub use config::SceneCueConfig;
