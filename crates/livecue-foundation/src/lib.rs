pub mod error;
pub mod state;

pub use error::{AppError, AudioError, ClassifierError};
pub use state::{PipelineState, StateManager};
