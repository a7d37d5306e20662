use crate::error::AppError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Initializing,
    Running,
    Paused,
    Stopping,
    Stopped,
}

/// Tracks the pipeline lifecycle and validates transitions.
///
/// Clones share the same underlying state, so producer and consumer
/// halves of the pipeline observe one lifecycle. Consumers subscribe to
/// a channel of state changes rather than polling.
#[derive(Clone)]
pub struct StateManager {
    state: Arc<RwLock<PipelineState>>,
    state_tx: Sender<PipelineState>,
    state_rx: Receiver<PipelineState>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    pub fn new() -> Self {
        let (state_tx, state_rx) = crossbeam_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(PipelineState::Initializing)),
            state_tx,
            state_rx,
        }
    }

    pub fn transition(&self, new_state: PipelineState) -> Result<(), AppError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (PipelineState::Initializing, PipelineState::Running)
                | (PipelineState::Running, PipelineState::Paused)
                | (PipelineState::Paused, PipelineState::Running)
                | (PipelineState::Running, PipelineState::Stopping)
                | (PipelineState::Paused, PipelineState::Stopping)
                | (PipelineState::Stopping, PipelineState::Stopped)
        );

        if !valid {
            return Err(AppError::Fatal(format!(
                "Invalid state transition: {:?} -> {:?}",
                *current, new_state
            )));
        }

        tracing::info!("Pipeline state: {:?} -> {:?}", *current, new_state);
        *current = new_state.clone();
        let _ = self.state_tx.send(new_state);
        Ok(())
    }

    pub fn current(&self) -> PipelineState {
        self.state.read().clone()
    }

    pub fn subscribe(&self) -> Receiver<PipelineState> {
        self.state_rx.clone()
    }
}
