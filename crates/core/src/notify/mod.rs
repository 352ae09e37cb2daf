use thiserror::Error;

use crate::model::ReviewEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification delivery failed: {message}")]
    DeliveryFailed { message: String },
}

/// External collaborator informed of every state transition. Fire and
/// forget from the engine's perspective: a delivery failure is logged and
/// never blocks or rolls back the transition that triggered it.
pub trait NotificationEmitter: Send + Sync {
    fn notify(&self, event: &ReviewEvent) -> Result<(), NotifyError>;
}
