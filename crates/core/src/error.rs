use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::model::record_store::RecordStoreError;
use crate::model::ReviewStatus;
use crate::periods::PeriodError;
use crate::validation::ValidationError;

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;

/// Error taxonomy for workflow operations. Batch operations report these
/// per record; `AlreadyDecided` is an idempotent no-op acknowledgment and
/// `SyncFailed` is retryable by re-issuing the same decision.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("reviewable '{id}' not found")]
    NotFound { id: Uuid },
    #[error("actor '{actor_id}' is not permitted to {action}")]
    InvalidActor { actor_id: Uuid, action: &'static str },
    #[error("reviewable '{id}' has status {actual:?}, expected {expected:?}")]
    InvalidState {
        id: Uuid,
        expected: ReviewStatus,
        actual: ReviewStatus,
    },
    #[error("period '{period_id}' is not open")]
    PeriodClosed { period_id: Uuid },
    #[error("rejection requires a non-empty reason")]
    MissingReason,
    #[error("no period configured for date {date}")]
    NoPeriodConfigured { date: NaiveDate },
    #[error("period '{period_id}' not found")]
    UnknownPeriod { period_id: Uuid },
    #[error("ledger sync failed for reviewable '{id}': {message}")]
    SyncFailed { id: Uuid, message: String },
    #[error("reviewable '{id}' was already decided ({status:?})")]
    AlreadyDecided { id: Uuid, status: ReviewStatus },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

impl From<PeriodError> for WorkflowError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::NoPeriodConfigured { date } => Self::NoPeriodConfigured { date },
            PeriodError::UnknownPeriod { id } => Self::UnknownPeriod { period_id: id },
        }
    }
}

impl WorkflowError {
    /// True for failures that a caller may retry verbatim and expect to
    /// eventually succeed (ledger outages). Permission and state errors
    /// require a different actor or a changed record instead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SyncFailed { .. })
    }
}
