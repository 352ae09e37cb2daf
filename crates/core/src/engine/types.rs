use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::model::{Reviewable, ReviewableKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approve,
    Reject,
}

/// Draft payload as authored. With an id the call edits that draft; without
/// one the engine creates a draft, collapsing a same-day duplicate of the
/// same task into an update instead of a second record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub kind: ReviewableKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSaved {
    pub reviewable: Reviewable,
    /// True when an existing draft was updated rather than created.
    pub updated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub id: Uuid,
    pub error: WorkflowError,
}

/// Per-record outcome of a bulk decision. Partial success is explicit:
/// records committed before a failure stay committed, and each failed id
/// carries the error a caller needs to decide whether to retry it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failure_for(&self, id: &Uuid) -> Option<&WorkflowError> {
        self.failed
            .iter()
            .find(|failure| failure.id == *id)
            .map(|failure| &failure.error)
    }
}
