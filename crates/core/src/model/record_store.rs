use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{ReviewEvent, ReviewStatus, Reviewable, ReviewableKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordStoreError {
    #[error("reviewable '{id}' not found")]
    NotFound { id: Uuid },
    #[error("reviewable '{id}' already exists")]
    DuplicateId { id: Uuid },
    #[error("reviewable '{id}' has status {actual:?}, expected {expected:?}")]
    StatusConflict {
        id: Uuid,
        expected: ReviewStatus,
        actual: ReviewStatus,
    },
    #[error("reviewable '{id}' is not a draft (status {status:?})")]
    NotDraft { id: Uuid, status: ReviewStatus },
    #[error("invalid record: {message}")]
    InvalidRecord { message: String },
}

/// Field effects of a status transition. Each variant fixes exactly which
/// fields change, so the store can hold the field-shape invariants (reason
/// iff rejected, decision fields iff decided, sync fields iff confirmed)
/// without knowing any business rules.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Submit {
        period_id: Uuid,
        at: DateTime<Utc>,
    },
    Approve {
        decided_by: Uuid,
        at: DateTime<Utc>,
        ledger_ref: String,
    },
    Reject {
        decided_by: Uuid,
        at: DateTime<Utc>,
        reason: String,
    },
    /// Rejected back to draft: clears the decision, the reason and the
    /// period association so a fresh submit re-derives the period.
    Reopen,
}

impl StatusChange {
    pub fn new_status(&self) -> ReviewStatus {
        match self {
            Self::Submit { .. } => ReviewStatus::Submitted,
            Self::Approve { .. } => ReviewStatus::Approved,
            Self::Reject { .. } => ReviewStatus::Rejected,
            Self::Reopen => ReviewStatus::Draft,
        }
    }

    pub fn apply(&self, record: &mut Reviewable) {
        record.status = self.new_status();
        match self {
            Self::Submit { period_id, at } => {
                record.period_id = Some(*period_id);
                record.submitted_at = Some(*at);
            }
            Self::Approve {
                decided_by,
                at,
                ledger_ref,
            } => {
                record.decided_by = Some(*decided_by);
                record.decided_at = Some(*at);
                record.synced_to_ledger = true;
                record.ledger_ref = Some(ledger_ref.clone());
            }
            Self::Reject {
                decided_by,
                at,
                reason,
            } => {
                record.decided_by = Some(*decided_by);
                record.decided_at = Some(*at);
                record.rejection_reason = Some(reason.clone());
            }
            Self::Reopen => {
                record.rejection_reason = None;
                record.decided_by = None;
                record.decided_at = None;
                record.submitted_at = None;
                record.period_id = None;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub status: Option<ReviewStatus>,
    pub author_id: Option<Uuid>,
    pub period_id: Option<Uuid>,
}

impl RecordFilter {
    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn with_period(mut self, period_id: Uuid) -> Self {
        self.period_id = Some(period_id);
        self
    }

    pub fn matches(&self, record: &Reviewable) -> bool {
        self.status.map_or(true, |status| record.status == status)
            && self.author_id.map_or(true, |author| record.author_id == author)
            && self.period_id.map_or(true, |period| record.period_id == Some(period))
    }
}

/// Durable storage seam for reviewables. The store is the single source of
/// truth and the only shared mutable state; `compare_and_transition` is the
/// atomic primitive that makes concurrent decisions race-safe.
pub trait RecordStore: Send + Sync {
    fn insert(&self, reviewable: Reviewable) -> Result<(), RecordStoreError>;

    fn get(&self, id: &Uuid) -> Result<Reviewable, RecordStoreError>;

    /// Replace the payload of a draft. Workflow fields are untouchable here;
    /// non-draft records refuse payload edits.
    fn update_draft(&self, id: &Uuid, kind: ReviewableKind) -> Result<Reviewable, RecordStoreError>;

    fn delete(&self, id: &Uuid) -> Result<(), RecordStoreError>;

    /// Matching records in creation order (`created_at`, then id).
    fn list(&self, filter: &RecordFilter) -> Result<Vec<Reviewable>, RecordStoreError>;

    /// Compare-and-swap: apply `change` only if the current status equals
    /// `expected`, atomically with respect to every other store call.
    /// Returns the updated record, or `StatusConflict` with the status the
    /// losing caller actually observed.
    fn compare_and_transition(
        &self,
        id: &Uuid,
        expected: ReviewStatus,
        change: StatusChange,
    ) -> Result<Reviewable, RecordStoreError>;

    fn append_event(&self, event: ReviewEvent) -> Result<(), RecordStoreError>;

    fn events(&self, id: &Uuid) -> Result<Vec<ReviewEvent>, RecordStoreError>;
}
