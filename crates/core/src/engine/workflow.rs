use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::grouping::group_by_author;
use crate::engine::types::{BatchFailure, BatchResult, DecisionOutcome, DraftInput, DraftSaved};
use crate::error::{Result, WorkflowError};
use crate::model::record_store::{RecordFilter, RecordStore, RecordStoreError, StatusChange};
use crate::model::{
    Actor, EntryTotals, ReviewEvent, ReviewGroup, ReviewStatus, Reviewable, ReviewableKind,
};
use crate::notify::NotificationEmitter;
use crate::periods::PeriodRegistry;
use crate::sync::LedgerSync;
use crate::validation;

enum PreparedOutcome {
    Approve,
    Reject(String),
}

/// The approval state machine: draft → submitted → approved/rejected, with
/// the rejected → draft resubmission path. All coordination goes through
/// the record store's compare-and-transition; the engine itself holds no
/// mutable state.
pub struct WorkflowEngine {
    store: Arc<dyn RecordStore>,
    periods: Arc<PeriodRegistry>,
    ledger: Arc<dyn LedgerSync>,
    notifier: Arc<dyn NotificationEmitter>,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        periods: Arc<PeriodRegistry>,
        ledger: Arc<dyn LedgerSync>,
        notifier: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            store,
            periods,
            ledger,
            notifier,
        }
    }

    /// Creates or updates a draft. Only the author edits drafts; an edit of
    /// an existing record requires it to still be a draft. A new time entry
    /// for the same day and task as an existing draft updates that draft.
    pub fn save_draft(
        &self,
        input: DraftInput,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<DraftSaved> {
        validation::validate_kind(&input.kind)?;

        let target = match input.id {
            Some(id) => Some(self.fetch(&id)?),
            None => self.find_duplicate_draft(actor.id, &input.kind)?,
        };

        if let Some(existing) = target {
            if existing.author_id != actor.id {
                return Err(WorkflowError::InvalidActor {
                    actor_id: actor.id,
                    action: "edit this draft",
                });
            }
            if existing.status != ReviewStatus::Draft {
                return Err(WorkflowError::InvalidState {
                    id: existing.id,
                    expected: ReviewStatus::Draft,
                    actual: existing.status,
                });
            }
            let reviewable = self.store.update_draft(&existing.id, input.kind)?;
            debug!(id = %reviewable.id, author = %actor.id, "draft updated");
            return Ok(DraftSaved {
                reviewable,
                updated: true,
            });
        }

        let reviewable = Reviewable::new(actor.id, input.kind, now);
        self.store.insert(reviewable.clone())?;
        info!(
            id = %reviewable.id,
            author = %actor.id,
            kind = reviewable.kind.label(),
            hours = reviewable.magnitude(),
            "draft saved"
        );
        Ok(DraftSaved {
            reviewable,
            updated: false,
        })
    }

    /// Deletion is permitted only while the record is a draft, and only by
    /// its author.
    pub fn delete_draft(&self, id: &Uuid, actor: &Actor) -> Result<()> {
        let record = self.fetch(id)?;
        if record.author_id != actor.id {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "delete this draft",
            });
        }
        if record.status != ReviewStatus::Draft {
            return Err(WorkflowError::InvalidState {
                id: *id,
                expected: ReviewStatus::Draft,
                actual: record.status,
            });
        }
        self.store.delete(id)?;
        info!(id = %id, author = %actor.id, "draft deleted");
        Ok(())
    }

    /// Author hands a draft over for review. The owning period is derived
    /// from the record's effective date here, once, and stays fixed for the
    /// whole review.
    pub fn submit(&self, id: &Uuid, actor: &Actor, now: DateTime<Utc>) -> Result<Reviewable> {
        let record = self.fetch(id)?;
        if record.author_id != actor.id {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "submit this reviewable",
            });
        }
        if record.status != ReviewStatus::Draft {
            return Err(WorkflowError::InvalidState {
                id: *id,
                expected: ReviewStatus::Draft,
                actual: record.status,
            });
        }

        let period_id = self.periods.resolve_period(record.effective_date())?;
        if !self.periods.is_open(&period_id, now)? {
            return Err(WorkflowError::PeriodClosed { period_id });
        }

        let updated = self
            .store
            .compare_and_transition(id, ReviewStatus::Draft, StatusChange::Submit { period_id, at: now })
            .map_err(|err| Self::map_conflict(err, ReviewStatus::Draft))?;

        self.record_transition(ReviewStatus::Draft, &updated, actor.id, None, now);
        info!(
            id = %id,
            author = %actor.id,
            period = %period_id,
            "reviewable submitted for review"
        );
        Ok(updated)
    }

    /// Bulk decision over potentially many authors' records. The batch
    /// never aborts because one record is stale: every id gets its own
    /// outcome, and ids that are no longer submitted come back as
    /// `AlreadyDecided` so retried calls are harmless.
    pub fn decide(
        &self,
        ids: &[Uuid],
        actor: &Actor,
        outcome: DecisionOutcome,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BatchResult> {
        if !actor.can_review() {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "review submissions",
            });
        }

        let prepared = match outcome {
            DecisionOutcome::Approve => PreparedOutcome::Approve,
            DecisionOutcome::Reject => {
                let reason = reason.unwrap_or_default().trim();
                validation::validate_rejection_reason(reason)
                    .map_err(|_| WorkflowError::MissingReason)?;
                PreparedOutcome::Reject(reason.to_string())
            }
        };

        info!(
            count = ids.len(),
            reviewer = %actor.id,
            outcome = ?outcome,
            "review batch started"
        );

        let mut result = BatchResult::default();
        for id in ids {
            match self.decide_one(id, actor, &prepared, now) {
                Ok(()) => result.succeeded.push(*id),
                Err(error) => {
                    debug!(id = %id, %error, "record excluded from review batch");
                    result.failed.push(BatchFailure { id: *id, error });
                }
            }
        }

        info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            reviewer = %actor.id,
            "review batch finished"
        );
        Ok(result)
    }

    /// With a store whose Approve transition writes status and sync fields
    /// atomically, a retried approval is rejected as `AlreadyDecided` before
    /// the sync check matters; the `synced_to_ledger` skip-push branch
    /// guards stores that persist the ledger confirmation separately from
    /// the status.
    fn decide_one(
        &self,
        id: &Uuid,
        actor: &Actor,
        outcome: &PreparedOutcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let record = self.fetch(id)?;
        match record.status {
            ReviewStatus::Submitted => {}
            ReviewStatus::Approved | ReviewStatus::Rejected => {
                return Err(WorkflowError::AlreadyDecided {
                    id: *id,
                    status: record.status,
                });
            }
            ReviewStatus::Draft => {
                return Err(WorkflowError::InvalidState {
                    id: *id,
                    expected: ReviewStatus::Submitted,
                    actual: ReviewStatus::Draft,
                });
            }
        }

        let Some(period_id) = record.period_id else {
            return Err(WorkflowError::Store(RecordStoreError::InvalidRecord {
                message: format!("submitted reviewable '{id}' has no period"),
            }));
        };
        // Openness is checked at decision time, not submission time: a
        // period closing mid-review blocks the decision, not the submission.
        if !self.periods.is_open(&period_id, now)? {
            return Err(WorkflowError::PeriodClosed { period_id });
        }

        let (change, reason) = match outcome {
            PreparedOutcome::Approve => {
                let ledger_ref = if record.synced_to_ledger {
                    // Confirmed on an earlier attempt; never push twice.
                    record.ledger_ref.clone().unwrap_or_default()
                } else {
                    let receipt = self.ledger.push(&record).map_err(|error| {
                        warn!(id = %id, %error, "ledger push failed, record stays submitted");
                        WorkflowError::SyncFailed {
                            id: *id,
                            message: error.to_string(),
                        }
                    })?;
                    receipt.reference
                };
                (
                    StatusChange::Approve {
                        decided_by: actor.id,
                        at: now,
                        ledger_ref,
                    },
                    None,
                )
            }
            PreparedOutcome::Reject(reason) => (
                StatusChange::Reject {
                    decided_by: actor.id,
                    at: now,
                    reason: reason.clone(),
                },
                Some(reason.clone()),
            ),
        };

        let updated = self
            .store
            .compare_and_transition(id, ReviewStatus::Submitted, change)
            .map_err(|err| Self::map_conflict(err, ReviewStatus::Submitted))?;

        self.record_transition(ReviewStatus::Submitted, &updated, actor.id, reason, now);
        Ok(())
    }

    /// Author takes a rejected record back into draft. Decision fields and
    /// the period association are cleared; the rejection reason lives on in
    /// the event history only.
    pub fn resubmit(&self, id: &Uuid, actor: &Actor, now: DateTime<Utc>) -> Result<Reviewable> {
        let record = self.fetch(id)?;
        if record.author_id != actor.id {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "resubmit this reviewable",
            });
        }
        if record.status != ReviewStatus::Rejected {
            return Err(WorkflowError::InvalidState {
                id: *id,
                expected: ReviewStatus::Rejected,
                actual: record.status,
            });
        }

        let updated = self
            .store
            .compare_and_transition(id, ReviewStatus::Rejected, StatusChange::Reopen)
            .map_err(|err| Self::map_conflict(err, ReviewStatus::Rejected))?;

        self.record_transition(ReviewStatus::Rejected, &updated, actor.id, None, now);
        info!(id = %id, author = %actor.id, "rejected reviewable reopened for revision");
        Ok(updated)
    }

    /// Everything awaiting review in one period, grouped per author with
    /// summed magnitudes, in deterministic order.
    pub fn pending_groups(&self, period_id: &Uuid, actor: &Actor) -> Result<Vec<ReviewGroup>> {
        if !actor.can_review() {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "review submissions",
            });
        }
        self.periods.period(period_id)?;
        let submitted = self.store.list(
            &RecordFilter::default()
                .with_status(ReviewStatus::Submitted)
                .with_period(*period_id),
        )?;
        Ok(group_by_author(*period_id, submitted))
    }

    pub fn drafts(&self, author_id: &Uuid, actor: &Actor) -> Result<EntryTotals> {
        self.entries_with_status(author_id, actor, ReviewStatus::Draft, "list drafts")
    }

    pub fn submitted(&self, author_id: &Uuid, actor: &Actor) -> Result<EntryTotals> {
        self.entries_with_status(author_id, actor, ReviewStatus::Submitted, "list submissions")
    }

    /// Records the author still needs to revise.
    pub fn rejected(&self, author_id: &Uuid, actor: &Actor) -> Result<EntryTotals> {
        self.entries_with_status(author_id, actor, ReviewStatus::Rejected, "list rejections")
    }

    pub fn history(&self, id: &Uuid) -> Result<Vec<ReviewEvent>> {
        self.store.events(id).map_err(Into::into)
    }

    pub fn close_period(&self, period_id: &Uuid, actor: &Actor) -> Result<()> {
        if !actor.is_admin() {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "close a period",
            });
        }
        self.periods.force_close(period_id)?;
        Ok(())
    }

    pub fn reopen_period(&self, period_id: &Uuid, actor: &Actor) -> Result<()> {
        if !actor.is_admin() {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action: "reopen a period",
            });
        }
        self.periods.reopen(period_id)?;
        Ok(())
    }

    fn entries_with_status(
        &self,
        author_id: &Uuid,
        actor: &Actor,
        status: ReviewStatus,
        action: &'static str,
    ) -> Result<EntryTotals> {
        if actor.id != *author_id && !actor.can_review() {
            return Err(WorkflowError::InvalidActor {
                actor_id: actor.id,
                action,
            });
        }
        let entries = self.store.list(
            &RecordFilter::default()
                .with_status(status)
                .with_author(*author_id),
        )?;
        Ok(EntryTotals::from_entries(entries))
    }

    fn find_duplicate_draft(
        &self,
        author_id: Uuid,
        kind: &ReviewableKind,
    ) -> Result<Option<Reviewable>> {
        let ReviewableKind::TimeEntry { date, task_id, .. } = kind else {
            return Ok(None);
        };
        let drafts = self.store.list(
            &RecordFilter::default()
                .with_status(ReviewStatus::Draft)
                .with_author(author_id),
        )?;
        Ok(drafts.into_iter().find(|draft| {
            matches!(
                &draft.kind,
                ReviewableKind::TimeEntry {
                    date: existing_date,
                    task_id: existing_task,
                    ..
                } if existing_date == date && existing_task == task_id
            )
        }))
    }

    fn fetch(&self, id: &Uuid) -> Result<Reviewable> {
        self.store.get(id).map_err(|err| match err {
            RecordStoreError::NotFound { id } => WorkflowError::NotFound { id },
            other => other.into(),
        })
    }

    fn map_conflict(err: RecordStoreError, expected: ReviewStatus) -> WorkflowError {
        match err {
            RecordStoreError::StatusConflict { id, actual, .. } if actual.is_decided() => {
                WorkflowError::AlreadyDecided { id, status: actual }
            }
            RecordStoreError::StatusConflict { id, actual, .. } => WorkflowError::InvalidState {
                id,
                expected,
                actual,
            },
            RecordStoreError::NotFound { id } => WorkflowError::NotFound { id },
            other => other.into(),
        }
    }

    fn record_transition(
        &self,
        old_status: ReviewStatus,
        record: &Reviewable,
        actor_id: Uuid,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) {
        let event = ReviewEvent {
            reviewable_id: record.id,
            old_status,
            new_status: record.status,
            actor_id,
            reason,
            at,
        };
        if let Err(error) = self.store.append_event(event.clone()) {
            warn!(id = %record.id, %error, "failed to append review event");
        }
        if let Err(error) = self.notifier.notify(&event) {
            warn!(id = %record.id, %error, "notification delivery failed");
        }
    }
}
