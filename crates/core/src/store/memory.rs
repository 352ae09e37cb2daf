use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::model::record_store::{RecordFilter, RecordStore, RecordStoreError, StatusChange};
use crate::model::{ReviewEvent, ReviewStatus, Reviewable, ReviewableKind};
use crate::validation;

#[derive(Default)]
struct StoreInner {
    records: HashMap<Uuid, Reviewable>,
    events: Vec<ReviewEvent>,
}

/// Reference record store: one coarse lock over the record map and the
/// event log. `compare_and_transition` performs its read-check-write under
/// that lock, which is the entire concurrency story — two racing decisions
/// on the same id serialize here and exactly one observes the expected
/// status.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("record store lock poisoned")
    }

    fn validate_shape(kind: &ReviewableKind) -> Result<(), RecordStoreError> {
        validation::validate_kind(kind).map_err(|err| RecordStoreError::InvalidRecord {
            message: err.to_string(),
        })
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, reviewable: Reviewable) -> Result<(), RecordStoreError> {
        Self::validate_shape(&reviewable.kind)?;
        let mut inner = self.lock();
        if inner.records.contains_key(&reviewable.id) {
            return Err(RecordStoreError::DuplicateId { id: reviewable.id });
        }
        inner.records.insert(reviewable.id, reviewable);
        Ok(())
    }

    fn get(&self, id: &Uuid) -> Result<Reviewable, RecordStoreError> {
        self.lock()
            .records
            .get(id)
            .cloned()
            .ok_or(RecordStoreError::NotFound { id: *id })
    }

    fn update_draft(&self, id: &Uuid, kind: ReviewableKind) -> Result<Reviewable, RecordStoreError> {
        Self::validate_shape(&kind)?;
        let mut inner = self.lock();
        let record = inner
            .records
            .get_mut(id)
            .ok_or(RecordStoreError::NotFound { id: *id })?;
        if record.status != ReviewStatus::Draft {
            return Err(RecordStoreError::NotDraft {
                id: *id,
                status: record.status,
            });
        }
        record.kind = kind;
        Ok(record.clone())
    }

    fn delete(&self, id: &Uuid) -> Result<(), RecordStoreError> {
        let mut inner = self.lock();
        inner
            .records
            .remove(id)
            .map(|_| ())
            .ok_or(RecordStoreError::NotFound { id: *id })
    }

    fn list(&self, filter: &RecordFilter) -> Result<Vec<Reviewable>, RecordStoreError> {
        let inner = self.lock();
        let mut matching: Vec<Reviewable> = inner
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    fn compare_and_transition(
        &self,
        id: &Uuid,
        expected: ReviewStatus,
        change: StatusChange,
    ) -> Result<Reviewable, RecordStoreError> {
        let mut inner = self.lock();
        let record = inner
            .records
            .get_mut(id)
            .ok_or(RecordStoreError::NotFound { id: *id })?;
        if record.status != expected {
            return Err(RecordStoreError::StatusConflict {
                id: *id,
                expected,
                actual: record.status,
            });
        }
        change.apply(record);
        Ok(record.clone())
    }

    fn append_event(&self, event: ReviewEvent) -> Result<(), RecordStoreError> {
        self.lock().events.push(event);
        Ok(())
    }

    fn events(&self, id: &Uuid) -> Result<Vec<ReviewEvent>, RecordStoreError> {
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|event| event.reviewable_id == *id)
            .cloned()
            .collect())
    }
}
