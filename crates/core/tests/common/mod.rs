#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use clockwise_core::model::{Actor, Period, ReviewEvent, ReviewableKind, Role};
use clockwise_core::{
    DraftInput, InMemoryRecordStore, LedgerReceipt, LedgerSync, LedgerSyncError,
    NotificationEmitter, NotifyError, PeriodRegistry, WorkflowEngine,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn june() -> Period {
    Period::new("2024-06", date(2024, 6, 1), date(2024, 6, 30))
}

pub fn july() -> Period {
    Period::new("2024-07", date(2024, 7, 1), date(2024, 7, 31))
}

pub fn employee() -> Actor {
    Actor::new(Uuid::now_v7(), Role::Employee)
}

pub fn reviewer() -> Actor {
    Actor::new(Uuid::now_v7(), Role::Reviewer)
}

pub fn admin() -> Actor {
    Actor::new(Uuid::now_v7(), Role::Admin)
}

pub fn hours_on(date: NaiveDate, hours: f64) -> ReviewableKind {
    hours_on_task(date, hours, Uuid::now_v7())
}

pub fn hours_on_task(date: NaiveDate, hours: f64, task_id: Uuid) -> ReviewableKind {
    ReviewableKind::TimeEntry {
        date,
        hours,
        task_id,
        project_id: None,
        note: None,
    }
}

pub fn vacation(start: NaiveDate, end: NaiveDate, hours: f64) -> ReviewableKind {
    ReviewableKind::VacationRequest {
        start_date: start,
        end_date: end,
        hours,
        note: None,
    }
}

pub fn draft(kind: ReviewableKind) -> DraftInput {
    DraftInput { id: None, kind }
}

/// Ledger double: records every push attempt and can be scripted to fail
/// for specific reviewable ids until told to recover.
#[derive(Default)]
pub struct RecordingLedger {
    attempts: Mutex<Vec<Uuid>>,
    failing: Mutex<HashSet<Uuid>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, id: Uuid) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn recover(&self, id: &Uuid) {
        self.failing.lock().unwrap().remove(id);
    }

    pub fn attempts_for(&self, id: &Uuid) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|pushed| *pushed == id)
            .count()
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

impl LedgerSync for RecordingLedger {
    fn push(
        &self,
        reviewable: &clockwise_core::model::Reviewable,
    ) -> Result<LedgerReceipt, LedgerSyncError> {
        self.attempts.lock().unwrap().push(reviewable.id);
        if self.failing.lock().unwrap().contains(&reviewable.id) {
            return Err(LedgerSyncError::Unavailable {
                message: "ledger offline".to_string(),
            });
        }
        Ok(LedgerReceipt {
            reference: format!("ledger-{}", reviewable.id),
        })
    }
}

#[derive(Default)]
pub struct CapturingEmitter {
    events: Mutex<Vec<ReviewEvent>>,
    failing: Mutex<bool>,
}

impl CapturingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deliveries(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn events(&self) -> Vec<ReviewEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationEmitter for CapturingEmitter {
    fn notify(&self, event: &ReviewEvent) -> Result<(), NotifyError> {
        if *self.failing.lock().unwrap() {
            return Err(NotifyError::DeliveryFailed {
                message: "notification channel down".to_string(),
            });
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct Harness {
    pub engine: Arc<WorkflowEngine>,
    pub store: Arc<InMemoryRecordStore>,
    pub periods: Arc<PeriodRegistry>,
    pub ledger: Arc<RecordingLedger>,
    pub emitter: Arc<CapturingEmitter>,
}

pub fn harness(periods: Vec<Period>) -> Harness {
    let store = Arc::new(InMemoryRecordStore::new());
    let registry = Arc::new(PeriodRegistry::new(periods).expect("valid period config"));
    let ledger = Arc::new(RecordingLedger::new());
    let emitter = Arc::new(CapturingEmitter::new());
    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        registry.clone(),
        ledger.clone(),
        emitter.clone(),
    ));
    Harness {
        engine,
        store,
        periods: registry,
        ledger,
        emitter,
    }
}
