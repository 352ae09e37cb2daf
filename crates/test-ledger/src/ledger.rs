use std::collections::HashSet;
use std::sync::Mutex;

use uuid::Uuid;

use clockwise_core::model::Reviewable;
use clockwise_core::{LedgerReceipt, LedgerSync, LedgerSyncError};

/// Ledger double for harness runs: records every push attempt and fails
/// the ids it was scripted to fail, until told to recover. References are
/// stable per id, matching the idempotence the real adapter promises.
#[derive(Default)]
pub struct ScriptedLedger {
    attempts: Mutex<Vec<Uuid>>,
    failing: Mutex<HashSet<Uuid>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, id: Uuid) {
        self.failing.lock().expect("ledger lock poisoned").insert(id);
    }

    pub fn recover(&self, id: &Uuid) {
        self.failing.lock().expect("ledger lock poisoned").remove(id);
    }

    /// Number of push attempts seen for `id`, successful or not.
    pub fn attempts_for(&self, id: &Uuid) -> usize {
        self.attempts
            .lock()
            .expect("ledger lock poisoned")
            .iter()
            .filter(|attempted| *attempted == id)
            .count()
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.lock().expect("ledger lock poisoned").len()
    }
}

impl LedgerSync for ScriptedLedger {
    fn push(&self, reviewable: &Reviewable) -> Result<LedgerReceipt, LedgerSyncError> {
        self.attempts
            .lock()
            .expect("ledger lock poisoned")
            .push(reviewable.id);
        if self
            .failing
            .lock()
            .expect("ledger lock poisoned")
            .contains(&reviewable.id)
        {
            return Err(LedgerSyncError::Unavailable {
                message: "scripted outage".to_string(),
            });
        }
        Ok(LedgerReceipt {
            reference: format!("ledger-{}", reviewable.id),
        })
    }
}
