use thiserror::Error;
use uuid::Uuid;

use crate::model::Reviewable;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerSyncError {
    #[error("ledger rejected reviewable '{id}': {message}")]
    PushRejected { id: Uuid, message: String },
    #[error("ledger unavailable: {message}")]
    Unavailable { message: String },
}

/// Confirmation returned by the external ledger; `reference` is the
/// downstream identifier of the created entry and is stored on the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub reference: String,
}

/// External system of record for approved entries, consumed by the engine.
///
/// The engine never marks a record approved before `push` returns `Ok`,
/// and it skips the push on retries of an already-confirmed record.
/// Implementations must additionally be idempotent per reviewable id:
/// a repeated push for an id the ledger already holds must succeed without
/// creating a second downstream entry.
pub trait LedgerSync: Send + Sync {
    fn push(&self, reviewable: &Reviewable) -> Result<LedgerReceipt, LedgerSyncError>;
}
