pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod periods;
pub mod store;
pub mod sync;
pub mod validation;

pub use engine::{BatchFailure, BatchResult, DecisionOutcome, DraftInput, DraftSaved, WorkflowEngine};
pub use error::{Result, WorkflowError};
pub use model::record_store::{RecordFilter, RecordStore, RecordStoreError, StatusChange};
pub use notify::{NotificationEmitter, NotifyError};
pub use periods::{PeriodConfigError, PeriodError, PeriodRegistry};
pub use store::memory::InMemoryRecordStore;
pub use sync::{LedgerReceipt, LedgerSync, LedgerSyncError};
