pub mod actor;
pub mod history;
pub mod period;
pub mod record_store;
pub mod review_group;
pub mod reviewable;
pub mod scenario;

pub use actor::{Actor, Role};
pub use history::ReviewEvent;
pub use period::Period;
pub use record_store::{RecordFilter, RecordStore, RecordStoreError, StatusChange};
pub use review_group::{EntryTotals, ReviewGroup};
pub use reviewable::{ReviewStatus, Reviewable, ReviewableKind};
pub use scenario::{
    ActorDef, ExpectedRecord, ExpectedState, FailedExpect, LedgerConfig, PeriodDef, RecordDef,
    RecordMismatch, RecordPayload, ScenarioResult, ScenarioStatus, Step, StepExpect, StepIssue,
    StepOutcome, SuiteResult, WorkflowScenario,
};
