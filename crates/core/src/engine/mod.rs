mod grouping;
mod types;
mod workflow;

pub use grouping::group_by_author;
pub use types::{BatchFailure, BatchResult, DecisionOutcome, DraftInput, DraftSaved};
pub use workflow::WorkflowEngine;
