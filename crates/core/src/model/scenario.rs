use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::DecisionOutcome;
use crate::error::WorkflowError;
use crate::model::{ReviewStatus, Role};

// ============================================================================
// Scenario definition
// ============================================================================

/// A workflow scenario for the CLI harness: periods and actors to set up,
/// drafts to seed, steps to drive through the engine, and the record state
/// expected afterwards. Everything is referenced by human-readable name;
/// the executor assigns the ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowScenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Clock for steps without an explicit `at`. Defaults to noon on the
    /// first period's start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    pub periods: Vec<PeriodDef>,
    pub actors: Vec<ActorDef>,
    #[serde(default)]
    pub records: Vec<RecordDef>,
    #[serde(default)]
    pub ledger: LedgerConfig,
    pub steps: Vec<Step>,
    pub expected: ExpectedState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodDef {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub force_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActorDef {
    pub name: String,
    pub role: Role,
}

/// A reviewable seeded as a draft before the steps run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordDef {
    pub name: String,
    pub author: String,
    #[serde(flatten)]
    pub payload: RecordPayload,
}

/// Scenario-side payload shape; task/project references are names, mapped
/// to stable ids by the executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordPayload {
    TimeEntry {
        date: NaiveDate,
        hours: f64,
        #[serde(default)]
        task: Option<String>,
        #[serde(default)]
        note: Option<String>,
    },
    VacationRequest {
        start_date: NaiveDate,
        end_date: NaiveDate,
        hours: f64,
        #[serde(default)]
        note: Option<String>,
    },
}

/// Scripted behavior of the external ledger double.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerConfig {
    /// Record names whose push is scripted to fail.
    #[serde(default)]
    pub fail: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Submit {
        record: String,
        actor: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
        #[serde(default)]
        expect: StepExpect,
    },
    Decide {
        records: Vec<String>,
        actor: String,
        outcome: DecisionOutcome,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
        #[serde(default)]
        expect: StepExpect,
    },
    Resubmit {
        record: String,
        actor: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
        #[serde(default)]
        expect: StepExpect,
    },
    EditDraft {
        record: String,
        actor: String,
        hours: f64,
        #[serde(default)]
        expect: StepExpect,
    },
    DeleteDraft {
        record: String,
        actor: String,
        #[serde(default)]
        expect: StepExpect,
    },
    ClosePeriod {
        period: String,
        actor: String,
        #[serde(default)]
        expect: StepExpect,
    },
    ReopenPeriod {
        period: String,
        actor: String,
        #[serde(default)]
        expect: StepExpect,
    },
}

impl Step {
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::Decide { .. } => "decide",
            Self::Resubmit { .. } => "resubmit",
            Self::EditDraft { .. } => "edit_draft",
            Self::DeleteDraft { .. } => "delete_draft",
            Self::ClosePeriod { .. } => "close_period",
            Self::ReopenPeriod { .. } => "reopen_period",
        }
    }

    pub fn actor_name(&self) -> &str {
        match self {
            Self::Submit { actor, .. }
            | Self::Decide { actor, .. }
            | Self::Resubmit { actor, .. }
            | Self::EditDraft { actor, .. }
            | Self::DeleteDraft { actor, .. }
            | Self::ClosePeriod { actor, .. }
            | Self::ReopenPeriod { actor, .. } => actor,
        }
    }
}

/// Expected outcome of one step. With no `error`, the call must succeed;
/// `succeeded`/`failed` additionally pin the per-record outcomes of a
/// decide batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepExpect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeded: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedExpect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedExpect {
    pub record: String,
    pub error: StepOutcome,
}

/// Error kinds a scenario can assert on, one per `WorkflowError` variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    NotFound,
    InvalidActor,
    InvalidState,
    PeriodClosed,
    MissingReason,
    NoPeriodConfigured,
    UnknownPeriod,
    SyncFailed,
    AlreadyDecided,
    Validation,
    Store,
}

impl From<&WorkflowError> for StepOutcome {
    fn from(error: &WorkflowError) -> Self {
        match error {
            WorkflowError::NotFound { .. } => Self::NotFound,
            WorkflowError::InvalidActor { .. } => Self::InvalidActor,
            WorkflowError::InvalidState { .. } => Self::InvalidState,
            WorkflowError::PeriodClosed { .. } => Self::PeriodClosed,
            WorkflowError::MissingReason => Self::MissingReason,
            WorkflowError::NoPeriodConfigured { .. } => Self::NoPeriodConfigured,
            WorkflowError::UnknownPeriod { .. } => Self::UnknownPeriod,
            WorkflowError::SyncFailed { .. } => Self::SyncFailed,
            WorkflowError::AlreadyDecided { .. } => Self::AlreadyDecided,
            WorkflowError::Validation(_) => Self::Validation,
            WorkflowError::Store(_) => Self::Store,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpectedState {
    #[serde(default)]
    pub records: Vec<ExpectedRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedRecord {
    pub record: String,
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<bool>,
    /// Whether the record should currently carry a period association.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_period: Option<bool>,
}

impl WorkflowScenario {
    /// Structural validation before execution: every name a step or
    /// expectation references must be declared, and a rejection step must
    /// either carry a reason or expect the missing-reason error.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("scenario name must not be empty");
        }

        let mut period_codes = HashSet::new();
        for period in &self.periods {
            if period.start_date > period.end_date {
                bail!(
                    "period '{}' starts {} after its end {}",
                    period.code,
                    period.start_date,
                    period.end_date
                );
            }
            if !period_codes.insert(period.code.as_str()) {
                bail!("duplicate period code '{}'", period.code);
            }
        }

        let mut actor_names = HashSet::new();
        for actor in &self.actors {
            if !actor_names.insert(actor.name.as_str()) {
                bail!("duplicate actor name '{}'", actor.name);
            }
        }

        let mut record_names = HashSet::new();
        for record in &self.records {
            if !record_names.insert(record.name.as_str()) {
                bail!("duplicate record name '{}'", record.name);
            }
            if !actor_names.contains(record.author.as_str()) {
                bail!(
                    "record '{}' references undeclared author '{}'",
                    record.name,
                    record.author
                );
            }
        }

        for name in &self.ledger.fail {
            if !record_names.contains(name.as_str()) {
                bail!("ledger.fail references unknown record '{name}'");
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            self.validate_step(step, &actor_names, &record_names, &period_codes)
                .with_context(|| format!("step {} ({})", index + 1, step.action_name()))?;
        }

        for expected in &self.expected.records {
            if !record_names.contains(expected.record.as_str()) {
                bail!(
                    "expected.records references unknown record '{}'",
                    expected.record
                );
            }
        }

        Ok(())
    }

    fn validate_step(
        &self,
        step: &Step,
        actors: &HashSet<&str>,
        records: &HashSet<&str>,
        periods: &HashSet<&str>,
    ) -> Result<()> {
        if !actors.contains(step.actor_name()) {
            bail!("undeclared actor '{}'", step.actor_name());
        }

        let check_record = |name: &str| -> Result<()> {
            if !records.contains(name) {
                bail!("unknown record '{name}'");
            }
            Ok(())
        };

        match step {
            Step::Submit { record, .. }
            | Step::Resubmit { record, .. }
            | Step::EditDraft { record, .. }
            | Step::DeleteDraft { record, .. } => check_record(record)?,
            Step::Decide {
                records: targets,
                outcome,
                reason,
                expect,
                ..
            } => {
                if targets.is_empty() {
                    bail!("decide step needs at least one record");
                }
                for name in targets {
                    check_record(name)?;
                }
                let expects_missing_reason = expect.error == Some(StepOutcome::MissingReason);
                if *outcome == DecisionOutcome::Reject
                    && reason.as_deref().map_or(true, |r| r.trim().is_empty())
                    && !expects_missing_reason
                {
                    bail!("reject step needs a reason (or expect the missing_reason error)");
                }
                if let Some(succeeded) = &expect.succeeded {
                    for name in succeeded {
                        check_record(name)?;
                    }
                }
                for failed in &expect.failed {
                    check_record(&failed.record)?;
                }
            }
            Step::ClosePeriod { period, .. } | Step::ReopenPeriod { period, .. } => {
                if !periods.contains(period.as_str()) {
                    bail!("unknown period '{period}'");
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Execution results
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Pass,
    Fail,
    Error,
}

/// A step whose observed outcome diverged from its expectation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepIssue {
    pub step: usize,
    pub action: String,
    pub message: String,
}

/// A final-state field that diverged from the expectation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMismatch {
    pub record: String,
    pub field: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub status: ScenarioStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_issues: Vec<StepIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub record_mismatches: Vec<RecordMismatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioResult {
    pub fn from_outcome(
        scenario_name: String,
        step_issues: Vec<StepIssue>,
        record_mismatches: Vec<RecordMismatch>,
    ) -> Self {
        let status = if step_issues.is_empty() && record_mismatches.is_empty() {
            ScenarioStatus::Pass
        } else {
            ScenarioStatus::Fail
        };
        Self {
            scenario_name,
            status,
            step_issues,
            record_mismatches,
            error: None,
        }
    }

    pub fn from_error(scenario_name: String, error: impl std::fmt::Display) -> Self {
        Self {
            scenario_name,
            status: ScenarioStatus::Error,
            step_issues: Vec::new(),
            record_mismatches: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn from_results(results: Vec<ScenarioResult>) -> Self {
        let mut suite = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in &results {
            match result.status {
                ScenarioStatus::Pass => suite.passed += 1,
                ScenarioStatus::Fail => suite.failed += 1,
                ScenarioStatus::Error => suite.errored += 1,
            }
        }
        suite.results = results;
        suite
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}
