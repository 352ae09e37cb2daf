use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;
use walkdir::WalkDir;

use clockwise_core::model::{
    Actor, Period, RecordPayload, RecordStoreError, Reviewable, ReviewableKind, ScenarioResult,
    Step, StepExpect, StepIssue, StepOutcome, WorkflowScenario,
};
use clockwise_core::{
    DraftInput, InMemoryRecordStore, PeriodRegistry, RecordStore, WorkflowEngine, WorkflowError,
};
use test_ledger::{CapturingEmitter, ScriptedLedger};

use super::comparator::compare_final_state;

/// Execute a single scenario against a fresh in-memory engine.
///
/// Setup problems (bad period config, invalid seeded drafts) surface as
/// `Err` and become an execution error; diverging step outcomes and final
/// state become a `Fail` result.
pub fn execute_scenario(scenario: &WorkflowScenario) -> Result<ScenarioResult> {
    let mut context = ExecutionContext::build(scenario)
        .with_context(|| format!("setting up scenario '{}'", scenario.name))?;

    let step_issues = context.run_steps(&scenario.steps)?;
    let actuals = context.final_records()?;
    let record_mismatches = compare_final_state(&scenario.expected, &actuals);

    Ok(ScenarioResult::from_outcome(
        scenario.name.clone(),
        step_issues,
        record_mismatches,
    ))
}

/// Find scenario files (`.yaml`/`.yml`) under a directory, sorted for a
/// stable suite order.
pub fn discover_scenarios(suite_path: &Path) -> Result<Vec<PathBuf>> {
    if !suite_path.is_dir() {
        anyhow::bail!("Suite directory not found: {}", suite_path.display());
    }

    let mut scenarios = Vec::new();
    for entry in WalkDir::new(suite_path) {
        let entry = entry.with_context(|| {
            format!("Failed to walk suite directory: {}", suite_path.display())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.path().extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => scenarios.push(entry.path().to_path_buf()),
            _ => {}
        }
    }
    scenarios.sort();
    Ok(scenarios)
}

struct ExecutionContext {
    engine: WorkflowEngine,
    store: Arc<InMemoryRecordStore>,
    actors: HashMap<String, Actor>,
    records: HashMap<String, Uuid>,
    record_names: HashMap<Uuid, String>,
    periods: HashMap<String, Uuid>,
    tasks: HashMap<String, Uuid>,
    clock: DateTime<Utc>,
}

impl ExecutionContext {
    fn build(scenario: &WorkflowScenario) -> Result<Self> {
        let mut period_map = HashMap::new();
        let mut period_list = Vec::with_capacity(scenario.periods.len());
        for def in &scenario.periods {
            let mut period = Period::new(def.code.clone(), def.start_date, def.end_date);
            period.force_closed = def.force_closed;
            period_map.insert(def.code.clone(), period.id);
            period_list.push(period);
        }

        let clock = scenario
            .start_at
            .or_else(|| {
                scenario.periods.first().map(|first| {
                    Utc.from_utc_datetime(
                        &first
                            .start_date
                            .and_hms_opt(12, 0, 0)
                            .unwrap_or_else(|| first.start_date.and_time(Default::default())),
                    )
                })
            })
            .unwrap_or_else(Utc::now);

        let registry = Arc::new(PeriodRegistry::new(period_list)?);
        let store = Arc::new(InMemoryRecordStore::new());
        let ledger = Arc::new(ScriptedLedger::new());
        let emitter = Arc::new(CapturingEmitter::new());
        let engine = WorkflowEngine::new(
            store.clone(),
            registry,
            ledger.clone(),
            emitter,
        );

        let mut context = Self {
            engine,
            store,
            actors: HashMap::new(),
            records: HashMap::new(),
            record_names: HashMap::new(),
            periods: period_map,
            tasks: HashMap::new(),
            clock,
        };

        for def in &scenario.actors {
            context
                .actors
                .insert(def.name.clone(), Actor::new(Uuid::now_v7(), def.role));
        }

        for (index, def) in scenario.records.iter().enumerate() {
            let author = context.actor(&def.author)?;
            let kind = context.to_kind(&def.payload);
            // Stagger creation timestamps so listing and grouping order
            // stays deterministic across runs.
            let at = context.clock + Duration::seconds(index as i64);
            let saved = context
                .engine
                .save_draft(DraftInput { id: None, kind }, &author, at)
                .with_context(|| format!("seeding record '{}'", def.name))?;
            context
                .records
                .insert(def.name.clone(), saved.reviewable.id);
            context
                .record_names
                .insert(saved.reviewable.id, def.name.clone());
        }

        for name in &scenario.ledger.fail {
            ledger.fail_for(context.record(name)?);
        }

        Ok(context)
    }

    fn run_steps(&mut self, steps: &[Step]) -> Result<Vec<StepIssue>> {
        let mut issues = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            let actor = self.actor(step.actor_name())?;

            match step {
                Step::Submit {
                    record, at, expect, ..
                } => {
                    let id = self.record(record)?;
                    let outcome = self
                        .engine
                        .submit(&id, &actor, at.unwrap_or(self.clock))
                        .err();
                    self.check_simple(&mut issues, number, step, expect, outcome);
                }
                Step::Resubmit {
                    record, at, expect, ..
                } => {
                    let id = self.record(record)?;
                    let outcome = self
                        .engine
                        .resubmit(&id, &actor, at.unwrap_or(self.clock))
                        .err();
                    self.check_simple(&mut issues, number, step, expect, outcome);
                }
                Step::EditDraft {
                    record,
                    hours,
                    expect,
                    ..
                } => {
                    let id = self.record(record)?;
                    let outcome = self.edit_draft(&id, &actor, *hours).err();
                    self.check_simple(&mut issues, number, step, expect, outcome);
                }
                Step::DeleteDraft { record, expect, .. } => {
                    let id = self.record(record)?;
                    let outcome = self.engine.delete_draft(&id, &actor).err();
                    self.check_simple(&mut issues, number, step, expect, outcome);
                }
                Step::Decide {
                    records,
                    outcome,
                    reason,
                    at,
                    expect,
                    ..
                } => {
                    let ids = records
                        .iter()
                        .map(|name| self.record(name))
                        .collect::<Result<Vec<_>>>()?;
                    let result = self.engine.decide(
                        &ids,
                        &actor,
                        *outcome,
                        reason.as_deref(),
                        at.unwrap_or(self.clock),
                    );
                    self.check_decide(&mut issues, number, step, expect, result)?;
                }
                Step::ClosePeriod { period, expect, .. } => {
                    let id = self.period(period)?;
                    let outcome = self.engine.close_period(&id, &actor).err();
                    self.check_simple(&mut issues, number, step, expect, outcome);
                }
                Step::ReopenPeriod { period, expect, .. } => {
                    let id = self.period(period)?;
                    let outcome = self.engine.reopen_period(&id, &actor).err();
                    self.check_simple(&mut issues, number, step, expect, outcome);
                }
            }
        }

        Ok(issues)
    }

    fn edit_draft(&self, id: &Uuid, actor: &Actor, hours: f64) -> Result<(), WorkflowError> {
        let kind = match self.store.get(id) {
            Ok(record) => with_hours(record.kind, hours),
            Err(RecordStoreError::NotFound { id }) => {
                return Err(WorkflowError::NotFound { id });
            }
            Err(error) => return Err(error.into()),
        };
        self.engine
            .save_draft(
                DraftInput {
                    id: Some(*id),
                    kind,
                },
                actor,
                self.clock,
            )
            .map(|_| ())
    }

    fn check_simple(
        &self,
        issues: &mut Vec<StepIssue>,
        number: usize,
        step: &Step,
        expect: &StepExpect,
        outcome: Option<WorkflowError>,
    ) {
        match (&expect.error, outcome) {
            (None, None) => {}
            (None, Some(error)) => {
                self.push_issue(issues, number, step, format!("unexpected error: {error}"));
            }
            (Some(expected), None) => {
                self.push_issue(
                    issues,
                    number,
                    step,
                    format!("expected {expected:?} error but the step succeeded"),
                );
            }
            (Some(expected), Some(error)) => {
                let actual = StepOutcome::from(&error);
                if actual != *expected {
                    self.push_issue(
                        issues,
                        number,
                        step,
                        format!("expected {expected:?} error but got {actual:?}: {error}"),
                    );
                }
            }
        }
    }

    fn check_decide(
        &self,
        issues: &mut Vec<StepIssue>,
        number: usize,
        step: &Step,
        expect: &StepExpect,
        result: clockwise_core::Result<clockwise_core::BatchResult>,
    ) -> Result<()> {
        let batch = match result {
            Ok(batch) => {
                if let Some(expected) = &expect.error {
                    self.push_issue(
                        issues,
                        number,
                        step,
                        format!("expected {expected:?} error but the call succeeded"),
                    );
                    return Ok(());
                }
                batch
            }
            Err(error) => {
                self.check_simple(issues, number, step, expect, Some(error));
                return Ok(());
            }
        };

        if let Some(succeeded) = &expect.succeeded {
            let expected_ids = succeeded
                .iter()
                .map(|name| self.record(name))
                .collect::<Result<Vec<_>>>()?;
            for (name, id) in succeeded.iter().zip(&expected_ids) {
                if !batch.succeeded.contains(id) {
                    let detail = batch
                        .failure_for(id)
                        .map(|error| format!(" (failed: {error})"))
                        .unwrap_or_default();
                    self.push_issue(
                        issues,
                        number,
                        step,
                        format!("record '{name}' was expected to succeed{detail}"),
                    );
                }
            }
            for id in &batch.succeeded {
                if !expected_ids.contains(id) {
                    self.push_issue(
                        issues,
                        number,
                        step,
                        format!(
                            "record '{}' succeeded but was not listed in expect.succeeded",
                            self.record_name(id)
                        ),
                    );
                }
            }
        } else if expect.failed.is_empty() && !batch.is_success() {
            for failure in &batch.failed {
                self.push_issue(
                    issues,
                    number,
                    step,
                    format!(
                        "record '{}' unexpectedly failed: {}",
                        self.record_name(&failure.id),
                        failure.error
                    ),
                );
            }
        }

        for failed in &expect.failed {
            let id = self.record(&failed.record)?;
            match batch.failure_for(&id) {
                Some(error) => {
                    let actual = StepOutcome::from(error);
                    if actual != failed.error {
                        self.push_issue(
                            issues,
                            number,
                            step,
                            format!(
                                "record '{}' failed with {actual:?} instead of {:?}: {error}",
                                failed.record, failed.error
                            ),
                        );
                    }
                }
                None => {
                    self.push_issue(
                        issues,
                        number,
                        step,
                        format!(
                            "record '{}' was expected to fail with {:?} but succeeded",
                            failed.record, failed.error
                        ),
                    );
                }
            }
        }

        Ok(())
    }

    fn final_records(&self) -> Result<HashMap<String, Option<Reviewable>>> {
        let mut actuals = HashMap::new();
        for (name, id) in &self.records {
            let actual = match self.store.get(id) {
                Ok(record) => Some(record),
                Err(RecordStoreError::NotFound { .. }) => None,
                Err(error) => return Err(error.into()),
            };
            actuals.insert(name.clone(), actual);
        }
        Ok(actuals)
    }

    fn push_issue(&self, issues: &mut Vec<StepIssue>, number: usize, step: &Step, message: String) {
        issues.push(StepIssue {
            step: number,
            action: step.action_name().to_string(),
            message,
        });
    }

    fn actor(&self, name: &str) -> Result<Actor> {
        self.actors
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("undeclared actor '{name}'"))
    }

    fn record(&self, name: &str) -> Result<Uuid> {
        self.records
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown record '{name}'"))
    }

    fn record_name(&self, id: &Uuid) -> String {
        self.record_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn period(&self, code: &str) -> Result<Uuid> {
        self.periods
            .get(code)
            .copied()
            .ok_or_else(|| anyhow!("unknown period '{code}'"))
    }

    fn to_kind(&mut self, payload: &RecordPayload) -> ReviewableKind {
        match payload {
            RecordPayload::TimeEntry {
                date,
                hours,
                task,
                note,
            } => ReviewableKind::TimeEntry {
                date: *date,
                hours: *hours,
                task_id: self.task_id(task.as_deref()),
                project_id: None,
                note: note.clone(),
            },
            RecordPayload::VacationRequest {
                start_date,
                end_date,
                hours,
                note,
            } => ReviewableKind::VacationRequest {
                start_date: *start_date,
                end_date: *end_date,
                hours: *hours,
                note: note.clone(),
            },
        }
    }

    fn task_id(&mut self, task: Option<&str>) -> Uuid {
        match task {
            Some(name) => *self
                .tasks
                .entry(name.to_string())
                .or_insert_with(Uuid::now_v7),
            None => Uuid::now_v7(),
        }
    }
}

fn with_hours(kind: ReviewableKind, hours: f64) -> ReviewableKind {
    match kind {
        ReviewableKind::TimeEntry {
            date,
            task_id,
            project_id,
            note,
            ..
        } => ReviewableKind::TimeEntry {
            date,
            hours,
            task_id,
            project_id,
            note,
        },
        ReviewableKind::VacationRequest {
            start_date,
            end_date,
            note,
            ..
        } => ReviewableKind::VacationRequest {
            start_date,
            end_date,
            hours,
            note,
        },
    }
}
