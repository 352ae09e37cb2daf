use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn is_decided(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Domain payload of a reviewable record. The workflow engine treats this
/// as opaque beyond a non-negative magnitude and the date that anchors the
/// record to a reporting period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewableKind {
    TimeEntry {
        date: NaiveDate,
        hours: f64,
        task_id: Uuid,
        #[serde(default)]
        project_id: Option<Uuid>,
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

impl ReviewableKind {
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::TimeEntry { hours, .. } | Self::VacationRequest { hours, .. } => *hours,
        }
    }

    /// The date used to derive the owning period: entry date for time
    /// entries, first day of leave for vacation requests.
    pub fn effective_date(&self) -> NaiveDate {
        match self {
            Self::TimeEntry { date, .. } => *date,
            Self::VacationRequest { start_date, .. } => *start_date,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TimeEntry { .. } => "time_entry",
            Self::VacationRequest { .. } => "vacation_request",
        }
    }
}

/// A time entry or vacation request unified under one workflow contract.
///
/// Workflow fields (`status`, `period_id`, decision fields, sync fields)
/// change only through the record store's compare-and-transition primitive;
/// the payload changes only through draft updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reviewable {
    pub id: Uuid,
    pub author_id: Uuid,
    /// Derived from `kind.effective_date()` at submission time and fixed
    /// for the rest of the review; cleared again when a rejection is
    /// reopened so a fresh submit re-derives it.
    #[serde(default)]
    pub period_id: Option<Uuid>,
    pub status: ReviewStatus,
    pub kind: ReviewableKind,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub decided_by: Option<Uuid>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub synced_to_ledger: bool,
    #[serde(default)]
    pub ledger_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reviewable {
    pub fn new(author_id: Uuid, kind: ReviewableKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            author_id,
            period_id: None,
            status: ReviewStatus::Draft,
            kind,
            rejection_reason: None,
            decided_by: None,
            decided_at: None,
            submitted_at: None,
            synced_to_ledger: false,
            ledger_ref: None,
            created_at,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.kind.magnitude()
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.kind.effective_date()
    }
}
