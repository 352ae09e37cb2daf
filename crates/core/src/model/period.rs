use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named reporting period. Bounds are inclusive and periods never
/// overlap; the registry validates both at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub id: Uuid,
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Administrative override: a closed period blocks submission and
    /// review even while the calendar range would keep it open.
    #[serde(default)]
    pub force_closed: bool,
}

impl Period {
    pub fn new(code: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            code: code.into(),
            start_date,
            end_date,
            force_closed: false,
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        !self.force_closed && self.covers(at.date_naive())
    }
}
