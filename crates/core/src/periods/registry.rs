use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::model::Period;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("no period configured for date {date}")]
    NoPeriodConfigured { date: NaiveDate },
    #[error("period '{id}' not found")]
    UnknownPeriod { id: Uuid },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodConfigError {
    #[error("period '{code}' starts {start} after its end {end}")]
    InvalidRange {
        code: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("periods '{first}' and '{second}' overlap")]
    OverlappingPeriods { first: String, second: String },
}

/// Single source of truth for calendar-to-period resolution. Read-mostly:
/// administrative force-close/reopen are the only mutations, behind one
/// coarse lock.
#[derive(Debug)]
pub struct PeriodRegistry {
    periods: RwLock<Vec<Period>>,
}

impl PeriodRegistry {
    /// Builds a registry from configured periods, rejecting inverted ranges
    /// and overlaps (bounds are inclusive on both ends).
    pub fn new(mut periods: Vec<Period>) -> Result<Self, PeriodConfigError> {
        periods.sort_by_key(|period| period.start_date);

        for period in &periods {
            if period.start_date > period.end_date {
                return Err(PeriodConfigError::InvalidRange {
                    code: period.code.clone(),
                    start: period.start_date,
                    end: period.end_date,
                });
            }
        }

        for pair in periods.windows(2) {
            if pair[0].end_date >= pair[1].start_date {
                return Err(PeriodConfigError::OverlappingPeriods {
                    first: pair[0].code.clone(),
                    second: pair[1].code.clone(),
                });
            }
        }

        Ok(Self {
            periods: RwLock::new(periods),
        })
    }

    /// Deterministic, total resolution of a date to its owning period.
    /// Never defaults to "current": a date outside every configured period
    /// is an error, not a guess.
    pub fn resolve_period(&self, date: NaiveDate) -> Result<Uuid, PeriodError> {
        self.read()
            .iter()
            .find(|period| period.covers(date))
            .map(|period| period.id)
            .ok_or(PeriodError::NoPeriodConfigured { date })
    }

    pub fn period(&self, id: &Uuid) -> Result<Period, PeriodError> {
        self.read()
            .iter()
            .find(|period| period.id == *id)
            .cloned()
            .ok_or(PeriodError::UnknownPeriod { id: *id })
    }

    /// Whether the period accepts submissions and decisions at `at`: within
    /// its date range and not administratively force-closed.
    pub fn is_open(&self, id: &Uuid, at: DateTime<Utc>) -> Result<bool, PeriodError> {
        Ok(self.period(id)?.is_open(at))
    }

    pub fn current_period(&self, at: DateTime<Utc>) -> Option<Uuid> {
        self.resolve_period(at.date_naive()).ok()
    }

    pub fn force_close(&self, id: &Uuid) -> Result<(), PeriodError> {
        self.set_force_closed(id, true)
    }

    /// Reopening is permitted; decisions made while the period was open
    /// remain final either way.
    pub fn reopen(&self, id: &Uuid) -> Result<(), PeriodError> {
        self.set_force_closed(id, false)
    }

    fn set_force_closed(&self, id: &Uuid, closed: bool) -> Result<(), PeriodError> {
        let mut periods = self
            .periods
            .write()
            .expect("period registry lock poisoned");
        let period = periods
            .iter_mut()
            .find(|period| period.id == *id)
            .ok_or(PeriodError::UnknownPeriod { id: *id })?;
        period.force_closed = closed;
        info!(period = %period.code, closed, "period administrative state changed");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Period>> {
        self.periods.read().expect("period registry lock poisoned")
    }
}
