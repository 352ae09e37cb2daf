use chrono::NaiveDate;
use thiserror::Error;

use crate::model::ReviewableKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("rejection reason must not be empty")]
    EmptyReason,
    #[error("hours must be greater than zero, got {hours}")]
    NonPositiveHours { hours: f64 },
    #[error("a single day cannot hold {hours} hours")]
    HoursExceedDay { hours: f64 },
    #[error("vacation start {start} is after its end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Field-shape checks for a reviewable payload. Business transitions are
/// the engine's concern; this only guards magnitudes and date ranges.
pub fn validate_kind(kind: &ReviewableKind) -> Result<(), ValidationError> {
    match kind {
        ReviewableKind::TimeEntry { hours, .. } => {
            if *hours <= 0.0 {
                return Err(ValidationError::NonPositiveHours { hours: *hours });
            }
            // One entry covers one day.
            if *hours >= 24.0 {
                return Err(ValidationError::HoursExceedDay { hours: *hours });
            }
        }
        ReviewableKind::VacationRequest {
            start_date,
            end_date,
            hours,
            ..
        } => {
            if *hours <= 0.0 {
                return Err(ValidationError::NonPositiveHours { hours: *hours });
            }
            if start_date > end_date {
                return Err(ValidationError::InvalidDateRange {
                    start: *start_date,
                    end: *end_date,
                });
            }
        }
    }
    Ok(())
}

pub fn validate_rejection_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::EmptyReason);
    }
    Ok(())
}
