mod common;

use clockwise_core::model::Period;
use clockwise_core::{PeriodConfigError, PeriodError, PeriodRegistry};
use uuid::Uuid;

use common::*;

#[test]
fn resolution_is_deterministic_and_total() {
    let june = june();
    let july = july();
    let registry = PeriodRegistry::new(vec![july.clone(), june.clone()]).unwrap();

    assert_eq!(registry.resolve_period(date(2024, 6, 1)).unwrap(), june.id);
    assert_eq!(registry.resolve_period(date(2024, 6, 30)).unwrap(), june.id);
    assert_eq!(registry.resolve_period(date(2024, 7, 15)).unwrap(), july.id);
    assert_eq!(
        registry.resolve_period(date(2024, 8, 1)),
        Err(PeriodError::NoPeriodConfigured {
            date: date(2024, 8, 1)
        })
    );
}

#[test]
fn overlapping_configuration_is_rejected() {
    let first = Period::new("a", date(2024, 6, 1), date(2024, 6, 20));
    let second = Period::new("b", date(2024, 6, 20), date(2024, 6, 30));

    let error = PeriodRegistry::new(vec![first, second]).unwrap_err();
    assert_eq!(
        error,
        PeriodConfigError::OverlappingPeriods {
            first: "a".to_string(),
            second: "b".to_string()
        }
    );
}

#[test]
fn inverted_range_is_rejected() {
    let period = Period::new("backwards", date(2024, 6, 30), date(2024, 6, 1));
    assert!(matches!(
        PeriodRegistry::new(vec![period]),
        Err(PeriodConfigError::InvalidRange { .. })
    ));
}

#[test]
fn openness_tracks_the_calendar_and_the_force_close_flag() {
    let june = june();
    let registry = PeriodRegistry::new(vec![june.clone()]).unwrap();

    assert!(registry.is_open(&june.id, at(2024, 6, 15, 12)).unwrap());
    assert!(!registry.is_open(&june.id, at(2024, 7, 1, 0)).unwrap());

    registry.force_close(&june.id).unwrap();
    assert!(!registry.is_open(&june.id, at(2024, 6, 15, 12)).unwrap());

    registry.reopen(&june.id).unwrap();
    assert!(registry.is_open(&june.id, at(2024, 6, 15, 12)).unwrap());
}

#[test]
fn current_period_is_none_outside_every_range() {
    let registry = PeriodRegistry::new(vec![june()]).unwrap();
    assert!(registry.current_period(at(2024, 6, 15, 12)).is_some());
    assert_eq!(registry.current_period(at(2025, 1, 1, 0)), None);
}

#[test]
fn unknown_ids_are_reported_not_guessed() {
    let registry = PeriodRegistry::new(vec![june()]).unwrap();
    let bogus = Uuid::now_v7();
    assert_eq!(
        registry.is_open(&bogus, at(2024, 6, 15, 12)),
        Err(PeriodError::UnknownPeriod { id: bogus })
    );
    assert_eq!(
        registry.force_close(&bogus),
        Err(PeriodError::UnknownPeriod { id: bogus })
    );
}
