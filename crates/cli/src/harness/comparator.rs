use std::collections::HashMap;

use clockwise_core::model::{ExpectedState, RecordMismatch, Reviewable};

/// Compare the expected final record state against what the store holds
/// after the steps ran. Optional expectations (`rejection_reason`,
/// `synced`, `in_period`) are only checked when the scenario pins them.
pub fn compare_final_state(
    expected: &ExpectedState,
    actuals: &HashMap<String, Option<Reviewable>>,
) -> Vec<RecordMismatch> {
    let mut mismatches = Vec::new();

    for expectation in &expected.records {
        let actual = match actuals.get(&expectation.record) {
            Some(Some(record)) => record,
            _ => {
                mismatches.push(RecordMismatch {
                    record: expectation.record.clone(),
                    field: "status".to_string(),
                    expected: format!("{:?}", expectation.status),
                    actual: "missing".to_string(),
                });
                continue;
            }
        };

        if actual.status != expectation.status {
            mismatches.push(mismatch(
                &expectation.record,
                "status",
                format!("{:?}", expectation.status),
                format!("{:?}", actual.status),
            ));
        }

        if let Some(reason) = &expectation.rejection_reason {
            if actual.rejection_reason.as_deref() != Some(reason.as_str()) {
                mismatches.push(mismatch(
                    &expectation.record,
                    "rejection_reason",
                    reason.clone(),
                    actual
                        .rejection_reason
                        .clone()
                        .unwrap_or_else(|| "none".to_string()),
                ));
            }
        }

        if let Some(synced) = expectation.synced {
            if actual.synced_to_ledger != synced {
                mismatches.push(mismatch(
                    &expectation.record,
                    "synced",
                    synced.to_string(),
                    actual.synced_to_ledger.to_string(),
                ));
            }
        }

        if let Some(in_period) = expectation.in_period {
            if actual.period_id.is_some() != in_period {
                mismatches.push(mismatch(
                    &expectation.record,
                    "in_period",
                    in_period.to_string(),
                    actual.period_id.is_some().to_string(),
                ));
            }
        }
    }

    mismatches
}

fn mismatch(record: &str, field: &str, expected: String, actual: String) -> RecordMismatch {
    RecordMismatch {
        record: record.to_string(),
        field: field.to_string(),
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use clockwise_core::model::{ExpectedRecord, ReviewStatus, ReviewableKind};
    use uuid::Uuid;

    fn record(status: ReviewStatus) -> Reviewable {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let kind = ReviewableKind::TimeEntry {
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            hours: 7.5,
            task_id: Uuid::now_v7(),
            project_id: None,
            note: None,
        };
        let mut reviewable = Reviewable::new(Uuid::now_v7(), kind, created_at);
        reviewable.status = status;
        reviewable
    }

    fn expectation(name: &str, status: ReviewStatus) -> ExpectedRecord {
        ExpectedRecord {
            record: name.to_string(),
            status,
            rejection_reason: None,
            synced: None,
            in_period: None,
        }
    }

    #[test]
    fn matching_state_yields_no_mismatches() {
        let actuals = HashMap::from([("entry".to_string(), Some(record(ReviewStatus::Draft)))]);
        let expected = ExpectedState {
            records: vec![expectation("entry", ReviewStatus::Draft)],
        };

        assert!(compare_final_state(&expected, &actuals).is_empty());
    }

    #[test]
    fn status_divergence_is_reported_per_field() {
        let actuals = HashMap::from([("entry".to_string(), Some(record(ReviewStatus::Draft)))]);
        let expected = ExpectedState {
            records: vec![expectation("entry", ReviewStatus::Approved)],
        };

        let mismatches = compare_final_state(&expected, &actuals);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].field, "status");
        assert_eq!(mismatches[0].expected, "Approved");
        assert_eq!(mismatches[0].actual, "Draft");
    }

    #[test]
    fn missing_record_is_a_status_mismatch() {
        let actuals = HashMap::from([("entry".to_string(), None)]);
        let expected = ExpectedState {
            records: vec![expectation("entry", ReviewStatus::Draft)],
        };

        let mismatches = compare_final_state(&expected, &actuals);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].actual, "missing");
    }

    #[test]
    fn pinned_rejection_reason_is_compared() {
        let mut rejected = record(ReviewStatus::Rejected);
        rejected.rejection_reason = Some("wrong task".to_string());
        let actuals = HashMap::from([("entry".to_string(), Some(rejected))]);

        let mut wanted = expectation("entry", ReviewStatus::Rejected);
        wanted.rejection_reason = Some("wrong project".to_string());
        let expected = ExpectedState {
            records: vec![wanted],
        };

        let mismatches = compare_final_state(&expected, &actuals);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].field, "rejection_reason");
        assert_eq!(mismatches[0].actual, "wrong task");
    }

    #[test]
    fn unpinned_optional_fields_are_ignored() {
        let mut approved = record(ReviewStatus::Approved);
        approved.synced_to_ledger = true;
        approved.period_id = Some(Uuid::now_v7());
        let actuals = HashMap::from([("entry".to_string(), Some(approved))]);

        let expected = ExpectedState {
            records: vec![expectation("entry", ReviewStatus::Approved)],
        };

        assert!(compare_final_state(&expected, &actuals).is_empty());
    }

    #[test]
    fn synced_and_period_pins_are_checked() {
        let approved = record(ReviewStatus::Approved);
        let actuals = HashMap::from([("entry".to_string(), Some(approved))]);

        let mut wanted = expectation("entry", ReviewStatus::Approved);
        wanted.synced = Some(true);
        wanted.in_period = Some(true);
        let expected = ExpectedState {
            records: vec![wanted],
        };

        let mismatches = compare_final_state(&expected, &actuals);
        assert_eq!(mismatches.len(), 2);
        let fields: Vec<_> = mismatches.iter().map(|m| m.field.as_str()).collect();
        assert!(fields.contains(&"synced"));
        assert!(fields.contains(&"in_period"));
    }
}
