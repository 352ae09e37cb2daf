mod common;

use clockwise_core::model::{ReviewStatus, ReviewableKind};
use clockwise_core::{DecisionOutcome, DraftInput, RecordStore, WorkflowError};

use common::*;

#[test]
fn reject_revise_resubmit_approve_round_trip() {
    let h = harness(vec![june()]);
    let author = employee();
    let boss = reviewer();
    let now = at(2024, 6, 5, 12);

    let id = h
        .engine
        .save_draft(draft(hours_on(date(2024, 6, 3), 8.0)), &author, now)
        .expect("draft should save")
        .reviewable
        .id;
    h.engine.submit(&id, &author, now).expect("submit should succeed");

    let review_time = at(2024, 6, 10, 10);
    h.engine
        .decide(
            &[id],
            &boss,
            DecisionOutcome::Reject,
            Some("wrong project"),
            review_time,
        )
        .expect("reject should succeed");

    let rejected = h.store.get(&id).unwrap();
    assert_eq!(rejected.status, ReviewStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("wrong project"));

    let reopened = h
        .engine
        .resubmit(&id, &author, at(2024, 6, 11, 9))
        .expect("resubmit should succeed");
    assert_eq!(reopened.status, ReviewStatus::Draft);
    assert_eq!(reopened.rejection_reason, None);
    assert_eq!(reopened.decided_by, None);
    assert_eq!(reopened.decided_at, None);
    assert_eq!(reopened.period_id, None);

    // The reason is gone from the live record but survives in history.
    let history = h.engine.history(&id).unwrap();
    assert!(history
        .iter()
        .any(|event| event.reason.as_deref() == Some("wrong project")));

    // Author revises and submits again; the period is derived afresh.
    h.engine
        .save_draft(
            DraftInput {
                id: Some(id),
                kind: hours_on(date(2024, 6, 3), 6.0),
            },
            &author,
            at(2024, 6, 11, 9),
        )
        .expect("revision should save");
    let resubmitted = h
        .engine
        .submit(&id, &author, at(2024, 6, 11, 10))
        .expect("second submit should succeed");
    assert_eq!(resubmitted.status, ReviewStatus::Submitted);
    assert!(resubmitted.period_id.is_some());

    let result = h
        .engine
        .decide(
            &[id],
            &boss,
            DecisionOutcome::Approve,
            None,
            at(2024, 6, 12, 10),
        )
        .expect("approve should succeed");
    assert_eq!(result.succeeded, vec![id]);

    let approved = h.store.get(&id).unwrap();
    assert_eq!(approved.status, ReviewStatus::Approved);
    assert!(approved.synced_to_ledger);
    assert_eq!(h.ledger.attempts_for(&id), 1);
}

#[test]
fn resubmit_requires_a_rejected_record_and_its_author() {
    let h = harness(vec![june()]);
    let author = employee();
    let intruder = employee();
    let now = at(2024, 6, 5, 12);

    let id = h
        .engine
        .save_draft(draft(hours_on(date(2024, 6, 3), 8.0)), &author, now)
        .expect("draft should save")
        .reviewable
        .id;

    let error = h
        .engine
        .resubmit(&id, &author, now)
        .expect_err("drafts cannot be resubmitted");
    assert!(matches!(
        error,
        WorkflowError::InvalidState {
            expected: ReviewStatus::Rejected,
            actual: ReviewStatus::Draft,
            ..
        }
    ));

    h.engine.submit(&id, &author, now).expect("submit should succeed");
    let boss = reviewer();
    h.engine
        .decide(&[id], &boss, DecisionOutcome::Reject, Some("redo"), now)
        .expect("reject should succeed");

    let error = h
        .engine
        .resubmit(&id, &intruder, now)
        .expect_err("only the author resubmits");
    assert!(matches!(error, WorkflowError::InvalidActor { .. }));
}

#[test]
fn resubmission_rederives_the_period_after_a_date_change() {
    let h = harness(vec![june(), july()]);
    let author = employee();
    let boss = reviewer();
    let now = at(2024, 6, 5, 12);

    let id = h
        .engine
        .save_draft(draft(hours_on(date(2024, 6, 28), 8.0)), &author, now)
        .expect("draft should save")
        .reviewable
        .id;
    h.engine.submit(&id, &author, now).expect("submit should succeed");
    let june_period = h.store.get(&id).unwrap().period_id.unwrap();

    h.engine
        .decide(&[id], &boss, DecisionOutcome::Reject, Some("wrong week"), now)
        .expect("reject should succeed");
    h.engine
        .resubmit(&id, &author, at(2024, 7, 2, 9))
        .expect("resubmit should succeed");

    // Author moves the entry into July and submits in July.
    h.engine
        .save_draft(
            DraftInput {
                id: Some(id),
                kind: hours_on(date(2024, 7, 1), 8.0),
            },
            &author,
            at(2024, 7, 2, 9),
        )
        .expect("revision should save");
    let resubmitted = h
        .engine
        .submit(&id, &author, at(2024, 7, 2, 10))
        .expect("submit should succeed");

    let july_period = resubmitted.period_id.unwrap();
    assert_ne!(july_period, june_period);
    assert_eq!(
        h.periods.resolve_period(date(2024, 7, 1)).unwrap(),
        july_period
    );
}

#[test]
fn vacation_requests_follow_the_same_state_machine() {
    let h = harness(vec![june()]);
    let author = employee();
    let boss = reviewer();
    let now = at(2024, 6, 5, 12);

    let id = h
        .engine
        .save_draft(
            draft(ReviewableKind::VacationRequest {
                start_date: date(2024, 6, 17),
                end_date: date(2024, 6, 21),
                hours: 40.0,
                note: Some("summer break".to_string()),
            }),
            &author,
            now,
        )
        .expect("vacation draft should save")
        .reviewable
        .id;
    h.engine.submit(&id, &author, now).expect("submit should succeed");

    h.engine
        .decide(
            &[id],
            &boss,
            DecisionOutcome::Reject,
            Some("team is short-staffed"),
            now,
        )
        .expect("reject should succeed");
    h.engine
        .resubmit(&id, &author, now)
        .expect("resubmit should succeed");

    assert_eq!(h.store.get(&id).unwrap().status, ReviewStatus::Draft);
}
