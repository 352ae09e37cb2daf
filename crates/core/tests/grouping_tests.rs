mod common;

use clockwise_core::{DecisionOutcome, WorkflowError};

use common::*;

#[test]
fn pending_groups_are_partitioned_per_author_with_summed_magnitudes() {
    let h = harness(vec![june()]);
    let alice = employee();
    let bob = employee();
    let boss = reviewer();
    let now = at(2024, 6, 10, 9);

    for (author, day, hours) in [(&alice, 3, 8.0), (&alice, 4, 6.0), (&bob, 3, 7.5)] {
        let saved = h
            .engine
            .save_draft(draft(hours_on(date(2024, 6, day), hours)), author, now)
            .expect("draft should save");
        h.engine
            .submit(&saved.reviewable.id, author, now)
            .expect("submit should succeed");
    }
    // Bob also has vacation pending in the same period.
    let leave = h
        .engine
        .save_draft(
            draft(vacation(date(2024, 6, 24), date(2024, 6, 25), 16.0)),
            &bob,
            now,
        )
        .expect("vacation draft should save");
    h.engine
        .submit(&leave.reviewable.id, &bob, now)
        .expect("submit should succeed");

    let period_id = h.periods.resolve_period(date(2024, 6, 3)).unwrap();
    let groups = h
        .engine
        .pending_groups(&period_id, &boss)
        .expect("grouping should succeed");

    assert_eq!(groups.len(), 2);
    let authors: Vec<_> = groups.iter().map(|group| group.author_id).collect();
    let mut sorted = authors.clone();
    sorted.sort();
    assert_eq!(authors, sorted, "authors must be ascending");

    let alice_group = groups.iter().find(|g| g.author_id == alice.id).unwrap();
    assert_eq!(alice_group.reviewables.len(), 2);
    assert_eq!(alice_group.total_quantity, 14.0);

    let bob_group = groups.iter().find(|g| g.author_id == bob.id).unwrap();
    assert_eq!(bob_group.reviewables.len(), 2);
    assert_eq!(bob_group.total_quantity, 23.5);
}

#[test]
fn grouping_is_stable_across_repeated_fetches() {
    let h = harness(vec![june()]);
    let author = employee();
    let boss = reviewer();
    let now = at(2024, 6, 10, 9);

    for day in [7, 3, 5, 4, 6] {
        let saved = h
            .engine
            .save_draft(draft(hours_on(date(2024, 6, day), 4.0)), &author, now)
            .expect("draft should save");
        h.engine
            .submit(&saved.reviewable.id, &author, now)
            .expect("submit should succeed");
    }

    let period_id = h.periods.resolve_period(date(2024, 6, 3)).unwrap();
    let first = h.engine.pending_groups(&period_id, &boss).unwrap();
    let second = h.engine.pending_groups(&period_id, &boss).unwrap();
    assert_eq!(first, second);
}

#[test]
fn grouping_excludes_other_periods_and_undecided_states() {
    let h = harness(vec![june(), july()]);
    let author = employee();
    let boss = reviewer();
    let now = at(2024, 6, 10, 9);

    let in_june = h
        .engine
        .save_draft(draft(hours_on(date(2024, 6, 3), 8.0)), &author, now)
        .expect("draft should save");
    h.engine
        .submit(&in_june.reviewable.id, &author, now)
        .expect("submit should succeed");

    let in_july = h
        .engine
        .save_draft(draft(hours_on(date(2024, 7, 3), 8.0)), &author, now)
        .expect("draft should save");
    h.engine
        .submit(&in_july.reviewable.id, &author, at(2024, 7, 3, 9))
        .expect("submit should succeed");

    // A decided record drops out of the pending view.
    h.engine
        .decide(
            &[in_june.reviewable.id],
            &boss,
            DecisionOutcome::Approve,
            None,
            now,
        )
        .expect("approve should succeed");

    let june_id = h.periods.resolve_period(date(2024, 6, 3)).unwrap();
    assert!(h.engine.pending_groups(&june_id, &boss).unwrap().is_empty());

    let july_id = h.periods.resolve_period(date(2024, 7, 3)).unwrap();
    let groups = h.engine.pending_groups(&july_id, &boss).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].reviewables[0].id, in_july.reviewable.id);
}

#[test]
fn grouping_is_reviewer_only_and_checks_the_period() {
    let h = harness(vec![june()]);
    let author = employee();
    let period_id = h.periods.resolve_period(date(2024, 6, 3)).unwrap();

    assert!(matches!(
        h.engine.pending_groups(&period_id, &author),
        Err(WorkflowError::InvalidActor { .. })
    ));

    let boss = reviewer();
    let bogus = uuid::Uuid::now_v7();
    assert!(matches!(
        h.engine.pending_groups(&bogus, &boss),
        Err(WorkflowError::UnknownPeriod { .. })
    ));
}
