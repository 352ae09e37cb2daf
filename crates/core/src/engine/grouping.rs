use std::collections::BTreeMap;

use uuid::Uuid;

use crate::model::{ReviewGroup, Reviewable};

/// Partitions submitted reviewables into per-author review groups. Ordering
/// is part of the contract: authors ascending, records in creation order,
/// so repeated fetches under no mutation return identical output.
pub fn group_by_author(period_id: Uuid, records: Vec<Reviewable>) -> Vec<ReviewGroup> {
    let mut by_author: BTreeMap<Uuid, Vec<Reviewable>> = BTreeMap::new();
    for record in records {
        by_author.entry(record.author_id).or_default().push(record);
    }

    by_author
        .into_iter()
        .map(|(author_id, mut reviewables)| {
            reviewables.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            let total_quantity = reviewables.iter().map(Reviewable::magnitude).sum();
            ReviewGroup {
                author_id,
                period_id,
                reviewables,
                total_quantity,
            }
        })
        .collect()
}
