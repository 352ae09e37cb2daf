use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Reviewable;

/// Read-side projection for batch review: all submitted reviewables of one
/// author within one period. Never persisted and never mutated directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewGroup {
    pub author_id: Uuid,
    pub period_id: Uuid,
    /// Creation order, stable across repeated fetches under no mutation.
    pub reviewables: Vec<Reviewable>,
    pub total_quantity: f64,
}

/// Listing response shape: entries plus aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryTotals {
    pub entries: Vec<Reviewable>,
    pub total_count: usize,
    pub total_hours: f64,
}

impl EntryTotals {
    pub fn from_entries(entries: Vec<Reviewable>) -> Self {
        let total_hours = entries.iter().map(Reviewable::magnitude).sum();
        Self {
            total_count: entries.len(),
            total_hours,
            entries,
        }
    }
}
