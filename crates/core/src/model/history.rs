use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ReviewStatus;

/// One audited state transition. Appended by the engine for every
/// successful transition and handed verbatim to the notification emitter,
/// so rejection reasons survive resubmission even though the live record
/// clears them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEvent {
    pub reviewable_id: Uuid,
    pub old_status: ReviewStatus,
    pub new_status: ReviewStatus,
    pub actor_id: Uuid,
    #[serde(default)]
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}
