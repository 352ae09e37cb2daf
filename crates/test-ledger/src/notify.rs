use std::sync::Mutex;

use clockwise_core::model::ReviewEvent;
use clockwise_core::{NotificationEmitter, NotifyError};

/// Emitter double that stores every delivered event for later assertions.
#[derive(Default)]
pub struct CapturingEmitter {
    events: Mutex<Vec<ReviewEvent>>,
}

impl CapturingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReviewEvent> {
        self.events.lock().expect("emitter lock poisoned").clone()
    }
}

impl NotificationEmitter for CapturingEmitter {
    fn notify(&self, event: &ReviewEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("emitter lock poisoned")
            .push(event.clone());
        Ok(())
    }
}
