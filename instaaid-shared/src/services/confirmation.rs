use std::collections::HashMap;
use crate::models::auth::PendingVerification;

/// Owned map from verification id to the provider's pending-confirmation
/// object. Some provider code paths require confirming against the
/// original handle rather than a bare id string, so the whole pending
/// attempt is kept here until it settles. Cleared entirely on sign-out.
#[derive(Debug, Default)]
pub struct ConfirmationStore {
    entries: HashMap<String, PendingVerification>,
}

impl ConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a pending attempt, replacing any previous one under the
    /// same id. A resend replaces the entry for the phone's prior id; the
    /// orphaned attempt is discarded, the provider expires it on its own.
    pub fn insert(&mut self, pending: PendingVerification) {
        self.entries
            .insert(pending.handle.verification_id.clone(), pending);
    }

    pub fn get(&self, verification_id: &str) -> Option<&PendingVerification> {
        self.entries.get(verification_id)
    }

    pub fn remove(&mut self, verification_id: &str) -> Option<PendingVerification> {
        self.entries.remove(verification_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
