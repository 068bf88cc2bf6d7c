//! In-memory policy sink for tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{Result, policy::SavedPolicy, ports::PolicySink};

/// Sink that keeps the most recently stored policy in memory.
///
/// The policy is round-tripped through MessagePack on store, so a test sees
/// exactly what a file sink would have written. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPolicyStore {
    stored: Arc<Mutex<Option<Vec<u8>>>>,
    writes: Arc<Mutex<usize>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a policy has been stored.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decode the most recently stored policy, if any.
    pub fn latest(&self) -> Result<Option<SavedPolicy>> {
        let stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        stored
            .as_deref()
            .map(SavedPolicy::read_from)
            .transpose()
    }
}

impl PolicySink for InMemoryPolicyStore {
    fn store(&self, policy: &SavedPolicy) -> Result<()> {
        let mut bytes = Vec::new();
        policy.write_to(&mut bytes)?;

        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
