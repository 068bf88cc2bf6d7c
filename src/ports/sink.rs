//! Policy sink port.
//!
//! Receives the trained policy once a run completes. This replaces storing
//! the table directly into game save state.

use crate::{Result, policy::SavedPolicy};

/// Port for handing off a trained policy.
///
/// # Examples
///
/// ```no_run
/// use pacer::{ports::PolicySink, policy::SavedPolicy};
///
/// fn hand_off<S: PolicySink>(sink: &S, policy: &SavedPolicy) -> pacer::Result<()> {
///     sink.store(policy)
/// }
/// ```
pub trait PolicySink: Send + Sync {
    /// Persist or publish `policy`.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be serialized or written.
    fn store(&self, policy: &SavedPolicy) -> Result<()>;
}
