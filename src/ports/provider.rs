//! Trajectory provider port
//!
//! The provider fetches a player's recorded race and can synthetically
//! lengthen it by duplicating episodes. Both operations may finish
//! asynchronously; each returns a [`Completion`] the caller awaits once.

use tokio::sync::oneshot;

use crate::{Result, trajectory::Trajectory};

/// Signal resolved when a provider operation finishes.
pub type Completion = oneshot::Receiver<Result<()>>;

/// Source of recorded human trajectories.
pub trait TrajectoryProvider: Send {
    /// Start loading the recording of `player_id`.
    fn load_data(&mut self, player_id: &str) -> Completion;

    /// Append `factor` synthetic copies of the loaded episodes.
    fn duplicate_data(&mut self, factor: usize) -> Completion;

    /// Hand the loaded trajectory over to the trainer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DataNotLoaded`] if loading has not completed.
    fn take_trajectory(&mut self) -> Result<Trajectory>;
}

/// A completion that is already resolved with `result`.
pub fn completed(result: Result<()>) -> Completion {
    let (tx, rx) = oneshot::channel();
    // The receiver is still alive here, so the send cannot fail.
    let _ = tx.send(result);
    rx
}
