//! Learner port - abstraction over the tabular and neural trainers
//!
//! Both learners replay the same recorded trajectory and produce a
//! [`TrainedPolicy`] for the runtime opponent. The pipeline drives them
//! through this trait so it never needs to know which one it holds.

use crate::{
    Result,
    environment::{RewardLog, TrainingSummary},
    policy::TrainedPolicy,
    ports::Observer,
    trajectory::Trajectory,
};

/// Learner trait - Unified interface for the opponent trainers
///
/// # Examples
///
/// ```no_run
/// use pacer::{ports::Learner, trajectory::Trajectory};
///
/// fn run<L: Learner>(learner: &mut L, mut trajectory: Trajectory) -> pacer::Result<()> {
///     let summary = learner.train(&mut trajectory, 10, &mut [])?;
///     println!("{} finished {} steps", learner.name(), summary.steps);
///     Ok(())
/// }
/// ```
pub trait Learner: Send {
    /// Run `num_episodes` episodes against `trajectory`.
    ///
    /// The trajectory is pruned as episodes are consumed, so episode N+1
    /// always starts reading from index 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is empty or a step lands on a time
    /// with no recorded sample. Both are fatal; nothing is retried.
    fn train(
        &mut self,
        trajectory: &mut Trajectory,
        num_episodes: usize,
        observers: &mut [Box<dyn Observer>],
    ) -> Result<TrainingSummary>;

    /// Get the learner's name.
    ///
    /// Used for identification in logs and summaries.
    fn name(&self) -> &str;

    /// Rewards recorded so far, one entry per training step.
    fn reward_log(&self) -> &RewardLog;

    /// Snapshot of the learned policy for hand-off to a [`crate::ports::PolicySink`].
    fn policy(&self) -> TrainedPolicy;

    /// Seed the learner's internal random number generator.
    ///
    /// # Default Implementation
    ///
    /// Does nothing and returns `Ok(())`.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }

    /// Enable downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;
}
