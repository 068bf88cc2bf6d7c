//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use crate::{
    Result,
    environment::{EpisodeSummary, StepRecord, TrainingSummary},
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_step(record)` - After every reward is logged
///    - `on_episode_end(summary)`
/// 3. `on_training_end(summary)` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use pacer::{environment::EpisodeSummary, ports::Observer};
///
/// struct EpisodeCounter {
///     episodes: usize,
/// }
///
/// impl Observer for EpisodeCounter {
///     fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> pacer::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_step(&mut self, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs or display summaries.
    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        Ok(())
    }
}
