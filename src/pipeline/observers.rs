//! Observer implementations for training sessions
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::sync::{Arc, Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    environment::{EpisodeSummary, StepRecord, TrainingSummary},
    ports::Observer,
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    cumulative_reward: i64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            cumulative_reward: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (reward {msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.cumulative_reward = record.cumulative_reward;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64);
            pb.set_message(self.cumulative_reward.to_string());
        }
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(summary.cumulative_reward.to_string());
        }
        Ok(())
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub steps: usize,
    pub on_pace_steps: usize,
    pub on_pace_rate: f64,
    pub avg_episode_length: f64,
    pub best_episode_reward: Option<i64>,
    pub worst_episode_reward: Option<i64>,
    /// Total reward of each episode, in order
    pub episode_rewards: Vec<i64>,
}

#[derive(Debug, Default)]
struct Metrics {
    steps: usize,
    on_pace_steps: usize,
    episode_rewards: Vec<i64>,
    episode_lengths: Vec<usize>,
}

/// Metrics observer - Tracks per-episode reward totals and pacing
///
/// Clones share the same counters, so a handle kept by the caller can read the
/// summary after the session has consumed the boxed observer.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    metrics: Arc<Mutex<Metrics>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        let episodes = metrics.episode_rewards.len();
        let on_pace_rate = if metrics.steps == 0 {
            0.0
        } else {
            metrics.on_pace_steps as f64 / metrics.steps as f64
        };
        let avg_episode_length = if episodes == 0 {
            0.0
        } else {
            metrics.episode_lengths.iter().sum::<usize>() as f64 / episodes as f64
        };

        MetricsSummary {
            episodes,
            steps: metrics.steps,
            on_pace_steps: metrics.on_pace_steps,
            on_pace_rate,
            avg_episode_length,
            best_episode_reward: metrics.episode_rewards.iter().copied().max(),
            worst_episode_reward: metrics.episode_rewards.iter().copied().min(),
            episode_rewards: metrics.episode_rewards.clone(),
        }
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        metrics.steps += 1;
        if record.reward > 0 {
            metrics.on_pace_steps += 1;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        metrics.episode_rewards.push(summary.total_reward);
        metrics.episode_lengths.push(summary.steps);
        Ok(())
    }
}
