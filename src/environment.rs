//! Race dynamics, reward shaping and episode termination
//!
//! The opponent is scored against the recorded human: it earns +1 only while
//! pacing alongside the human ([`RelativePosition::On`]) and -1 when it is
//! either behind or in front.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    discretizer::Discretized,
    trajectory::Trajectory,
    types::{Action, RelativePosition},
};

/// Seconds an action is held before the next decision.
pub const STEP_DURATION_SECS: i32 = 2;

/// Opponent position at the start of every episode.
pub const START_POSITION: i32 = 1;

/// Next-transition time assumed until the first lookup replaces it.
pub const INITIAL_NEXT_TRANSITION_SECS: i32 = 2;

/// Human reference position used at `t = 0`.
pub const BOOTSTRAP_REFERENCE_POSITION: i32 = 3;

/// Next-transition time used when the stream ends within two samples.
pub const EXHAUSTED_TRANSITION_SECS: i32 = 1;

/// Reward for the opponent at `agent_position` after `elapsed_secs`.
///
/// # Errors
///
/// Returns [`Error::MissingSample`] if the trajectory has no sample at
/// `elapsed_secs * 1000`.
pub fn reward(agent_position: i32, trajectory: &Trajectory, elapsed_secs: i32) -> Result<i32> {
    let time_ms = i64::from(elapsed_secs) * 1000;
    let reference = trajectory
        .index_of_time(time_ms)
        .and_then(|index| trajectory.position_at(index))
        .ok_or(Error::MissingSample { time_ms })?;

    Ok(match RelativePosition::classify(agent_position - reference) {
        RelativePosition::On => 1,
        RelativePosition::Behind | RelativePosition::Front => -1,
    })
}

/// Mutable state of a single simulated race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceState {
    pub elapsed_secs: i32,
    pub next_transition_secs: i32,
    pub agent_position: i32,
}

impl RaceState {
    /// State at the start of an episode.
    pub fn new() -> Self {
        Self {
            elapsed_secs: 0,
            next_transition_secs: INITIAL_NEXT_TRANSITION_SECS,
            agent_position: START_POSITION,
        }
    }

    /// Hold `action` for one step.
    pub fn advance(&mut self, action: Action) {
        self.agent_position += action.displacement(STEP_DURATION_SECS);
        self.elapsed_secs += STEP_DURATION_SECS;
    }

    /// Adopt the transition time discovered while discretizing.
    pub fn observe(&mut self, discretized: &Discretized) {
        if let Some(next) = discretized.next_transition_secs {
            self.next_transition_secs = next;
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.elapsed_secs >= self.next_transition_secs
    }

    /// Elapsed time in milliseconds, the unit the network consumes.
    pub fn elapsed_ms(&self) -> i64 {
        i64::from(self.elapsed_secs) * 1000
    }
}

impl Default for RaceState {
    fn default() -> Self {
        Self::new()
    }
}

/// One logged training step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step across the whole run
    pub time_step: usize,
    /// 1-based episode number
    pub episode: usize,
    pub reward: i32,
    /// Running total since the start of the run
    pub cumulative_reward: i64,
}

/// Append-only reward history for diagnostics and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLog {
    records: Vec<StepRecord>,
    cumulative: i64,
}

impl RewardLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reward and return the resulting record.
    pub fn record(&mut self, episode: usize, reward: i32) -> StepRecord {
        self.cumulative += i64::from(reward);
        let record = StepRecord {
            time_step: self.records.len() + 1,
            episode,
            reward,
            cumulative_reward: self.cumulative,
        };
        self.records.push(record);
        record
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cumulative_reward(&self) -> i64 {
        self.cumulative
    }

    pub fn rewards(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.iter().map(|r| r.reward)
    }

    /// Total reward per episode, in episode order.
    pub fn episode_totals(&self) -> Vec<(usize, i64)> {
        let mut totals: Vec<(usize, i64)> = Vec::new();
        for record in &self.records {
            match totals.last_mut() {
                Some((episode, total)) if *episode == record.episode => {
                    *total += i64::from(record.reward)
                }
                _ => totals.push((record.episode, i64::from(record.reward))),
            }
        }
        totals
    }
}

/// Outcome of one replayed episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// 1-based episode number
    pub episode: usize,
    pub steps: usize,
    pub total_reward: i64,
    /// Trajectory samples released after the episode
    pub pruned_samples: usize,
}

/// Aggregate outcome of a training run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub steps: usize,
    pub cumulative_reward: i64,
    /// Fraction of steps spent alongside the human
    pub on_pace_rate: f64,
}

impl TrainingSummary {
    pub fn from_log(episodes: usize, log: &RewardLog) -> Self {
        let steps = log.len();
        let on_pace = log.rewards().filter(|&r| r > 0).count();
        let on_pace_rate = if steps > 0 {
            on_pace as f64 / steps as f64
        } else {
            0.0
        };

        Self {
            episodes,
            steps,
            cumulative_reward: log.cumulative_reward(),
            on_pace_rate,
        }
    }
}

/// Release the samples of a finished episode.
///
/// `episode_index` is 0-based. The final episode of a run keeps its samples.
pub fn finish_episode(
    trajectory: &mut Trajectory,
    episode_index: usize,
    num_episodes: usize,
) -> usize {
    if episode_index + 1 < num_episodes {
        u32::try_from(episode_index + 1).map_or(0, |episode| trajectory.prune_episode(episode))
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Trajectory {
        Trajectory::from_columns(&[0, 2000, 4000], &[300, 325, 350], &[1, 1, 1]).unwrap()
    }

    #[test]
    fn test_reward_behind_is_penalized() {
        assert_eq!(reward(26, &scenario(), 2).unwrap(), -1);
    }

    #[test]
    fn test_reward_on_pace() {
        assert_eq!(reward(330, &scenario(), 2).unwrap(), 1);
    }

    #[test]
    fn test_reward_front_is_penalized() {
        assert_eq!(reward(340, &scenario(), 2).unwrap(), -1);
    }

    #[test]
    fn test_reward_missing_sample() {
        assert!(matches!(
            reward(0, &scenario(), 8),
            Err(Error::MissingSample { time_ms: 8000 })
        ));
    }

    #[test]
    fn test_race_state_advance() {
        let mut race = RaceState::new();
        race.advance(Action::Drive);
        assert_eq!(race.agent_position, 26);
        assert_eq!(race.elapsed_secs, 2);
        assert!(race.is_terminal());

        race.next_transition_secs = 6;
        race.advance(Action::Boost);
        assert_eq!(race.agent_position, 55);
        assert!(!race.is_terminal());
    }

    #[test]
    fn test_finish_episode_keeps_final_episode() {
        let mut trajectory =
            Trajectory::from_columns(&[0, 2000, 0, 2000], &[3, 30, 3, 30], &[1, 1, 2, 2])
                .unwrap();
        assert_eq!(finish_episode(&mut trajectory, 0, 1), 0);
        assert_eq!(finish_episode(&mut trajectory, 0, 2), 2);
        assert_eq!(trajectory.len(), 2);
    }

    #[test]
    fn test_reward_log_accumulates_across_episodes() {
        let mut log = RewardLog::new();
        log.record(1, -1);
        log.record(1, 1);
        let last = log.record(2, 1);

        assert_eq!(last.time_step, 3);
        assert_eq!(last.cumulative_reward, 1);
        assert_eq!(log.episode_totals(), vec![(1, 0), (2, 1)]);
    }
}
