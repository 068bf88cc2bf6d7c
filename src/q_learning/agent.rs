//! Tabular SARSA trainer
//!
//! Replays a recorded human trajectory episode by episode. Each step the
//! opponent holds its chosen action for [`STEP_DURATION_SECS`], is rewarded
//! for pacing alongside the human, and updates its table with the on-policy
//! rule using the next action it has already committed to.

use log::{debug, error, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    discretizer::map_state,
    environment::{
        EpisodeSummary, RaceState, RewardLog, STEP_DURATION_SECS, TrainingSummary,
        finish_episode, reward,
    },
    policy::TrainedPolicy,
    ports::{Learner, Observer},
    q_learning::q_table::ActionValueTable,
    trajectory::Trajectory,
    types::{Action, DiscreteState, NUM_ACTIONS},
};

/// Hyperparameters of the tabular learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarsaConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Episodes per training run
    pub episodes: usize,
    /// Synthetic copies requested from the provider (default `episodes / 9 - 1`)
    pub duplication_factor: Option<usize>,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl SarsaConfig {
    /// Set the number of episodes.
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    /// Set the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set how many synthetic copies of the recording to request.
    pub fn with_duplication_factor(mut self, factor: usize) -> Self {
        self.duplication_factor = Some(factor);
        self
    }

    /// Copies to request when none were configured explicitly.
    pub fn effective_duplication_factor(&self) -> usize {
        self.duplication_factor
            .unwrap_or_else(|| (self.episodes / 9).saturating_sub(1))
    }

    /// Check that the hyperparameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when a rate lies outside 0-1.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("epsilon", self.epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within 0-1, got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for SarsaConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            discount_factor: 0.9,
            epsilon: 0.1,
            episodes: 900,
            duplication_factor: None,
            seed: None,
        }
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// SARSA trainer (on-policy TD control)
///
/// Learns Q^π for the ε-greedy policy it follows.
#[derive(Debug, Clone)]
pub struct SarsaTrainer {
    q_table: ActionValueTable,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
    log: RewardLog,
}

impl SarsaTrainer {
    /// Create a new SARSA trainer with a zeroed table
    pub fn new(config: &SarsaConfig) -> Self {
        Self {
            q_table: ActionValueTable::new(config.learning_rate, config.discount_factor),
            epsilon: config.epsilon,
            rng: build_rng(config.seed),
            rng_seed: config.seed,
            log: RewardLog::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn table(&self) -> &ActionValueTable {
        &self.q_table
    }

    pub fn into_table(self) -> ActionValueTable {
        self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// ε-greedy action selection
    pub fn epsilon_greedy(&mut self, state: DiscreteState) -> Action {
        if self.rng.random::<f64>() < self.epsilon {
            // Explore: random action
            Action::ALL[self.rng.random_range(0..NUM_ACTIONS)]
        } else {
            // Exploit: greedy action based on Q-values
            self.q_table.greedy_action(state)
        }
    }

    /// Apply one SARSA backup for the transition `(s, a, r, s', a')`.
    pub fn update_q_value(
        &mut self,
        state: DiscreteState,
        action: Action,
        reward: i32,
        next_state: DiscreteState,
        next_action: Action,
    ) {
        self.q_table
            .sarsa_update(state, action, f64::from(reward), next_state, next_action);
    }

    /// Replay a single episode.
    ///
    /// `episode_index` is 0-based; logs and summaries use `episode_index + 1`.
    pub fn run_episode(
        &mut self,
        episode_index: usize,
        num_episodes: usize,
        trajectory: &mut Trajectory,
        observers: &mut [Box<dyn Observer>],
    ) -> Result<EpisodeSummary> {
        let episode = episode_index + 1;
        let mut race = RaceState::new();

        let mut state = map_state(race.elapsed_secs, race.agent_position, trajectory)?.state;
        let mut action = self.epsilon_greedy(state);

        let mut steps = 0;
        let mut total_reward = 0i64;

        while !race.is_terminal() {
            race.advance(action);

            let step_reward = reward(race.agent_position, trajectory, race.elapsed_secs)?;
            let observed = map_state(race.elapsed_secs, race.agent_position, trajectory)?;
            race.observe(&observed);

            let record = self.log.record(episode, step_reward);
            for observer in observers.iter_mut() {
                observer.on_step(&record)?;
            }

            let next_action = self.epsilon_greedy(observed.state);
            self.update_q_value(state, action, step_reward, observed.state, next_action);

            state = observed.state;
            action = next_action;
            steps += 1;
            total_reward += i64::from(step_reward);
        }

        let pruned_samples = finish_episode(trajectory, episode_index, num_episodes);
        debug!(
            "episode {episode}: {steps} steps of {STEP_DURATION_SECS}s, reward {total_reward}, pruned {pruned_samples} samples"
        );

        Ok(EpisodeSummary {
            episode,
            steps,
            total_reward,
            pruned_samples,
        })
    }

    fn reset_rng(&mut self) {
        self.rng = build_rng(self.rng_seed);
    }
}

impl Learner for SarsaTrainer {
    fn train(
        &mut self,
        trajectory: &mut Trajectory,
        num_episodes: usize,
        observers: &mut [Box<dyn Observer>],
    ) -> Result<TrainingSummary> {
        if trajectory.is_empty() {
            error!("SARSA training aborted: trajectory has no samples");
            return Err(Error::EmptyTrajectory);
        }

        info!(
            "training SARSA for {num_episodes} episodes over {} samples (α={}, γ={}, ε={})",
            trajectory.len(),
            self.q_table.learning_rate(),
            self.q_table.discount_factor(),
            self.epsilon
        );

        for observer in observers.iter_mut() {
            observer.on_training_start(num_episodes)?;
        }

        for episode_index in 0..num_episodes {
            let summary = self
                .run_episode(episode_index, num_episodes, trajectory, observers)
                .inspect_err(|err| {
                    error!("SARSA training aborted in episode {}: {err}", episode_index + 1)
                })?;
            for observer in observers.iter_mut() {
                observer.on_episode_end(&summary)?;
            }
        }

        let summary = TrainingSummary::from_log(num_episodes, &self.log);
        for observer in observers.iter_mut() {
            observer.on_training_end(&summary)?;
        }

        info!(
            "training complete: {} steps, cumulative reward {}",
            summary.steps, summary.cumulative_reward
        );
        Ok(summary)
    }

    fn name(&self) -> &str {
        "SARSA"
    }

    fn reward_log(&self) -> &RewardLog {
        &self.log
    }

    fn policy(&self) -> TrainedPolicy {
        TrainedPolicy::Tabular(self.q_table.clone())
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng_seed = Some(seed);
        self.reset_rng();
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(value: i64) -> DiscreteState {
        DiscreteState::new(value).unwrap()
    }

    fn greedy_config() -> SarsaConfig {
        SarsaConfig::default().with_epsilon(0.0).with_seed(3)
    }

    #[test]
    fn test_default_hyperparameters() {
        let config = SarsaConfig::default();
        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.discount_factor, 0.9);
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.episodes, 900);
        assert_eq!(config.effective_duplication_factor(), 99);
    }

    #[test]
    fn test_validate_rejects_out_of_range_rates() {
        let config = SarsaConfig {
            epsilon: 1.5,
            ..SarsaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_greedy_selection_breaks_ties_low() {
        let mut trainer = SarsaTrainer::new(&greedy_config());
        for _ in 0..100 {
            assert_eq!(trainer.epsilon_greedy(state(4)), Action::Drive);
        }
    }

    #[test]
    fn test_greedy_selection_follows_table() {
        let mut trainer = SarsaTrainer::new(&greedy_config());
        trainer.q_table.set(state(4), Action::Boost, 0.5);
        for _ in 0..100 {
            assert_eq!(trainer.epsilon_greedy(state(4)), Action::Boost);
        }
    }

    #[test]
    fn test_full_exploration_is_uniform() {
        let config = SarsaConfig::default().with_epsilon(1.0).with_seed(17);
        let mut trainer = SarsaTrainer::new(&config);
        trainer.q_table.set(state(4), Action::Boost, 10.0);

        let trials = 10_000;
        let drives = (0..trials)
            .filter(|_| trainer.epsilon_greedy(state(4)) == Action::Drive)
            .count();
        assert!((4_500..=5_500).contains(&drives), "drives = {drives}");
    }

    #[test]
    fn test_update_q_value_is_on_policy() {
        let mut trainer = SarsaTrainer::new(&greedy_config());
        trainer.q_table.set(state(1), Action::Drive, 0.3);
        trainer.q_table.set(state(2), Action::Drive, 2.0);
        trainer.q_table.set(state(2), Action::Boost, -1.0);

        trainer.update_q_value(state(1), Action::Drive, 1, state(2), Action::Boost);

        let expected = 0.3 + 0.05 * (1.0 + 0.9 * -1.0 - 0.3);
        assert_eq!(trainer.table().get(state(1), Action::Drive), expected);
    }

    #[test]
    fn test_single_step_episode() {
        let mut trajectory =
            Trajectory::from_columns(&[0, 2000, 4000], &[300, 325, 350], &[1, 1, 1]).unwrap();
        let mut trainer = SarsaTrainer::new(&greedy_config());

        let summary = trainer.run_episode(0, 1, &mut trajectory, &mut []).unwrap();

        assert_eq!(summary.steps, 1);
        assert_eq!(summary.total_reward, -1);
        // bootstrap state 2 took Drive, landed in state 10
        assert_eq!(trainer.table().get(state(2), Action::Drive), -0.05);
        assert_eq!(trainer.table().get(state(10), Action::Drive), 0.0);
    }

    #[test]
    fn test_train_rejects_empty_trajectory() {
        let mut trainer = SarsaTrainer::new(&greedy_config());
        let result = trainer.train(&mut Trajectory::default(), 5, &mut []);
        assert!(matches!(result, Err(Error::EmptyTrajectory)));
    }

    #[test]
    fn test_train_surfaces_missing_sample() {
        // Next transition read two samples ahead is 6 s, but nothing exists at 4 s
        let mut trajectory =
            Trajectory::from_columns(&[0, 2000, 3000, 6000], &[3, 30, 40, 80], &[1, 1, 1, 1])
                .unwrap();
        let mut trainer = SarsaTrainer::new(&greedy_config());
        let result = trainer.train(&mut trajectory, 1, &mut []);
        assert!(matches!(result, Err(Error::MissingSample { time_ms: 4000 })));
    }
}
