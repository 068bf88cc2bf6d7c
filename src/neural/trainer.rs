//! Deep Q trainer replaying the same race environment as the tabular learner
//!
//! Features are the raw continuous observation: opponent position, opponent
//! minus human position, and elapsed time in milliseconds. Targets bootstrap
//! from the target network and the target is re-synced every
//! `target_sync_interval` updates.

use log::{debug, error, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    discretizer::map_state,
    environment::{
        EpisodeSummary, RaceState, RewardLog, TrainingSummary, finish_episode, reward,
    },
    neural::network::QNetwork,
    policy::TrainedPolicy,
    ports::{Learner, Observer},
    trajectory::Trajectory,
    types::{Action, NUM_ACTIONS},
};

/// Number of features the trainer feeds the network.
pub const FEATURE_COUNT: usize = 3;

/// Network shape and training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    /// SGD step size
    pub learning_rate: f32,
    /// Discount factor γ
    pub discount_factor: f32,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Updates between target network refreshes
    pub target_sync_interval: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl NetworkConfig {
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_target_sync_interval(mut self, interval: usize) -> Self {
        self.target_sync_interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the configuration describes a trainable network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when the input or output size
    /// does not match the race features and actions, or a rate is invalid.
    pub fn validate(&self) -> Result<()> {
        let problem = if self.input_size != FEATURE_COUNT {
            Some(format!(
                "input_size must be {FEATURE_COUNT}, got {}",
                self.input_size
            ))
        } else if self.output_size != NUM_ACTIONS {
            Some(format!(
                "output_size must be {NUM_ACTIONS}, got {}",
                self.output_size
            ))
        } else if self.hidden_size == 0 {
            Some("hidden_size must be positive".to_string())
        } else if self.target_sync_interval == 0 {
            Some("target_sync_interval must be positive".to_string())
        } else if !(0.0..=1.0).contains(&self.epsilon) {
            Some(format!("epsilon must be within 0-1, got {}", self.epsilon))
        } else {
            None
        };

        match problem {
            Some(message) => Err(Error::InvalidConfiguration { message }),
            None => Ok(()),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_size: FEATURE_COUNT,
            hidden_size: 16,
            output_size: NUM_ACTIONS,
            learning_rate: 0.001,
            discount_factor: 0.9,
            epsilon: 0.1,
            target_sync_interval: 50,
            seed: None,
        }
    }
}

/// Continuous observation fed to the network.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Features {
    x_position: f32,
    rel_position: f32,
    time_ms: f32,
}

impl Features {
    fn observe(race: &RaceState, reference_position: i32) -> Self {
        Self {
            x_position: race.agent_position as f32,
            rel_position: (race.agent_position - reference_position) as f32,
            time_ms: race.elapsed_ms() as f32,
        }
    }
}

/// ε-greedy deep Q trainer.
#[derive(Debug, Clone)]
pub struct DeepQTrainer {
    network: QNetwork,
    config: NetworkConfig,
    rng: StdRng,
    updates: usize,
    log: RewardLog,
}

impl DeepQTrainer {
    /// Create a trainer with a freshly initialized network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let network = Self::initial_network(&config, &mut rng);

        Ok(Self {
            network,
            config,
            rng,
            updates: 0,
            log: RewardLog::new(),
        })
    }

    fn initial_network(config: &NetworkConfig, rng: &mut StdRng) -> QNetwork {
        QNetwork::new(
            config.input_size,
            config.hidden_size,
            config.output_size,
            rng,
        )
    }

    pub fn network(&self) -> &QNetwork {
        &self.network
    }

    /// Gradient steps applied so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    fn epsilon_greedy(&mut self, features: Features) -> Result<Action> {
        if self.rng.random::<f64>() < self.config.epsilon {
            Ok(Action::ALL[self.rng.random_range(0..NUM_ACTIONS)])
        } else {
            self.network
                .best_action(features.x_position, features.rel_position, features.time_ms)
        }
    }

    /// Replay a single episode, training after every step.
    pub fn run_episode(
        &mut self,
        episode_index: usize,
        num_episodes: usize,
        trajectory: &mut Trajectory,
        observers: &mut [Box<dyn Observer>],
    ) -> Result<EpisodeSummary> {
        let episode = episode_index + 1;
        let mut race = RaceState::new();

        let initial = map_state(race.elapsed_secs, race.agent_position, trajectory)?;
        let mut features = Features::observe(&race, initial.reference_position);
        let mut action = self.epsilon_greedy(features)?;

        let mut steps = 0;
        let mut total_reward = 0i64;

        while !race.is_terminal() {
            race.advance(action);

            let step_reward = reward(race.agent_position, trajectory, race.elapsed_secs)?;
            let observed = map_state(race.elapsed_secs, race.agent_position, trajectory)?;
            race.observe(&observed);
            let next_features = Features::observe(&race, observed.reference_position);

            let record = self.log.record(episode, step_reward);
            for observer in observers.iter_mut() {
                observer.on_step(&record)?;
            }

            let target = if race.is_terminal() {
                step_reward as f32
            } else {
                step_reward as f32
                    + self.config.discount_factor
                        * self.network.max_q_value(
                            next_features.x_position,
                            next_features.rel_position,
                            next_features.time_ms,
                        )?
            };

            self.network.sgd_update(
                features.x_position,
                features.rel_position,
                features.time_ms,
                target,
                self.config.learning_rate,
            )?;
            self.updates += 1;
            if self.updates % self.config.target_sync_interval == 0 {
                self.network.sync_target();
            }

            features = next_features;
            action = self.epsilon_greedy(features)?;
            steps += 1;
            total_reward += i64::from(step_reward);
        }

        let pruned_samples = finish_episode(trajectory, episode_index, num_episodes);
        debug!("episode {episode}: {steps} steps, reward {total_reward}");

        Ok(EpisodeSummary {
            episode,
            steps,
            total_reward,
            pruned_samples,
        })
    }
}

impl Learner for DeepQTrainer {
    fn train(
        &mut self,
        trajectory: &mut Trajectory,
        num_episodes: usize,
        observers: &mut [Box<dyn Observer>],
    ) -> Result<TrainingSummary> {
        if trajectory.is_empty() {
            error!("deep Q training aborted: trajectory has no samples");
            return Err(Error::EmptyTrajectory);
        }

        info!(
            "training deep Q network ({}-{}-{}) for {num_episodes} episodes",
            self.config.input_size, self.config.hidden_size, self.config.output_size
        );

        for observer in observers.iter_mut() {
            observer.on_training_start(num_episodes)?;
        }

        for episode_index in 0..num_episodes {
            let summary = self
                .run_episode(episode_index, num_episodes, trajectory, observers)
                .inspect_err(|err| {
                    error!(
                        "deep Q training aborted in episode {}: {err}",
                        episode_index + 1
                    )
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
            "training complete: {} updates, cumulative reward {}",
            self.updates, summary.cumulative_reward
        );
        Ok(summary)
    }

    fn name(&self) -> &str {
        "Deep-Q"
    }

    fn reward_log(&self) -> &RewardLog {
        &self.log
    }

    fn policy(&self) -> TrainedPolicy {
        TrainedPolicy::Network(self.network.parameters().clone())
    }

    /// Reseed exploration. An untrained network is also re-initialized from
    /// `seed`, matching a trainer built with that seed.
    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        if self.updates == 0 {
            self.network = Self::initial_network(&self.config, &mut rng);
        } else {
            warn!(
                "reseeding exploration only: network already has {} updates",
                self.updates
            );
        }
        self.config.seed = Some(seed);
        self.rng = rng;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
