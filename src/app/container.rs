//! Dependency injection container for the trainer.
//!
//! The container owns the policy sink and the default seed, and wires them
//! into learners and training sessions.

use std::{path::Path, sync::Arc};

use super::config::{LearnerKind, TrainerConfig};
use crate::{
    Result,
    adapters::MsgPackPolicyStore,
    neural::DeepQTrainer,
    pipeline::TrainingSessionBuilder,
    policy::SavedPolicy,
    ports::{Learner, PolicySink, TrajectoryProvider},
    q_learning::SarsaTrainer,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use pacer::app::{App, TrainerConfig};
///
/// let app = App::new();
/// let learner = app.create_learner(&TrainerConfig::default().with_seed(42))?;
/// assert_eq!(learner.name(), "SARSA");
/// # Ok::<(), pacer::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use pacer::adapters::InMemoryPolicyStore;
/// use pacer::app::App;
///
/// let app = App::for_testing()
///     .with_policy_sink(InMemoryPolicyStore::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Sink used in place of the per-path MessagePack store
    policy_sink: Option<Arc<dyn PolicySink>>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Policies are written with [`MsgPackPolicyStore`] and the RNG is not
    /// seeded.
    pub fn new() -> Self {
        Self {
            policy_sink: None,
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Sink a trained policy destined for `path` is handed to.
    pub fn policy_sink(&self, path: &Path) -> Arc<dyn PolicySink> {
        match &self.policy_sink {
            Some(sink) => Arc::clone(sink),
            None => Arc::new(MsgPackPolicyStore::new(path)),
        }
    }

    /// Create the learner selected by `config`.
    ///
    /// The seed comes from the config, falling back to the container default.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the selected
    /// learner's settings are invalid.
    pub fn create_learner(&self, config: &TrainerConfig) -> Result<Box<dyn Learner>> {
        config.validate()?;
        let seed = config.seed.or(self.default_seed);

        let learner: Box<dyn Learner> = match config.learner {
            LearnerKind::Sarsa => {
                let mut sarsa = config.sarsa.clone().with_episodes(config.effective_episodes());
                if let Some(seed) = seed {
                    sarsa = sarsa.with_seed(seed);
                }
                Box::new(SarsaTrainer::new(&sarsa))
            }
            LearnerKind::DeepQ => {
                let mut network = config.network.clone();
                if let Some(seed) = seed {
                    network = network.with_seed(seed);
                }
                Box::new(DeepQTrainer::new(network)?)
            }
        };
        Ok(learner)
    }

    /// Start a training session wired with `provider` and `sink`.
    ///
    /// Observers can still be added to the returned builder.
    pub fn training_session(
        &self,
        config: &TrainerConfig,
        provider: Box<dyn TrajectoryProvider>,
        sink: Arc<dyn PolicySink>,
    ) -> Result<TrainingSessionBuilder> {
        let mut builder = TrainingSessionBuilder::default()
            .provider(provider)
            .sink(sink)
            .learner(self.create_learner(config)?)
            .episodes(config.effective_episodes())
            .duplication_factor(config.effective_duplication_factor());
        if let Some(seed) = config.seed.or(self.default_seed) {
            builder = builder.seed(seed);
        }
        Ok(builder)
    }

    /// Load a stored policy from a MessagePack file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pacer::app::App;
    /// use std::path::Path;
    ///
    /// let app = App::new();
    /// let saved = app.load_policy(Path::new("opponent.msgpack"))?;
    /// # Ok::<(), pacer::Error>(())
    /// ```
    pub fn load_policy(&self, path: &Path) -> Result<SavedPolicy> {
        MsgPackPolicyStore::new(path).load()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject an in-memory sink and control
/// randomness.
pub struct AppBuilder {
    policy_sink: Option<Arc<dyn PolicySink>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            policy_sink: None,
            default_seed: None,
        }
    }

    /// Route every stored policy to `sink`.
    pub fn with_policy_sink<S: PolicySink + 'static>(mut self, sink: S) -> Self {
        self.policy_sink = Some(Arc::new(sink));
        self
    }

    /// Set a default random seed for all learners created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app.
    pub fn build(self) -> App {
        App {
            policy_sink: self.policy_sink,
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::InMemoryPolicyStore,
        policy::{TrainedPolicy, TrainingMetadata},
        q_learning::ActionValueTable,
    };

    #[test]
    fn test_create_learner_by_kind() {
        let app = App::for_testing().with_default_seed(7).build();

        let sarsa = app.create_learner(&TrainerConfig::default()).unwrap();
        assert_eq!(sarsa.name(), "SARSA");

        let deep = app
            .create_learner(&TrainerConfig::default().with_learner(LearnerKind::DeepQ))
            .unwrap();
        assert_eq!(deep.name(), "Deep-Q");
        assert!(deep.as_any().downcast_ref::<DeepQTrainer>().is_some());
    }

    #[test]
    fn test_injected_sink_is_shared() {
        let store = InMemoryPolicyStore::new();
        let app = App::for_testing().with_policy_sink(store.clone()).build();

        let sink = app.policy_sink(Path::new("ignored.msgpack"));
        sink.store(&SavedPolicy::new(
            TrainedPolicy::Tabular(ActionValueTable::new(0.05, 0.9)),
            TrainingMetadata::default(),
        ))
        .unwrap();

        assert_eq!(store.writes(), 1);
    }
}
