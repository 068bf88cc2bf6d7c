//! Configuration types for trainer creation.

use std::{fmt, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, neural::NetworkConfig, pipeline::DEFAULT_EPISODES, q_learning::SarsaConfig,
};

/// Which learner a run trains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearnerKind {
    /// Tabular SARSA over the 30 discrete states
    #[default]
    Sarsa,
    /// Neural approximator with a target network
    DeepQ,
}

impl fmt::Display for LearnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnerKind::Sarsa => write!(f, "sarsa"),
            LearnerKind::DeepQ => write!(f, "deep-q"),
        }
    }
}

/// Configuration for a training run.
///
/// Loadable from JSON; any field left out takes its default. Run-level
/// settings at the top level win over the `sarsa` section's `episodes` and
/// `duplication_factor`, which apply only when the top level leaves them out
/// and the learner is SARSA.
///
/// # Examples
///
/// ```
/// use pacer::app::{LearnerKind, TrainerConfig};
///
/// let config = TrainerConfig::default()
///     .with_learner(LearnerKind::DeepQ)
///     .with_episodes(90)
///     .with_seed(42);
/// assert_eq!(config.effective_duplication_factor(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub learner: LearnerKind,
    /// Episodes per training run
    pub episodes: Option<usize>,
    /// Synthetic copies requested from the provider
    pub duplication_factor: Option<usize>,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    pub sarsa: SarsaConfig,
    pub network: NetworkConfig,
}

impl TrainerConfig {
    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened and
    /// [`Error::Serialization`] if it is not valid JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config file {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_learner(mut self, learner: LearnerKind) -> Self {
        self.learner = learner;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = Some(episodes);
        self
    }

    pub fn with_duplication_factor(mut self, factor: usize) -> Self {
        self.duplication_factor = Some(factor);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Episodes the run trains.
    pub fn effective_episodes(&self) -> usize {
        self.episodes.unwrap_or(match self.learner {
            LearnerKind::Sarsa => self.sarsa.episodes,
            LearnerKind::DeepQ => DEFAULT_EPISODES,
        })
    }

    /// Copies to request, derived from the episode count when none were
    /// configured explicitly.
    pub fn effective_duplication_factor(&self) -> usize {
        let nested = match self.learner {
            LearnerKind::Sarsa => self.sarsa.duplication_factor,
            LearnerKind::DeepQ => None,
        };
        self.duplication_factor
            .or(nested)
            .unwrap_or_else(|| (self.effective_episodes() / 9).saturating_sub(1))
    }

    /// Check the settings of the selected learner.
    pub fn validate(&self) -> Result<()> {
        if self.effective_episodes() == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episodes must be positive".to_string(),
            });
        }
        match self.learner {
            LearnerKind::Sarsa => self.sarsa.validate(),
            LearnerKind::DeepQ => self.network.validate(),
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learner: LearnerKind::default(),
            episodes: None,
            duplication_factor: None,
            seed: None,
            sarsa: SarsaConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}
