//! Training session: waits for the trajectory, trains, hands off the policy

use std::sync::Arc;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    environment::{RewardLog, TrainingSummary},
    policy::{SavedPolicy, TrainingMetadata},
    ports::{Completion, Learner, Observer, PolicySink, TrajectoryProvider},
    q_learning::{SarsaConfig, SarsaTrainer},
};

/// Episodes trained when none are configured.
pub const DEFAULT_EPISODES: usize = 900;

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Player whose recording was replayed
    pub player_id: String,
    /// Learner that produced the policy
    pub learner: String,
    /// Policy kind handed to the sink
    pub policy_kind: String,
    /// Synthetic copies requested from the provider
    pub duplication_factor: usize,
    pub summary: TrainingSummary,
    /// Per-step reward history
    pub rewards: RewardLog,
}

/// Builder for [`TrainingSession`].
///
/// The provider and sink must be supplied; the learner defaults to a SARSA
/// trainer with default hyperparameters.
#[derive(Default)]
pub struct TrainingSessionBuilder {
    provider: Option<Box<dyn TrajectoryProvider>>,
    sink: Option<Arc<dyn PolicySink>>,
    learner: Option<Box<dyn Learner>>,
    observers: Vec<Box<dyn Observer>>,
    episodes: Option<usize>,
    duplication_factor: Option<usize>,
    seed: Option<u64>,
}

impl TrainingSessionBuilder {
    pub fn provider(mut self, provider: Box<dyn TrajectoryProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn PolicySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn learner(mut self, learner: Box<dyn Learner>) -> Self {
        self.learner = Some(learner);
        self
    }

    /// Add an observer to the session
    pub fn observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn episodes(mut self, episodes: usize) -> Self {
        self.episodes = Some(episodes);
        self
    }

    /// Synthetic copies to request (default `episodes / 9 - 1`).
    pub fn duplication_factor(mut self, factor: usize) -> Self {
        self.duplication_factor = Some(factor);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Assemble the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCollaborator`] if the provider or sink was not
    /// supplied.
    pub fn build(self) -> Result<TrainingSession> {
        let provider = self.provider.ok_or_else(|| missing("trajectory provider"))?;
        let sink = self.sink.ok_or_else(|| missing("policy sink"))?;
        let episodes = self.episodes.unwrap_or(DEFAULT_EPISODES);
        let learner = self.learner.unwrap_or_else(|| {
            Box::new(SarsaTrainer::new(
                &SarsaConfig::default().with_episodes(episodes),
            ))
        });
        let duplication_factor = self
            .duplication_factor
            .unwrap_or_else(|| (episodes / 9).saturating_sub(1));

        Ok(TrainingSession {
            provider,
            sink,
            learner,
            observers: self.observers,
            episodes,
            duplication_factor,
            seed: self.seed,
        })
    }
}

fn missing(name: &'static str) -> Error {
    error!("cannot start training: no {name} was provided");
    Error::MissingCollaborator { name }
}

async fn wait_for(name: &'static str, completion: Completion) -> Result<()> {
    match completion.await {
        Ok(result) => result,
        Err(_) => {
            error!("{name} dropped its completion signal");
            Err(Error::CollaboratorDisconnected { name })
        }
    }
}

/// One training run against a single player's recording.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use pacer::{
///     adapters::{CsvTrajectoryProvider, MsgPackPolicyStore},
///     pipeline::TrainingSession,
/// };
///
/// # async fn run() -> pacer::Result<()> {
/// let mut session = TrainingSession::builder()
///     .provider(Box::new(CsvTrajectoryProvider::new("recordings")))
///     .sink(Arc::new(MsgPackPolicyStore::new("opponent.msgpack")))
///     .episodes(90)
///     .build()?;
/// let report = session.run("player-7").await?;
/// println!("cumulative reward {}", report.summary.cumulative_reward);
/// # Ok(())
/// # }
/// ```
pub struct TrainingSession {
    provider: Box<dyn TrajectoryProvider>,
    sink: Arc<dyn PolicySink>,
    learner: Box<dyn Learner>,
    observers: Vec<Box<dyn Observer>>,
    episodes: usize,
    duplication_factor: usize,
    seed: Option<u64>,
}

impl TrainingSession {
    pub fn builder() -> TrainingSessionBuilder {
        TrainingSessionBuilder::default()
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn duplication_factor(&self) -> usize {
        self.duplication_factor
    }

    pub fn learner(&self) -> &dyn Learner {
        self.learner.as_ref()
    }

    /// Load, duplicate, train and store.
    ///
    /// The only suspension points are the two provider completions; once the
    /// trajectory is in hand training runs to completion without yielding.
    ///
    /// # Errors
    ///
    /// Fails if the provider reports an error or drops a completion, if the
    /// trajectory is empty or misaligned, or if the sink cannot store the
    /// policy.
    pub async fn run(&mut self, player_id: &str) -> Result<TrainingReport> {
        info!("loading trajectory for player '{player_id}'");
        wait_for("trajectory provider", self.provider.load_data(player_id)).await?;

        info!("requesting {} synthetic copies", self.duplication_factor);
        wait_for(
            "trajectory provider",
            self.provider.duplicate_data(self.duplication_factor),
        )
        .await?;

        let mut trajectory = self.provider.take_trajectory()?;
        if trajectory.is_empty() {
            error!("trajectory for player '{player_id}' has no samples");
            return Err(Error::EmptyTrajectory);
        }
        let available = trajectory.episode_count();
        if available < self.episodes {
            warn!(
                "trajectory holds {available} episodes but {} were requested",
                self.episodes
            );
        }

        if let Some(seed) = self.seed {
            self.learner.set_rng_seed(seed)?;
        }

        let summary = self
            .learner
            .train(&mut trajectory, self.episodes, &mut self.observers)?;

        let saved = SavedPolicy::new(
            self.learner.policy(),
            TrainingMetadata {
                player_id: Some(player_id.to_string()),
                episodes_trained: Some(summary.episodes),
                steps: Some(summary.steps),
                cumulative_reward: Some(summary.cumulative_reward),
                seed: self.seed,
            },
        );
        self.sink.store(&saved)?;

        info!(
            "{} finished {} episodes for '{player_id}' (on pace {:.1}%)",
            self.learner.name(),
            summary.episodes,
            summary.on_pace_rate * 100.0
        );

        Ok(TrainingReport {
            player_id: player_id.to_string(),
            learner: self.learner.name().to_string(),
            policy_kind: saved.policy.kind().to_string(),
            duplication_factor: self.duplication_factor,
            summary,
            rewards: self.learner.reward_log().clone(),
        })
    }
}
