//! Training session tests: collaborator wiring and completion signals.

mod common;

use std::{sync::Arc, time::Duration};

use common::{STEPS_PER_EPISODE, steady_recording};
use pacer::{
    Error, TrainedPolicy,
    adapters::{InMemoryPolicyStore, InMemoryTrajectoryProvider},
    neural::{DeepQTrainer, NetworkConfig},
    pipeline::{MetricsObserver, TrainingSession},
    ports::{Completion, TrajectoryProvider, completed},
    trajectory::Trajectory,
};
use tokio::sync::oneshot;

/// Provider that drops the duplication completion without answering.
struct HangingProvider {
    inner: InMemoryTrajectoryProvider,
}

impl TrajectoryProvider for HangingProvider {
    fn load_data(&mut self, player_id: &str) -> Completion {
        self.inner.load_data(player_id)
    }

    fn duplicate_data(&mut self, _factor: usize) -> Completion {
        let (_tx, rx) = oneshot::channel();
        rx
    }

    fn take_trajectory(&mut self) -> pacer::Result<Trajectory> {
        self.inner.take_trajectory()
    }
}

/// Provider that reports an empty recording.
struct EmptyProvider;

impl TrajectoryProvider for EmptyProvider {
    fn load_data(&mut self, _player_id: &str) -> Completion {
        completed(Ok(()))
    }

    fn duplicate_data(&mut self, _factor: usize) -> Completion {
        completed(Ok(()))
    }

    fn take_trajectory(&mut self) -> pacer::Result<Trajectory> {
        Ok(Trajectory::default())
    }
}

fn provider_for(player: &str) -> InMemoryTrajectoryProvider {
    InMemoryTrajectoryProvider::new().with_recording(player, steady_recording(1))
}

#[tokio::test]
async fn session_waits_for_delayed_provider() {
    let store = InMemoryPolicyStore::new();
    let metrics = MetricsObserver::new();
    let provider = provider_for("ada").with_latency(Duration::from_millis(20));

    let mut session = TrainingSession::builder()
        .provider(Box::new(provider))
        .sink(Arc::new(store.clone()))
        .observer(Box::new(metrics.clone()))
        .episodes(3)
        .duplication_factor(2)
        .seed(17)
        .build()
        .unwrap();

    let report = session.run("ada").await.unwrap();

    assert_eq!(report.player_id, "ada");
    assert_eq!(report.learner, "SARSA");
    assert_eq!(report.policy_kind, "sarsa");
    assert_eq!(report.summary.steps, 3 * STEPS_PER_EPISODE);
    assert_eq!(report.rewards.len(), report.summary.steps);
    assert_eq!(metrics.summary().episode_rewards, vec![3, 3, 3]);

    assert_eq!(store.writes(), 1);
    let saved = store.latest().unwrap().unwrap();
    assert!(matches!(saved.policy, TrainedPolicy::Tabular(_)));
    assert_eq!(saved.metadata.player_id.as_deref(), Some("ada"));
    assert_eq!(saved.metadata.episodes_trained, Some(3));
    assert_eq!(saved.metadata.seed, Some(17));
}

#[tokio::test]
async fn deep_q_learner_hands_off_network() {
    let store = InMemoryPolicyStore::new();
    let learner = DeepQTrainer::new(NetworkConfig::default().with_seed(2)).unwrap();

    let mut session = TrainingSession::builder()
        .provider(Box::new(provider_for("bo")))
        .sink(Arc::new(store.clone()))
        .learner(Box::new(learner))
        .episodes(2)
        .duplication_factor(1)
        .build()
        .unwrap();

    let report = session.run("bo").await.unwrap();

    assert_eq!(report.learner, "Deep-Q");
    assert_eq!(report.summary.cumulative_reward, 6);
    let saved = store.latest().unwrap().unwrap();
    let TrainedPolicy::Network(parameters) = saved.policy else {
        panic!("expected network parameters");
    };
    assert_eq!(parameters.input_size(), 3);
    assert_eq!(parameters.hidden_size(), 16);
    assert_eq!(parameters.output_size(), 2);
}

#[tokio::test]
async fn session_seed_reproduces_unseeded_deep_q() {
    async fn run_seeded() -> Vec<u8> {
        let store = InMemoryPolicyStore::new();
        let learner = DeepQTrainer::new(NetworkConfig::default()).unwrap();
        let mut session = TrainingSession::builder()
            .provider(Box::new(provider_for("cy")))
            .sink(Arc::new(store.clone()))
            .learner(Box::new(learner))
            .episodes(2)
            .duplication_factor(1)
            .seed(17)
            .build()
            .unwrap();

        session.run("cy").await.unwrap();
        let saved = store.latest().unwrap().unwrap();
        assert_eq!(saved.metadata.seed, Some(17));
        rmp_serde::to_vec(&saved.policy).unwrap()
    }

    // Compared as encodings since diverged weights may be NaN
    assert_eq!(run_seeded().await, run_seeded().await);
}

#[tokio::test]
async fn dropped_completion_is_reported() {
    let store = InMemoryPolicyStore::new();
    let mut session = TrainingSession::builder()
        .provider(Box::new(HangingProvider {
            inner: provider_for("ada"),
        }))
        .sink(Arc::new(store.clone()))
        .episodes(1)
        .build()
        .unwrap();

    let result = session.run("ada").await;

    assert!(matches!(
        result,
        Err(Error::CollaboratorDisconnected {
            name: "trajectory provider"
        })
    ));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn unknown_player_fails_before_training() {
    let store = InMemoryPolicyStore::new();
    let mut session = TrainingSession::builder()
        .provider(Box::new(provider_for("ada")))
        .sink(Arc::new(store.clone()))
        .episodes(1)
        .build()
        .unwrap();

    assert!(session.run("ghost").await.is_err());
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn empty_recording_is_a_precondition_violation() {
    let store = InMemoryPolicyStore::new();
    let mut session = TrainingSession::builder()
        .provider(Box::new(EmptyProvider))
        .sink(Arc::new(store.clone()))
        .episodes(1)
        .build()
        .unwrap();

    assert!(matches!(
        session.run("anyone").await,
        Err(Error::EmptyTrajectory)
    ));
    assert_eq!(store.writes(), 0);
}

#[test]
fn missing_sink_is_rejected() {
    let result = TrainingSession::builder()
        .provider(Box::new(provider_for("ada")))
        .build();

    assert!(matches!(
        result,
        Err(Error::MissingCollaborator {
            name: "policy sink"
        })
    ));
}
