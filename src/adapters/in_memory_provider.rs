//! In-memory trajectory provider for tests and demos.
//!
//! Recordings are registered up front. An optional latency makes completions
//! resolve from a background tokio task, standing in for a remote backend.

use std::{collections::HashMap, time::Duration};

use tokio::sync::oneshot;

use crate::{
    Error, Result,
    ports::{Completion, TrajectoryProvider, completed},
    trajectory::Trajectory,
};

/// Provider serving recordings from a map keyed by player id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrajectoryProvider {
    recordings: HashMap<String, Trajectory>,
    loaded: Option<Trajectory>,
    latency: Option<Duration>,
}

impl InMemoryTrajectoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the recording served for `player_id`.
    pub fn with_recording(mut self, player_id: impl Into<String>, trajectory: Trajectory) -> Self {
        self.recordings.insert(player_id.into(), trajectory);
        self
    }

    /// Delay every completion by `latency`.
    ///
    /// Delayed completions are resolved by a spawned task, so the provider
    /// must be driven from inside a tokio runtime.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn finish(&self, result: Result<()>) -> Completion {
        match self.latency {
            Some(latency) => {
                let (tx, rx) = oneshot::channel();
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    let _ = tx.send(result);
                });
                rx
            }
            None => completed(result),
        }
    }
}

impl TrajectoryProvider for InMemoryTrajectoryProvider {
    fn load_data(&mut self, player_id: &str) -> Completion {
        self.loaded = self.recordings.get(player_id).cloned();
        let result = match self.loaded {
            Some(_) => Ok(()),
            None => Err(Error::Io {
                operation: format!("load recording for player '{player_id}'"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such recording"),
            }),
        };
        self.finish(result)
    }

    fn duplicate_data(&mut self, factor: usize) -> Completion {
        let result = match self.loaded.as_mut() {
            Some(trajectory) => trajectory.duplicate(factor),
            None => Err(Error::DataNotLoaded),
        };
        self.finish(result)
    }

    fn take_trajectory(&mut self) -> Result<Trajectory> {
        self.loaded.take().ok_or(Error::DataNotLoaded)
    }
}
