//! Racing opponent trainer
//!
//! This crate provides:
//! - A state discretizer mapping the race onto 30 discrete states
//! - A tabular SARSA learner replaying recorded human races
//! - A neural approximator with a periodically synced target network
//! - A training session that waits on an injected trajectory provider and
//!   hands the trained policy to an injected sink
//! - CSV export of the per-step reward history

pub mod adapters;
pub mod app;
pub mod cli;
pub mod discretizer;
pub mod environment;
pub mod error;
pub mod export;
pub mod neural;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod q_learning;
pub mod trajectory;
pub mod types;

pub use error::{Error, Result};
pub use policy::{SavedPolicy, TrainedPolicy, TrainingMetadata};
pub use trajectory::{Trajectory, TrajectorySample};
pub use types::{Action, DiscreteState, RelativePosition};
