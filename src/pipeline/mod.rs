//! Training pipeline
//!
//! This module provides:
//! - A training session that waits on the trajectory provider, trains a
//!   learner and hands the policy to a sink
//! - Observers recording progress and metrics during training

pub mod observers;
pub mod training;

pub use observers::{MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{DEFAULT_EPISODES, TrainingReport, TrainingSession, TrainingSessionBuilder};

pub use crate::ports::{Learner, Observer};
