//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the training core and its
//! collaborators. Following hexagonal architecture, these traits are owned by
//! the domain and implemented by adapters in the infrastructure layer.

pub mod learner;
pub mod observer;
pub mod provider;
pub mod sink;

pub use learner::Learner;
pub use observer::Observer;
pub use provider::{Completion, TrajectoryProvider, completed};
pub use sink::PolicySink;
