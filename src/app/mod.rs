//! Application layer with dependency injection container.
//!
//! The container owns infrastructure dependencies (the policy sink, the
//! default seed) and creates learners and training sessions from a
//! [`TrainerConfig`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │           App (DI Container)         │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                      │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - CsvTrajectoryProvider             │   │
//! │  │  - MsgPackPolicyStore                │   │
//! │  │  - InMemory* (testing)               │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - TrajectoryProvider, PolicySink    │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                   │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic                        │   │
//! │  │  - SarsaTrainer, DeepQTrainer        │   │
//! │  │  - TrainingSession                   │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod container;

pub use config::{LearnerKind, TrainerConfig};
pub use container::{App, AppBuilder};
