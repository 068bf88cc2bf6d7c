//! Tabular SARSA learning
//!
//! This module implements the on-policy temporal difference learner that
//! trains the opponent's action-value table from replayed human races.
//!
//! ## SARSA vs Q-learning
//!
//! | Aspect | Q-learning | SARSA |
//! |--------|------------|-------|
//! | Policy | Off-policy (learns Q*) | On-policy (learns Q^π) |
//! | Update | Uses max_a Q(s',a') | Uses actual Q(s',a') |
//!
//! The trainer uses the SARSA column: the next action is chosen before the
//! update and the same action is then executed.
//!
//! ## Usage Example
//!
//! ```no_run
//! use pacer::{
//!     ports::Learner,
//!     q_learning::{SarsaConfig, SarsaTrainer},
//!     trajectory::Trajectory,
//! };
//!
//! let config = SarsaConfig::default().with_episodes(50).with_seed(7);
//! let mut trainer = SarsaTrainer::new(&config);
//! let mut trajectory = Trajectory::from_columns(&[0, 2000], &[3, 30], &[1, 1])?;
//! trainer.train(&mut trajectory, config.episodes, &mut [])?;
//! # Ok::<(), pacer::Error>(())
//! ```

pub mod agent;
pub mod q_table;

// Public re-exports
pub use agent::{SarsaConfig, SarsaTrainer};
pub use q_table::ActionValueTable;
