//! Neural function approximator
//!
//! A 3-16-2 sigmoid network estimating the value of Drive and Boost from the
//! continuous race observation, trained against a periodically synced target
//! network.

pub mod network;
pub mod trainer;

pub use network::{ForwardPass, NetworkParameters, QNetwork, TargetNetwork, sigmoid};
pub use trainer::{DeepQTrainer, FEATURE_COUNT, NetworkConfig};
