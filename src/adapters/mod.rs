//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod csv_provider;
pub mod in_memory_provider;
pub mod in_memory_store;
pub mod msgpack_store;

pub use csv_provider::CsvTrajectoryProvider;
pub use in_memory_provider::InMemoryTrajectoryProvider;
pub use in_memory_store::InMemoryPolicyStore;
pub use msgpack_store::MsgPackPolicyStore;
