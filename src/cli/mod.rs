//! CLI infrastructure for the opponent trainer
//!
//! This module provides the command-line interface for training opponents
//! from recorded races and inspecting the stored policies.

pub mod commands;
pub mod output;
