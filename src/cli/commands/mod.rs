//! Subcommands of the `pacer` binary

pub mod inspect;
pub mod train;
