//! Export functionality for offline analysis
//!
//! Currently supports CSV export of the per-step reward history.

mod reward_csv;

pub use reward_csv::{REWARD_CSV_HEADER, RewardCsvExporter};
