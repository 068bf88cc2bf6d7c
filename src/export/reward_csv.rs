//! CSV export of the per-step reward history

use std::{fs, io::Write, path::Path};

use log::info;

use crate::{Error, Result, environment::RewardLog};

/// Column names of the exported table.
pub const REWARD_CSV_HEADER: [&str; 4] = ["TimeStep", "Episode", "Reward", "Cumulative Reward"];

/// Exporter for reward history CSV files
pub struct RewardCsvExporter;

impl RewardCsvExporter {
    /// Write one row per training step to `writer`.
    pub fn write<W: Write>(log: &RewardLog, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(REWARD_CSV_HEADER)?;

        for record in log.records() {
            csv.write_record(&[
                record.time_step.to_string(),
                record.episode.to_string(),
                record.reward.to_string(),
                record.cumulative_reward.to_string(),
            ])?;
        }

        csv.flush().map_err(|source| Error::Io {
            operation: "flush reward CSV".to_string(),
            source,
        })
    }

    /// Write the reward history to `path`, creating parent directories.
    pub fn export(log: &RewardLog, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {parent:?}"),
                source,
            })?;
        }

        let file = fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        Self::write(log, file)?;

        info!("exported {} reward rows to {}", log.len(), path.display());
        Ok(())
    }
}
