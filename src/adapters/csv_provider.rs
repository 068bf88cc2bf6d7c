//! CSV-backed trajectory provider.
//!
//! Recordings live in one directory, one file per player, named
//! `<player_id>.csv` with a `time_ms,position,episode` header.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::{
    Error, Result,
    ports::{Completion, TrajectoryProvider, completed},
    trajectory::{Trajectory, TrajectorySample},
};

#[derive(Debug, Deserialize)]
struct Row {
    time_ms: i64,
    position: i32,
    episode: u32,
}

impl From<Row> for TrajectorySample {
    fn from(row: Row) -> Self {
        TrajectorySample::new(row.time_ms, row.position, row.episode)
    }
}

/// Reads recorded races from `<root>/<player_id>.csv`.
///
/// # Examples
///
/// ```no_run
/// use pacer::adapters::CsvTrajectoryProvider;
/// use pacer::ports::TrajectoryProvider;
///
/// # async fn load() -> pacer::Result<()> {
/// let mut provider = CsvTrajectoryProvider::new("recordings");
/// provider.load_data("player-7").await.ok();
/// let trajectory = provider.take_trajectory()?;
/// println!("{} samples", trajectory.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvTrajectoryProvider {
    root: PathBuf,
    loaded: Option<Trajectory>,
}

impl CsvTrajectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: None,
        }
    }

    /// File a player's recording is read from.
    pub fn path_for(&self, player_id: &str) -> PathBuf {
        self.root.join(format!("{player_id}.csv"))
    }

    /// Parse a recording file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened and [`Error::Csv`]
    /// if a row is malformed.
    pub fn read_file(path: &Path) -> Result<Trajectory> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| match err.into_kind() {
            csv::ErrorKind::Io(source) => Error::Io {
                operation: format!("open trajectory file {}", path.display()),
                source,
            },
            kind => Error::SerializationContext {
                operation: format!("open trajectory file {}", path.display()),
                message: format!("{kind:?}"),
            },
        })?;

        let samples = reader
            .deserialize::<Row>()
            .map(|row| row.map(TrajectorySample::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Trajectory::new(samples))
    }
}

impl TrajectoryProvider for CsvTrajectoryProvider {
    fn load_data(&mut self, player_id: &str) -> Completion {
        self.loaded = None;
        let path = self.path_for(player_id);
        let result = Self::read_file(&path).map(|trajectory| {
            info!(
                "loaded {} samples over {} episodes from {}",
                trajectory.len(),
                trajectory.episode_count(),
                path.display()
            );
            if trajectory.is_empty() {
                warn!("recording {} has no samples", path.display());
            }
            self.loaded = Some(trajectory);
        });
        completed(result)
    }

    fn duplicate_data(&mut self, factor: usize) -> Completion {
        let result = match self.loaded.as_mut() {
            Some(trajectory) => trajectory.duplicate(factor),
            None => Err(Error::DataNotLoaded),
        };
        completed(result)
    }

    fn take_trajectory(&mut self) -> Result<Trajectory> {
        self.loaded.take().ok_or(Error::DataNotLoaded)
    }
}
