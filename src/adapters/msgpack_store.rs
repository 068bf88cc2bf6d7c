//! MessagePack file sink for trained policies.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;

use crate::{Error, Result, policy::SavedPolicy, ports::PolicySink};

/// Writes the trained policy to a single MessagePack file.
///
/// # Examples
///
/// ```no_run
/// use pacer::adapters::MsgPackPolicyStore;
///
/// let store = MsgPackPolicyStore::new("opponent.msgpack");
/// let saved = store.load()?;
/// println!("{} policy", saved.policy.kind());
/// # Ok::<(), pacer::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MsgPackPolicyStore {
    path: PathBuf,
}

impl MsgPackPolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back a stored policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be decoded or was
    /// written by an incompatible format version.
    pub fn load(&self) -> Result<SavedPolicy> {
        let file = File::open(&self.path).map_err(|source| Error::Io {
            operation: format!("open file {:?}", self.path),
            source,
        })?;

        SavedPolicy::read_from(BufReader::new(file))
    }
}

impl PolicySink for MsgPackPolicyStore {
    fn store(&self, policy: &SavedPolicy) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {parent:?}"),
                source,
            })?;
        }

        let file = File::create(&self.path).map_err(|source| Error::Io {
            operation: format!("create file {:?}", self.path),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        policy.write_to(&mut writer)?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush policy file {:?}", self.path),
            source,
        })?;

        info!("stored {} policy at {}", policy.policy.kind(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::{
        policy::{TrainedPolicy, TrainingMetadata},
        q_learning::ActionValueTable,
        types::{Action, DiscreteState},
    };

    #[test]
    fn test_store_and_load() {
        let dir = tempdir().unwrap();
        let store = MsgPackPolicyStore::new(dir.path().join("nested/opponent.msgpack"));

        let mut table = ActionValueTable::new(0.05, 0.9);
        let state = DiscreteState::new(12).unwrap();
        table.set(state, Action::Boost, 2.0);
        let saved = SavedPolicy::new(
            TrainedPolicy::Tabular(table),
            TrainingMetadata {
                player_id: Some("ada".to_string()),
                ..TrainingMetadata::default()
            },
        );

        store.store(&saved).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.policy.tabular_action(state), Some(Action::Boost));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = MsgPackPolicyStore::new(dir.path().join("absent.msgpack"));
        assert!(matches!(store.load(), Err(Error::Io { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_store_reports_failed_write() {
        // Small policies sit in the write buffer until flushed
        let store = MsgPackPolicyStore::new("/dev/full");
        let saved = SavedPolicy::new(
            TrainedPolicy::Tabular(ActionValueTable::new(0.05, 0.9)),
            TrainingMetadata::default(),
        );

        let result = store.store(&saved);

        assert!(
            matches!(result, Err(Error::Io { ref operation, .. }) if operation.starts_with("flush")),
            "unexpected result: {result:?}"
        );
    }
}
