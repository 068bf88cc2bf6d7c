//! Trained policies and their on-disk format.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    neural::NetworkParameters,
    q_learning::ActionValueTable,
    types::{Action, DiscreteState},
};

/// What a learner hands to the runtime opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainedPolicy {
    Tabular(ActionValueTable),
    Network(NetworkParameters),
}

impl TrainedPolicy {
    pub fn kind(&self) -> &'static str {
        match self {
            TrainedPolicy::Tabular(_) => "sarsa",
            TrainedPolicy::Network(_) => "deep_q",
        }
    }

    /// Greedy action for a discrete state, when the policy is tabular.
    pub fn tabular_action(&self, state: DiscreteState) -> Option<Action> {
        match self {
            TrainedPolicy::Tabular(table) => Some(table.greedy_action(state)),
            TrainedPolicy::Network(_) => None,
        }
    }
}

/// Metadata about the training process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Player whose recording was replayed
    pub player_id: Option<String>,
    /// Number of episodes trained
    pub episodes_trained: Option<usize>,
    /// Number of steps taken across all episodes
    pub steps: Option<usize>,
    /// Cumulative reward at the end of the run
    pub cumulative_reward: Option<i64>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
}

/// Versioned envelope written by policy sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPolicy {
    pub version: u32,
    pub policy: TrainedPolicy,
    pub metadata: TrainingMetadata,
}

impl SavedPolicy {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn new(policy: TrainedPolicy, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            policy,
            metadata,
        }
    }

    /// Reject envelopes written by an incompatible version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when `version` is not
    /// [`SavedPolicy::VERSION`].
    pub fn validate(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(())
    }

    /// Encode the envelope as MessagePack. The caller owns flushing.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        rmp_serde::encode::write(writer, self).map_err(|e| Error::SerializationContext {
            operation: "serialize policy to MessagePack".to_string(),
            message: e.to_string(),
        })
    }

    /// Decode a MessagePack envelope and check its version.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let saved: Self =
            rmp_serde::from_read(reader).map_err(|e| Error::SerializationContext {
                operation: "deserialize policy from MessagePack".to_string(),
                message: e.to_string(),
            })?;
        saved.validate()?;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_tabular_roundtrip() -> anyhow::Result<()> {
        let mut table = ActionValueTable::new(0.05, 0.9);
        let state = DiscreteState::new(10).unwrap();
        table.set(state, Action::Boost, 0.75);

        let saved = SavedPolicy::new(
            TrainedPolicy::Tabular(table),
            TrainingMetadata {
                episodes_trained: Some(3),
                ..TrainingMetadata::default()
            },
        );
        let mut bytes = Vec::new();
        saved.write_to(&mut bytes)?;
        let loaded = SavedPolicy::read_from(bytes.as_slice())?;

        assert_eq!(loaded, saved);
        assert_eq!(loaded.policy.tabular_action(state), Some(Action::Boost));
        Ok(())
    }

    #[test]
    fn test_network_roundtrip() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(5);
        let parameters = NetworkParameters::xavier(3, 4, 2, &mut rng);
        let saved = SavedPolicy::new(
            TrainedPolicy::Network(parameters),
            TrainingMetadata::default(),
        );

        let bytes = rmp_serde::to_vec(&saved)?;
        let loaded: SavedPolicy = rmp_serde::from_slice(&bytes)?;

        assert_eq!(loaded, saved);
        assert_eq!(loaded.policy.kind(), "deep_q");
        Ok(())
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut saved = SavedPolicy::new(
            TrainedPolicy::Tabular(ActionValueTable::new(0.05, 0.9)),
            TrainingMetadata::default(),
        );
        saved.version = 99;
        assert!(matches!(
            saved.validate(),
            Err(Error::UnsupportedVersion {
                found: 99,
                expected: 1
            })
        ));

        let mut bytes = Vec::new();
        saved.write_to(&mut bytes).unwrap();
        assert!(matches!(
            SavedPolicy::read_from(bytes.as_slice()),
            Err(Error::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_read_rejects_garbage() {
        assert!(matches!(
            SavedPolicy::read_from(&[0xc1_u8, 0x00][..]),
            Err(Error::SerializationContext { .. })
        ));
    }
}
