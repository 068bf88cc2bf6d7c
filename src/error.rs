//! Error types for the pacer crate

use thiserror::Error;

/// Main error type for the pacer crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("trajectory has no samples")]
    EmptyTrajectory,

    #[error("trajectory data has not been loaded")]
    DataNotLoaded,

    #[error("no trajectory sample recorded at {time_ms} ms")]
    MissingSample { time_ms: i64 },

    #[error(
        "state {state} is outside 1-30 (reference position {reference_position}, agent position {agent_position})"
    )]
    StateOutOfRange {
        state: i64,
        reference_position: i32,
        agent_position: i32,
    },

    #[error("duplicating episodes up to {last_episode} {copies} times overflows the episode number")]
    EpisodeNumberOverflow { last_episode: u32, copies: usize },

    #[error("sample time {time_ms} ms does not fit in whole seconds")]
    TimeOutOfRange { time_ms: i64 },

    #[error("invalid action index {index} (expected 0 or 1)")]
    InvalidAction { index: usize },

    #[error(
        "trajectory columns differ in length: times={times}, positions={positions}, episodes={episodes}"
    )]
    TrajectoryShape {
        times: usize,
        positions: usize,
        episodes: usize,
    },

    #[error("network {what} has shape {got:?}, expected {expected:?}")]
    NetworkShape {
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("required collaborator '{name}' was not provided")]
    MissingCollaborator { name: &'static str },

    #[error("collaborator '{name}' dropped its completion signal before finishing")]
    CollaboratorDisconnected { name: &'static str },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("unsupported policy format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
