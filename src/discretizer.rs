//! Maps continuous race state onto the 30 discrete SARSA states
//!
//! The state is built from the human's current position interval (hundreds
//! of track units) and the opponent's [`RelativePosition`] bucket:
//!
//! ```text
//! state = (reference_position / 100) * 3 + bucket + 1
//! ```

use crate::{
    Error, Result,
    environment::{BOOTSTRAP_REFERENCE_POSITION, EXHAUSTED_TRANSITION_SECS},
    trajectory::Trajectory,
    types::{DiscreteState, NUM_RELATIVE_POSITIONS, RelativePosition},
};

/// Result of discretizing one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discretized {
    pub state: DiscreteState,
    /// Human position the opponent is measured against
    pub reference_position: i32,
    /// Episode end time read two samples ahead; `None` at the bootstrap step
    pub next_transition_secs: Option<i32>,
}

/// Discretize `(elapsed_secs, agent_position)` against `trajectory`.
///
/// At `elapsed_secs == 0` the trajectory is not consulted: the reference
/// position is the fixed bootstrap constant and no transition time is
/// produced.
///
/// # Errors
///
/// - [`Error::MissingSample`] if no sample is recorded at `elapsed_secs * 1000`
/// - [`Error::StateOutOfRange`] if the reference position lies beyond the
///   tenth position interval (or is negative enough to fall below State1)
pub fn map_state(
    elapsed_secs: i32,
    agent_position: i32,
    trajectory: &Trajectory,
) -> Result<Discretized> {
    let (reference_position, next_transition_secs) = if elapsed_secs == 0 {
        (BOOTSTRAP_REFERENCE_POSITION, None)
    } else {
        let time_ms = i64::from(elapsed_secs) * 1000;
        let index = trajectory
            .index_of_time(time_ms)
            .ok_or(Error::MissingSample { time_ms })?;
        let position = trajectory
            .position_at(index)
            .ok_or(Error::MissingSample { time_ms })?;
        let next = match trajectory.time_at(index + 2) {
            Some(ms) => {
                i32::try_from(ms / 1000).map_err(|_| Error::TimeOutOfRange { time_ms: ms })?
            }
            None => EXHAUSTED_TRANSITION_SECS,
        };
        (position, Some(next))
    };

    let state = state_for(reference_position, agent_position)?;

    Ok(Discretized {
        state,
        reference_position,
        next_transition_secs,
    })
}

/// Combine a reference and agent position into a state.
pub fn state_for(reference_position: i32, agent_position: i32) -> Result<DiscreteState> {
    let position_interval = i64::from(reference_position / 100);
    let bucket = RelativePosition::classify(agent_position - reference_position).bucket();
    let value = position_interval * NUM_RELATIVE_POSITIONS as i64 + bucket as i64 + 1;

    DiscreteState::new(value).ok_or(Error::StateOutOfRange {
        state: value,
        reference_position,
        agent_position,
    })
}
