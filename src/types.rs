//! Newtype wrappers and enums for the race domain.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of relative-position buckets per position interval.
pub const NUM_RELATIVE_POSITIONS: usize = 3;

/// Number of discrete states (State1 - State30).
pub const NUM_STATES: usize = 30;

/// Number of actions available to the opponent.
pub const NUM_ACTIONS: usize = 2;

/// Opponent action applied for one fixed-duration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Drive = 0,
    Boost = 1,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Drive, Action::Boost];

    /// Table column / network output index of this action.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up an action by index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAction`] for indices other than 0 and 1.
    pub fn from_index(index: usize) -> Result<Self, crate::Error> {
        match index {
            0 => Ok(Action::Drive),
            1 => Ok(Action::Boost),
            _ => Err(crate::Error::InvalidAction { index }),
        }
    }

    /// Speed in track units per second.
    pub fn speed(self) -> f32 {
        match self {
            Action::Drive => 12.67,
            Action::Boost => 14.63,
        }
    }

    /// Whole units travelled when the action is held for `duration_secs`.
    ///
    /// The fractional part is truncated, so Drive for 2 s covers 25 units and
    /// Boost covers 29.
    pub fn displacement(self, duration_secs: i32) -> i32 {
        (self.speed() * duration_secs as f32) as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Drive => write!(f, "Drive"),
            Action::Boost => write!(f, "Boost"),
        }
    }
}

/// Where the opponent is relative to the recorded human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativePosition {
    Behind,
    On,
    Front,
}

impl RelativePosition {
    /// Classify `agent - reference`.
    ///
    /// Both ON boundaries are open: a difference of exactly -5 falls through
    /// to `Front`, as does 15.
    pub fn classify(difference: i32) -> Self {
        if difference < -5 {
            RelativePosition::Behind
        } else if difference > -5 && difference < 15 {
            RelativePosition::On
        } else {
            RelativePosition::Front
        }
    }

    /// Bucket offset used in the state formula.
    pub fn bucket(self) -> usize {
        match self {
            RelativePosition::Behind => 0,
            RelativePosition::On => 1,
            RelativePosition::Front => 2,
        }
    }
}

/// A discretized race state in the range 1-30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscreteState(u8);

impl DiscreteState {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = NUM_STATES as u8;

    /// Create a state, validating it lies in 1-30.
    ///
    /// Returns `None` when out of range; callers attach their own context.
    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Some(DiscreteState(value as u8))
        } else {
            None
        }
    }

    /// The 1-based state number.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Zero-based row in the action-value table.
    pub fn row(self) -> usize {
        usize::from(self.0 - Self::MIN)
    }

    /// Every state in ascending order.
    pub fn all() -> impl Iterator<Item = DiscreteState> {
        (Self::MIN..=Self::MAX).map(DiscreteState)
    }
}

impl fmt::Display for DiscreteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State{}", self.0)
    }
}
