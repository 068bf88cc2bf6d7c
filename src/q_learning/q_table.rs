//! Dense action-value table over the discrete race states

use serde::{Deserialize, Serialize};

use crate::types::{Action, DiscreteState, NUM_ACTIONS, NUM_STATES};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Row `i` holds the values of `State{i+1}`; columns follow [`Action::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionValueTable {
    q_values: Vec<[f64; NUM_ACTIONS]>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl ActionValueTable {
    /// Create a zero-initialized table
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: vec![[0.0; NUM_ACTIONS]; NUM_STATES],
            learning_rate,
            discount_factor,
        }
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: DiscreteState, action: Action) -> f64 {
        self.q_values[state.row()][action.index()]
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: DiscreteState, action: Action, value: f64) {
        self.q_values[state.row()][action.index()] = value;
    }

    pub fn row(&self, state: DiscreteState) -> &[f64; NUM_ACTIONS] {
        &self.q_values[state.row()]
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Greedy action for `state`
    ///
    /// Linear scan keeping the first strictly greater value, so ties go to the
    /// lower action index.
    pub fn greedy_action(&self, state: DiscreteState) -> Action {
        let row = self.row(state);
        let mut best = Action::Drive;
        let mut best_q = row[best.index()];
        for action in &Action::ALL[1..] {
            if row[action.index()] > best_q {
                best_q = row[action.index()];
                best = *action;
            }
        }
        best
    }

    /// SARSA update: on-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') - Q(s,a)]
    ///
    /// The next pair always bootstraps, including on an episode's final step.
    pub fn sarsa_update(
        &mut self,
        state: DiscreteState,
        action: Action,
        reward: f64,
        next_state: DiscreteState,
        next_action: Action,
    ) {
        let current_q = self.get(state, action);
        let next_q = self.get(next_state, next_action);
        let td_target = reward + self.discount_factor * next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.set(state, action, new_q);
    }

    /// Iterate over `(state, [drive, boost])` rows
    pub fn iter(&self) -> impl Iterator<Item = (DiscreteState, &[f64; NUM_ACTIONS])> + '_ {
        DiscreteState::all().zip(self.q_values.iter())
    }

    /// Number of (state, action) entries that have moved away from zero
    pub fn visited(&self) -> usize {
        self.q_values
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&q| q != 0.0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(value: i64) -> DiscreteState {
        DiscreteState::new(value).unwrap()
    }

    #[test]
    fn test_table_initialization() {
        let table = ActionValueTable::new(0.05, 0.9);
        assert_eq!(table.iter().count(), NUM_STATES);
        assert_eq!(table.get(state(1), Action::Drive), 0.0);
        assert_eq!(table.get(state(30), Action::Boost), 0.0);
        assert_eq!(table.visited(), 0);
    }

    #[test]
    fn test_table_set_get() {
        let mut table = ActionValueTable::new(0.05, 0.9);
        table.set(state(4), Action::Boost, 1.5);
        assert_eq!(table.get(state(4), Action::Boost), 1.5);
        assert_eq!(table.row(state(4)), &[0.0, 1.5]);
    }

    #[test]
    fn test_greedy_action_prefers_strictly_greater() {
        let mut table = ActionValueTable::new(0.05, 0.9);
        assert_eq!(table.greedy_action(state(3)), Action::Drive);

        table.set(state(3), Action::Boost, 0.2);
        assert_eq!(table.greedy_action(state(3)), Action::Boost);

        table.set(state(3), Action::Drive, 0.2);
        assert_eq!(table.greedy_action(state(3)), Action::Drive);
    }

    #[test]
    fn test_sarsa_update() {
        let mut table = ActionValueTable::new(0.05, 0.9);
        table.set(state(2), Action::Drive, 0.4);
        table.set(state(10), Action::Boost, 1.5);
        table.set(state(10), Action::Drive, 9.0);

        table.sarsa_update(state(2), Action::Drive, -1.0, state(10), Action::Boost);

        // Uses Q(s', a') for the chosen a', not the max over actions
        let expected = 0.4 + 0.05 * (-1.0 + 0.9 * 1.5 - 0.4);
        assert_eq!(table.get(state(2), Action::Drive), expected);
    }
}
