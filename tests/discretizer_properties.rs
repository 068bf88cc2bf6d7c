//! Properties of the state discretizer over the whole track.

mod common;

use common::steady_recording;
use pacer::{
    Error, RelativePosition,
    discretizer::{map_state, state_for},
    environment::{EXHAUSTED_TRANSITION_SECS, reward},
};

#[test]
fn every_track_position_maps_into_range() {
    for reference in 0..1000 {
        for offset in -40..40 {
            let state = state_for(reference, reference + offset).unwrap();
            let value = i64::from(state.value());
            assert!((1..=30).contains(&value));

            let bucket = RelativePosition::classify(offset).bucket() as i64;
            assert_eq!(value, i64::from(reference / 100) * 3 + bucket + 1);
        }
    }
}

#[test]
fn reference_beyond_track_is_out_of_range() {
    assert!(matches!(
        state_for(1000, 1000),
        Err(Error::StateOutOfRange { state: 32, .. })
    ));
}

#[test]
fn reward_matches_the_bucket_of_the_state() {
    let trajectory = steady_recording(1);
    for agent in 0..80 {
        let observed = map_state(2, agent, &trajectory).unwrap();
        let step_reward = reward(agent, &trajectory, 2).unwrap();
        let on_pace = observed.state.value() == 2;
        assert_eq!(step_reward == 1, on_pace, "agent at {agent}");
    }
}

#[test]
fn transition_reads_two_samples_ahead() {
    let trajectory = steady_recording(1);
    let at = |secs| map_state(secs, 30, &trajectory).unwrap().next_transition_secs;

    assert_eq!(at(0), None);
    assert_eq!(at(2), Some(6));
    assert_eq!(at(4), Some(8));
    assert_eq!(at(6), Some(EXHAUSTED_TRANSITION_SECS));
    assert_eq!(at(8), Some(EXHAUSTED_TRANSITION_SECS));
}
