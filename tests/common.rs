//! Common test utilities for the pacer test suite.
//!
//! The recorded human advances 25 units every two seconds starting from 3, so
//! an opponent holding either action stays within the on-pace band for the
//! whole recording and every step earns +1.

#![allow(dead_code)]

use std::{fs, path::Path};

use pacer::trajectory::Trajectory;

/// Sample times of one recorded episode, in milliseconds.
pub const EPISODE_TIMES: [i64; 5] = [0, 2000, 4000, 6000, 8000];

/// Human positions matching [`EPISODE_TIMES`].
pub const EPISODE_POSITIONS: [i32; 5] = [3, 28, 53, 78, 103];

/// Steps an episode of [`EPISODE_TIMES`] lasts before terminating.
pub const STEPS_PER_EPISODE: usize = 3;

/// A recording of `episodes` identical episodes numbered from 1.
pub fn steady_recording(episodes: u32) -> Trajectory {
    let mut times = Vec::new();
    let mut positions = Vec::new();
    let mut numbers = Vec::new();
    for episode in 1..=episodes {
        times.extend_from_slice(&EPISODE_TIMES);
        positions.extend_from_slice(&EPISODE_POSITIONS);
        numbers.extend(std::iter::repeat_n(episode, EPISODE_TIMES.len()));
    }
    Trajectory::from_columns(&times, &positions, &numbers).unwrap()
}

/// Write a single-episode recording as `<dir>/<player>.csv`.
pub fn write_recording(dir: &Path, player: &str) {
    let mut body = String::from("time_ms,position,episode\n");
    for (time, position) in EPISODE_TIMES.iter().zip(EPISODE_POSITIONS) {
        body.push_str(&format!("{time},{position},1\n"));
    }
    fs::write(dir.join(format!("{player}.csv")), body).unwrap();
}
