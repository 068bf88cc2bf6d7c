//! Recorded human trajectory consumed by the trainers
//!
//! A trajectory is the ordered stream of `(time, position, episode)` samples
//! captured while a human raced the track. Trainers replay it one episode at a
//! time; once an episode is consumed its range is pruned so the next episode
//! always starts at window index 0.
//!
//! Pruning the head of the stream only advances a cursor. The backing vector
//! is drained only when a range in the middle of the window is removed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Elapsed race time in milliseconds
    pub time_ms: i64,
    /// Player position along the track
    pub position: i32,
    /// 1-based episode the sample belongs to
    pub episode: u32,
}

impl TrajectorySample {
    pub fn new(time_ms: i64, position: i32, episode: u32) -> Self {
        Self {
            time_ms,
            position,
            episode,
        }
    }
}

/// Ordered sample stream with a consumed-offset cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    offset: usize,
}

impl Trajectory {
    /// Create a trajectory from samples in recording order.
    pub fn new(samples: Vec<TrajectorySample>) -> Self {
        Self { samples, offset: 0 }
    }

    /// Build a trajectory from the parallel columns a loader produces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrajectoryShape`] if the columns differ in length.
    pub fn from_columns(times: &[i64], positions: &[i32], episodes: &[u32]) -> Result<Self> {
        if times.len() != positions.len() || times.len() != episodes.len() {
            return Err(Error::TrajectoryShape {
                times: times.len(),
                positions: positions.len(),
                episodes: episodes.len(),
            });
        }

        let samples = times
            .iter()
            .zip(positions)
            .zip(episodes)
            .map(|((&time_ms, &position), &episode)| {
                TrajectorySample::new(time_ms, position, episode)
            })
            .collect();

        Ok(Self::new(samples))
    }

    /// The unconsumed samples, indexed from 0.
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples[self.offset..]
    }

    /// Number of unconsumed samples.
    pub fn len(&self) -> usize {
        self.samples.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of samples the cursor has moved past.
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// Index of the first sample recorded exactly at `time_ms`.
    pub fn index_of_time(&self, time_ms: i64) -> Option<usize> {
        self.samples().iter().position(|s| s.time_ms == time_ms)
    }

    pub fn position_at(&self, index: usize) -> Option<i32> {
        self.samples().get(index).map(|s| s.position)
    }

    pub fn time_at(&self, index: usize) -> Option<i64> {
        self.samples().get(index).map(|s| s.time_ms)
    }

    /// Number of distinct episode numbers still in the window.
    pub fn episode_count(&self) -> usize {
        self.samples()
            .iter()
            .map(|s| s.episode)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Remove the samples of `episode` once it has been replayed.
    ///
    /// The range runs from the first sample of `episode` up to (not including)
    /// the first later sample of `episode + 1`. Returns the number of samples
    /// removed, which is 0 when either marker is missing.
    pub fn prune_episode(&mut self, episode: u32) -> usize {
        let window = self.samples();
        let Some(start) = window.iter().position(|s| s.episode == episode) else {
            return 0;
        };
        let Some(end) = window[start..]
            .iter()
            .position(|s| Some(s.episode) == episode.checked_add(1))
            .map(|relative| start + relative)
        else {
            return 0;
        };

        if start == 0 {
            self.offset += end;
        } else {
            let base = self.offset;
            self.samples.drain(base + start..base + end);
        }

        end - start
    }

    /// Append `factor` copies of the unconsumed samples.
    ///
    /// Each copy keeps its relative episode layout but is renumbered to follow
    /// the largest episode number already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpisodeNumberOverflow`] without touching the samples
    /// when the last copy's episode numbers would not fit in a `u32`.
    pub fn duplicate(&mut self, factor: usize) -> Result<()> {
        if factor == 0 || self.is_empty() {
            return Ok(());
        }

        let base: Vec<TrajectorySample> = self.samples().to_vec();
        let first_episode = base.iter().map(|s| s.episode).min().unwrap_or(1);
        let last_episode = base.iter().map(|s| s.episode).max().unwrap_or(1);
        let overflow = || Error::EpisodeNumberOverflow {
            last_episode,
            copies: factor,
        };

        let span = (last_episode - first_episode)
            .checked_add(1)
            .ok_or_else(overflow)?;
        let copies = u32::try_from(factor).map_err(|_| overflow())?;
        // Every renumbered episode is at most last_episode + span * copies
        span.checked_mul(copies)
            .and_then(|shift| last_episode.checked_add(shift))
            .ok_or_else(overflow)?;

        self.samples.reserve(base.len() * factor);
        for copy in 1..=copies {
            self.samples.extend(base.iter().map(|s| TrajectorySample {
                episode: s.episode + span * copy,
                ..*s
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_episodes() -> Trajectory {
        Trajectory::from_columns(
            &[0, 2000, 4000, 0, 2000, 4000],
            &[3, 30, 60, 3, 28, 55],
            &[1, 1, 1, 2, 2, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_mismatched_lengths() {
        let result = Trajectory::from_columns(&[0, 2000], &[3], &[1, 1]);
        assert!(matches!(result, Err(Error::TrajectoryShape { .. })));
    }

    #[test]
    fn test_index_of_time_finds_first_match() {
        let trajectory = two_episodes();
        assert_eq!(trajectory.index_of_time(2000), Some(1));
        assert_eq!(trajectory.index_of_time(3000), None);
    }

    #[test]
    fn test_prune_head_advances_cursor() {
        let mut trajectory = two_episodes();
        let removed = trajectory.prune_episode(1);

        assert_eq!(removed, 3);
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.consumed(), 3);
        assert_eq!(trajectory.position_at(1), Some(28));
        assert_eq!(trajectory.index_of_time(2000), Some(1));
    }

    #[test]
    fn test_prune_last_episode_is_noop() {
        let mut trajectory = two_episodes();
        assert_eq!(trajectory.prune_episode(2), 0);
        assert_eq!(trajectory.len(), 6);
    }

    #[test]
    fn test_prune_middle_range_drains() {
        let mut trajectory = Trajectory::from_columns(
            &[0, 2000, 0, 2000, 0, 2000],
            &[3, 30, 3, 31, 3, 32],
            &[1, 1, 2, 2, 3, 3],
        )
        .unwrap();

        assert_eq!(trajectory.prune_episode(2), 2);
        let positions: Vec<i32> = trajectory.samples().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![3, 30, 3, 32]);
    }

    #[test]
    fn test_duplicate_renumbers_episodes() {
        let mut trajectory = two_episodes();
        trajectory.duplicate(2).unwrap();

        assert_eq!(trajectory.len(), 18);
        assert_eq!(trajectory.episode_count(), 6);
        let episodes: Vec<u32> = trajectory.samples().iter().map(|s| s.episode).collect();
        assert_eq!(&episodes[6..9], &[3, 3, 3]);
        assert_eq!(&episodes[15..18], &[6, 6, 6]);
    }

    #[test]
    fn test_duplicate_zero_is_noop() {
        let mut trajectory = two_episodes();
        trajectory.duplicate(0).unwrap();
        assert_eq!(trajectory.len(), 6);
    }

    #[test]
    fn test_duplicate_rejects_episode_overflow() {
        let mut trajectory =
            Trajectory::from_columns(&[0, 2000], &[3, 28], &[u32::MAX - 1, u32::MAX - 1])
                .unwrap();

        let result = trajectory.duplicate(1);

        assert!(matches!(
            result,
            Err(Error::EpisodeNumberOverflow {
                last_episode,
                copies: 1
            }) if last_episode == u32::MAX - 1
        ));
        assert_eq!(trajectory.len(), 2);
    }

    #[test]
    fn test_duplicate_rejects_span_overflow() {
        let mut trajectory =
            Trajectory::from_columns(&[0, 0], &[3, 3], &[0, u32::MAX]).unwrap();
        assert!(matches!(
            trajectory.duplicate(1),
            Err(Error::EpisodeNumberOverflow { .. })
        ));
    }

    #[test]
    fn test_prune_last_episode_number_keeps_samples() {
        let mut trajectory =
            Trajectory::from_columns(&[0, 2000], &[3, 28], &[u32::MAX, u32::MAX]).unwrap();
        assert_eq!(trajectory.prune_episode(u32::MAX), 0);
        assert_eq!(trajectory.len(), 2);
    }
}
