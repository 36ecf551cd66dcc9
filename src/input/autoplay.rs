//! Autoplay input source.
//!
//! Plays a chart by itself: every note gets a press at its corrected time
//! with a small random error, taps are released right after, holds are kept
//! down for their length.

use crate::input::events::GameAction;
use crate::models::engine::{Lane, NUM_LANES, OffsetAccumulator, ResolvedNote};
use rand::Rng;
use std::collections::VecDeque;

/// How long a tap key stays down.
const TAP_HOLD: f64 = 0.04;
/// Minimum gap kept between a release and the next press on the same lane.
const REPRESS_GAP: f64 = 0.001;

/// An action due at a device time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoplayStep {
    pub at: f64,
    pub action: GameAction,
}

#[derive(Debug, Clone, Default)]
pub struct AutoplayPlan {
    steps: VecDeque<AutoplayStep>,
}

impl AutoplayPlan {
    /// Schedules presses and releases in device time.
    ///
    /// Judgement compares against device time shifted by `audio_offset`, so
    /// the offset is taken back out here.
    pub fn new<R: Rng>(
        notes: &[ResolvedNote],
        offsets: &OffsetAccumulator,
        audio_offset: f64,
        jitter: f64,
        rng: &mut R,
    ) -> Self {
        let jitter = jitter.abs();
        let mut per_lane: [Vec<(f64, f64)>; NUM_LANES] = Default::default();

        for note in notes {
            let target = offsets.corrected_time(note.absolute_time) - audio_offset;
            let press = target + rng.random_range(-jitter..=jitter);
            let release = if note.def.kind.is_hold() {
                target + note.length + rng.random_range(-jitter..=jitter)
            } else {
                press + TAP_HOLD
            };
            per_lane[note.def.lane.index()].push((press, release.max(press)));
        }

        let mut steps = Vec::with_capacity(notes.len() * 2);
        for (lane, mut presses) in Lane::ALL.into_iter().zip(per_lane) {
            presses.sort_by(|a, b| a.0.total_cmp(&b.0));
            for i in 0..presses.len() {
                let (press, mut release) = presses[i];
                if let Some(&(next, _)) = presses.get(i + 1) {
                    release = release.min(next - REPRESS_GAP).max(press);
                }
                steps.push(AutoplayStep {
                    at: press,
                    action: GameAction::Hit { lane },
                });
                steps.push(AutoplayStep {
                    at: release,
                    action: GameAction::Release { lane },
                });
            }
        }
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));

        Self {
            steps: steps.into(),
        }
    }

    /// Removes and returns every step due at `time`.
    pub fn due(&mut self, time: f64) -> Vec<GameAction> {
        let mut actions = Vec::new();
        while let Some(step) = self.steps.front() {
            if step.at > time {
                break;
            }
            actions.push(step.action);
            self.steps.pop_front();
        }
        actions
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
