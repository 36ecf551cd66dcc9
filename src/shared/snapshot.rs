//! Immutable captures of session state handed to the outside world.
//!
//! The logic loop builds one after each frame; nothing in a snapshot borrows
//! from the session, so it can cross threads freely.

use crate::models::engine::{Lane, NUM_LANES};
use crate::state::game::ClockMode;

/// Per-lane view of the pending queue.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LaneSnapshot {
    /// Notes still waiting in the lane.
    pub queued: usize,
    /// Corrected time of the front note.
    pub front_time: Option<f64>,
}

/// Snapshot of gameplay state.
#[derive(Clone, Debug, PartialEq)]
pub struct GameplaySnapshot {
    /// Judgement time in seconds.
    pub track_time: f64,
    pub mode: ClockMode,
    /// Last track scroll position pushed to the visuals.
    pub scroll_x: Option<f64>,
    pub lanes: [LaneSnapshot; NUM_LANES],
    /// Lane the avatar is focused on, if any key is active.
    pub avatar_lane: Option<Lane>,
    pub resolved: usize,
    pub total: usize,
}

impl GameplaySnapshot {
    pub fn lane(&self, lane: Lane) -> &LaneSnapshot {
        &self.lanes[lane.index()]
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.resolved)
    }
}
