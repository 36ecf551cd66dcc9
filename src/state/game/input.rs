//! Per-lane input sampling with press latching.
//!
//! A press edge latches for `press_threshold` seconds so a press that lands a
//! frame before its note becomes due is not lost. The latch is single-shot:
//! the press pass consumes it exactly once.

use crate::input::events::InputFrame;
use crate::models::engine::{Lane, NUM_LANES};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LaneInput {
    pub press_latched: bool,
    /// Seconds left before an unconsumed latch clears.
    pub press_timer: f64,
    /// Mirrors the raw key-down level.
    pub hold_level: bool,
    /// A hold note at the front of this lane is engaged.
    pub on_hold_note: bool,
    /// An idle move was already sent for the current latch.
    pub idle_announced: bool,
}

/// Lane the avatar should show, and whether it is held there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarFocus {
    pub lane: Lane,
    pub held: bool,
}

#[derive(Debug, Clone)]
pub struct InputSampler {
    lanes: [LaneInput; NUM_LANES],
    press_threshold: f64,
}

impl InputSampler {
    pub fn new(press_threshold: f64) -> Self {
        Self {
            lanes: [LaneInput::default(); NUM_LANES],
            press_threshold,
        }
    }

    pub fn sample(&mut self, frame: &InputFrame, dt: f64) {
        for lane in Lane::ALL {
            let state = &mut self.lanes[lane.index()];
            if frame.pressed(lane) {
                state.press_latched = true;
                state.press_timer = self.press_threshold;
                state.idle_announced = false;
            } else if state.press_latched {
                state.press_timer -= dt;
                if state.press_timer <= 0.0 {
                    state.press_latched = false;
                    state.press_timer = 0.0;
                }
            }
            state.hold_level = frame.held(lane);
        }
    }

    pub fn lane(&self, lane: Lane) -> &LaneInput {
        &self.lanes[lane.index()]
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut LaneInput {
        &mut self.lanes[lane.index()]
    }

    /// Clears the latch; a latch is consumed once per press.
    pub fn consume_press(&mut self, lane: Lane) {
        let state = self.lane_mut(lane);
        state.press_latched = false;
        state.press_timer = 0.0;
    }

    /// Scans lanes 1 to 3. A latched lane takes the focus, a held lane takes
    /// it and stops the scan, so at most one lane shows as held.
    pub fn avatar_focus(&self) -> Option<AvatarFocus> {
        let mut focus = None;
        for lane in Lane::ALL {
            let state = self.lane(lane);
            if state.hold_level {
                return Some(AvatarFocus { lane, held: true });
            }
            if state.press_latched {
                focus = Some(AvatarFocus { lane, held: false });
            }
        }
        focus
    }
}
