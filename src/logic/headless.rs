//! Collaborators for running a session without a renderer.

use crate::models::engine::{Lane, NUM_LANES, NoteId};
use crate::models::stats::Judgement;
use crate::state::traits::{AvatarController, HitKind, NoteVisuals, ScoreSink};
use crate::system::bus::ScoreEvent;
use crossbeam_channel::Sender;
use std::collections::HashSet;

/// Vertical distance between lane centres.
const LANE_SPACING: f64 = 1.0;

/// Tracks what a renderer would draw, for snapshots and logs.
#[derive(Debug, Default)]
pub struct HeadlessVisuals {
    active: HashSet<NoteId>,
    holding: [bool; NUM_LANES],
    track_x: f64,
}

impl HeadlessVisuals {
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn track_position(&self) -> f64 {
        self.track_x
    }

    pub fn is_holding(&self, lane: Lane) -> bool {
        self.holding[lane.index()]
    }
}

impl NoteVisuals for HeadlessVisuals {
    fn set_active(&mut self, note: NoteId, active: bool) {
        if active {
            self.active.insert(note);
        } else {
            self.active.remove(&note);
        }
    }

    fn set_hold_span(&mut self, note: NoteId, anchor_x: f64, span: f64) {
        log::trace!("LOGIC: Hold {} spans {:.2} from {:.2}", note, span, anchor_x);
    }

    fn set_track_position(&mut self, x: f64) {
        self.track_x = x;
    }

    fn set_hold_feedback(&mut self, lane: Lane, active: bool) {
        self.holding[lane.index()] = active;
    }
}

/// Forwards every judgement to the bus.
pub struct BusScoreSink {
    tx: Sender<ScoreEvent>,
}

impl BusScoreSink {
    pub fn new(tx: Sender<ScoreEvent>) -> Self {
        Self { tx }
    }
}

impl ScoreSink for BusScoreSink {
    fn update_score(&mut self, judgement: Judgement, rainbow: bool) {
        if self.tx.send(ScoreEvent { judgement, rainbow }).is_err() {
            log::warn!("LOGIC: Score receiver gone, dropped {:?}", judgement);
        }
    }
}

/// Avatar that jumps straight to the requested lane. Lane 1 is the top.
#[derive(Debug, Default)]
pub struct LaneAvatar {
    height: f64,
}

impl AvatarController for LaneAvatar {
    fn move_to(&mut self, lane: Lane, kind: HitKind) {
        log::trace!("LOGIC: Avatar to {} ({:?})", lane, kind);
        self.height = self.lane_height(lane);
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn lane_height(&self, lane: Lane) -> f64 {
        (NUM_LANES - lane.index() - 1) as f64 * LANE_SPACING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn avatar_heights_rise_toward_lane_one() {
        let mut avatar = LaneAvatar::default();
        let top = Lane::new(1).unwrap();
        let bottom = Lane::new(3).unwrap();
        assert!(avatar.lane_height(top) > avatar.lane_height(bottom));

        avatar.move_to(top, HitKind::TapHit);
        assert_eq!(avatar.height(), avatar.lane_height(top));
    }

    #[test]
    fn score_sink_forwards_events() {
        let (tx, rx) = unbounded();
        let mut sink = BusScoreSink::new(tx);
        sink.update_score(Judgement::Great, true);
        assert_eq!(
            rx.try_recv().unwrap(),
            ScoreEvent {
                judgement: Judgement::Great,
                rainbow: true
            }
        );
    }

    #[test]
    fn visuals_track_active_notes() {
        let mut visuals = HeadlessVisuals::default();
        visuals.set_active(NoteId(1), true);
        visuals.set_active(NoteId(2), true);
        visuals.set_active(NoteId(1), false);
        visuals.set_track_position(-12.5);
        visuals.set_hold_feedback(Lane::new(2).unwrap(), true);
        assert_eq!(visuals.active_count(), 1);
        assert!(visuals.is_holding(Lane::new(2).unwrap()));
        assert_eq!(visuals.track_position(), -12.5);
    }
}
