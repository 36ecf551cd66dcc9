//! Seams to the collaborators the core drives but does not own.
//!
//! The gameplay phases receive these through a [`PhaseContext`] built once
//! per session. Any of them may be absent; a phase that needs a missing one
//! skips its work for that tick.

use crate::models::engine::{Lane, NoteId};
use crate::models::stats::Judgement;

/// Authoritative playback clock.
pub trait AudioClock {
    fn is_playing(&self) -> bool;
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    /// Track length in seconds.
    fn length(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
}

/// Visual objects of notes and the track.
pub trait NoteVisuals {
    fn set_active(&mut self, note: NoteId, active: bool);
    /// Re-anchors a hold's span at `anchor_x` with the remaining `span`.
    fn set_hold_span(&mut self, note: NoteId, anchor_x: f64, span: f64);
    fn set_track_position(&mut self, x: f64);
    fn set_hold_feedback(&mut self, lane: Lane, active: bool);
}

/// Receives exactly one call per resolved note.
pub trait ScoreSink {
    fn update_score(&mut self, judgement: Judgement, rainbow: bool);
}

/// Avatar movement variant requested by the press pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HitKind {
    IdlePress = 0,
    TapHit = 1,
    HoldEngage = 2,
}

/// Player avatar that moves between lanes.
pub trait AvatarController {
    fn move_to(&mut self, lane: Lane, kind: HitKind);
    /// Current height, read before a move.
    fn height(&self) -> f64;
    /// Reference height of a lane.
    fn lane_height(&self, lane: Lane) -> f64;
}

/// Collaborators threaded through every phase call.
#[derive(Default)]
pub struct PhaseContext<'a> {
    pub audio: Option<&'a mut dyn AudioClock>,
    pub visuals: Option<&'a mut dyn NoteVisuals>,
    pub score: Option<&'a mut dyn ScoreSink>,
    pub avatar: Option<&'a mut dyn AvatarController>,
}

/// Trait for creating immutable state captures for the outside world.
pub trait Snapshot {
    type Output;

    fn create_snapshot(&self) -> Self::Output;
}
