//! Chart note definitions and runtime note records.

use super::lanes::Lane;
use crate::models::stats::Judgement;
use std::fmt;

/// Type of note in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    /// Press once.
    Tap,
    /// Press and keep the key down for the note's length.
    Hold,
    /// Press while moving the avatar upwards.
    DirUp,
    /// Press while moving the avatar downwards.
    DirDown,
}

/// Vertical movement a directional note asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// What a successful press does to the front note, per note kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressRule {
    /// Pop and resolve with the press judgement.
    Resolve,
    /// Keep the note at the front and start tracking the hold.
    Engage,
    /// Pop and resolve, penalising a movement in the wrong direction.
    ResolveDirectional(Direction),
}

impl NoteKind {
    /// Parses the chart's integer note type.
    pub fn from_chart(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(NoteKind::Tap),
            1 => Some(NoteKind::Hold),
            2 => Some(NoteKind::DirUp),
            3 => Some(NoteKind::DirDown),
            _ => None,
        }
    }

    pub fn is_hold(self) -> bool {
        self == NoteKind::Hold
    }

    pub fn press_rule(self) -> PressRule {
        match self {
            NoteKind::Tap => PressRule::Resolve,
            NoteKind::Hold => PressRule::Engage,
            NoteKind::DirUp => PressRule::ResolveDirectional(Direction::Up),
            NoteKind::DirDown => PressRule::ResolveDirectional(Direction::Down),
        }
    }
}

/// A note as written in the chart, after field parsing and lane remap.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartNoteDef {
    pub id: i64,
    pub bar: i64,
    pub beat: i64,
    /// (top, bottom) sub-beat offset; ignored unless both are positive.
    pub beat_fraction: (i64, i64),
    /// Whole beats of hold length.
    pub beat_length: i64,
    /// (top, bottom) sub-beat hold length; ignored unless both are positive.
    pub beat_length_fraction: (i64, i64),
    pub lane: Lane,
    pub kind: NoteKind,
    pub rainbow: bool,
}

/// A definition with its times resolved, ready to become a [`Note`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNote {
    pub def: ChartNoteDef,
    /// Seconds from track start.
    pub absolute_time: f64,
    /// Hold length in seconds (0 for other kinds).
    pub length: f64,
}

/// Index of a note slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub usize);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a note slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Unbuilt,
    /// Time resolved and enqueued in its lane.
    Scheduled,
    /// Visible on the track.
    Activated,
    /// Hold engaged by a press, waiting for release or expiry.
    HeldActive,
    /// Judged. The judgement never changes afterwards.
    Resolved(Judgement),
    /// Slot handed back to the pool, about to be rebuilt.
    Recycled,
}

/// Runtime note record.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: NoteId,
    pub def: ChartNoteDef,
    pub absolute_time: f64,
    /// `absolute_time` plus the note-side calibration offsets.
    pub corrected_time: f64,
    pub length: f64,
    /// Starts at perfect and is only ever lowered before resolution.
    pub judgement: Judgement,
    pub is_hit: bool,
    pub state: NoteState,
}

impl Note {
    /// Creates an empty slot.
    pub fn unbuilt(id: NoteId, resolved: ResolvedNote) -> Self {
        Self {
            id,
            corrected_time: resolved.absolute_time,
            absolute_time: resolved.absolute_time,
            length: resolved.length,
            def: resolved.def,
            judgement: Judgement::Perfect,
            is_hit: false,
            state: NoteState::Unbuilt,
        }
    }

    /// Stamps the corrected time and schedules the note.
    pub fn build(&mut self, note_offset: f64) {
        self.corrected_time = self.absolute_time + note_offset;
        self.judgement = Judgement::Perfect;
        self.is_hit = false;
        self.state = NoteState::Scheduled;
    }

    /// Rebuilds a resolved slot in place from the next pending definition.
    pub fn recycle(&mut self, resolved: ResolvedNote, note_offset: f64) {
        self.state = NoteState::Recycled;
        self.def = resolved.def;
        self.absolute_time = resolved.absolute_time;
        self.length = resolved.length;
        self.build(note_offset);
    }

    pub fn lane(&self) -> Lane {
        self.def.lane
    }

    pub fn kind(&self) -> NoteKind {
        self.def.kind
    }

    /// Corrected time of the hold tail.
    pub fn tail_time(&self) -> f64 {
        self.corrected_time + self.length
    }

    pub fn is_live(&self) -> bool {
        matches!(
            self.state,
            NoteState::Scheduled | NoteState::Activated | NoteState::HeldActive
        )
    }

    /// Scheduled -> Activated. Returns true if the note just became visible.
    pub fn activate(&mut self) -> bool {
        if self.is_hit || self.state != NoteState::Scheduled {
            return false;
        }
        self.state = NoteState::Activated;
        true
    }

    /// Records the press judgement of a hold and marks it engaged.
    pub fn engage(&mut self, judgement: Judgement) {
        if self.is_hit {
            return;
        }
        self.judgement = self.judgement.min(judgement);
        self.state = NoteState::HeldActive;
    }

    /// Assigns the final judgement. Only the first caller wins; later
    /// attempts return false and leave the note untouched.
    pub fn resolve(&mut self, judgement: Judgement) -> bool {
        if self.is_hit {
            return false;
        }
        self.is_hit = true;
        self.judgement = judgement;
        self.state = NoteState::Resolved(judgement);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(kind: NoteKind, time: f64) -> ResolvedNote {
        ResolvedNote {
            def: ChartNoteDef {
                id: 7,
                bar: 0,
                beat: 0,
                beat_fraction: (0, 0),
                beat_length: 0,
                beat_length_fraction: (0, 0),
                lane: Lane::new(1).unwrap(),
                kind,
                rainbow: false,
            },
            absolute_time: time,
            length: 0.0,
        }
    }

    #[test]
    fn build_recomputes_from_absolute_time() {
        let mut note = Note::unbuilt(NoteId(0), resolved(NoteKind::Tap, 2.0));
        assert_eq!(note.state, NoteState::Unbuilt);
        note.build(0.42);
        note.build(0.42);
        assert!((note.corrected_time - 2.42).abs() < 1e-12);
        assert_eq!(note.state, NoteState::Scheduled);
    }

    #[test]
    fn resolution_is_single_assignment() {
        let mut note = Note::unbuilt(NoteId(0), resolved(NoteKind::Tap, 1.0));
        note.build(0.0);
        assert!(note.activate());
        assert!(!note.activate());
        assert!(note.resolve(Judgement::Great));
        assert!(!note.resolve(Judgement::Miss));
        assert_eq!(note.judgement, Judgement::Great);
        assert_eq!(note.state, NoteState::Resolved(Judgement::Great));
    }

    #[test]
    fn resolved_notes_cannot_be_activated() {
        let mut note = Note::unbuilt(NoteId(0), resolved(NoteKind::Tap, 1.0));
        note.build(0.0);
        note.resolve(Judgement::Miss);
        assert!(!note.activate());
    }

    #[test]
    fn recycle_rebuilds_in_place() {
        let mut note = Note::unbuilt(NoteId(3), resolved(NoteKind::Tap, 1.0));
        note.build(0.1);
        note.resolve(Judgement::Perfect);

        note.recycle(resolved(NoteKind::Hold, 4.0), 0.1);
        assert_eq!(note.id, NoteId(3));
        assert_eq!(note.kind(), NoteKind::Hold);
        assert!(!note.is_hit);
        assert_eq!(note.judgement, Judgement::Perfect);
        assert!((note.corrected_time - 4.1).abs() < 1e-12);
    }

    #[test]
    fn press_rules_dispatch_by_kind() {
        assert_eq!(NoteKind::Tap.press_rule(), PressRule::Resolve);
        assert_eq!(NoteKind::Hold.press_rule(), PressRule::Engage);
        assert_eq!(
            NoteKind::DirDown.press_rule(),
            PressRule::ResolveDirectional(Direction::Down)
        );
        assert_eq!(NoteKind::from_chart(9), None);
    }
}
