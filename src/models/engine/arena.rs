//! Arena of note slots addressed by [`NoteId`].
//!
//! Lane queues hold ids only. Resolution mutates a slot in place, so a phase
//! holding an id never sees it dangle mid-tick. With a pool, resolved slots
//! are rebuilt from the pending definitions.

use super::lanes::{LaneQueue, LaneQueues};
use super::note::{Note, NoteId, ResolvedNote};
use super::offsets::OffsetAccumulator;
use crate::models::engine::constants::NUM_LANES;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct NoteArena {
    notes: Vec<Note>,
    /// Definitions not yet given a slot, ordered by absolute time.
    pending: VecDeque<ResolvedNote>,
    total: usize,
}

impl NoteArena {
    /// Builds slots for the chart and the lane queues that index them.
    ///
    /// `pool_size == 0` builds every note up front; otherwise only the
    /// earliest `pool_size` get a slot and the rest wait in the pending list.
    pub fn build(
        notes: Vec<ResolvedNote>,
        pool_size: usize,
        offsets: &OffsetAccumulator,
    ) -> (Self, LaneQueues) {
        let total = notes.len();
        let eager = if pool_size == 0 {
            total
        } else {
            pool_size.min(total)
        };

        let mut pending: VecDeque<ResolvedNote> = notes.into();
        let mut slots = Vec::with_capacity(eager);
        for (idx, resolved) in pending.drain(..eager).enumerate() {
            let mut note = Note::unbuilt(NoteId(idx), resolved);
            note.build(offsets.offsets.note_offset());
            slots.push(note);
        }

        let arena = Self {
            notes: slots,
            pending,
            total,
        };
        let queues = arena.lane_queues();
        (arena, queues)
    }

    fn lane_queues(&self) -> LaneQueues {
        let mut per_lane: [Vec<(f64, NoteId)>; NUM_LANES] = Default::default();
        for note in self.notes.iter().filter(|n| n.is_live()) {
            per_lane[note.lane().index()].push((note.absolute_time, note.id));
        }
        LaneQueues::from_lanes(per_lane.map(LaneQueue::from_unsorted))
    }

    /// Re-stamps every unresolved note from its absolute time.
    pub fn apply_offsets(&mut self, offsets: &OffsetAccumulator) {
        for note in self.notes.iter_mut().filter(|n| !n.is_hit) {
            note.corrected_time = offsets.corrected_time(note.absolute_time);
        }
    }

    /// Rebuilds a resolved slot from the next pending definition and enqueues
    /// it. Returns false when the slot is still live or nothing is pending.
    pub fn recycle(
        &mut self,
        id: NoteId,
        offsets: &OffsetAccumulator,
        queues: &mut LaneQueues,
    ) -> bool {
        let Some(note) = self.notes.get_mut(id.0) else {
            return false;
        };
        if !note.is_hit {
            return false;
        }
        let Some(next) = self.pending.pop_front() else {
            return false;
        };

        note.recycle(next, offsets.offsets.note_offset());
        queues
            .lane_mut(note.lane())
            .insert_sorted(note.absolute_time, note.id);
        log::trace!(
            "ENGINE: Recycled slot {} for chart note {} at {:.3}s",
            note.id,
            note.def.id,
            note.absolute_time
        );
        true
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Note> {
        self.notes.iter_mut()
    }

    /// Number of slots.
    pub fn slots(&self) -> usize {
        self.notes.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Notes in the chart, built or not.
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::lanes::Lane;
    use crate::models::engine::note::{ChartNoteDef, NoteKind};
    use crate::models::engine::offsets::OffsetSet;
    use crate::models::stats::Judgement;

    fn resolved(id: i64, lane: u8, time: f64) -> ResolvedNote {
        ResolvedNote {
            def: ChartNoteDef {
                id,
                bar: 0,
                beat: 0,
                beat_fraction: (0, 0),
                beat_length: 0,
                beat_length_fraction: (0, 0),
                lane: Lane::new(lane).unwrap(),
                kind: NoteKind::Tap,
                rainbow: false,
            },
            absolute_time: time,
            length: 0.0,
        }
    }

    fn accumulator(custom: f64) -> OffsetAccumulator {
        OffsetAccumulator::new(OffsetSet {
            base_offset: 0.32,
            custom_offset: custom,
            ..OffsetSet::default()
        })
    }

    fn chart() -> Vec<ResolvedNote> {
        vec![
            resolved(0, 1, 1.0),
            resolved(1, 2, 1.5),
            resolved(2, 1, 2.0),
            resolved(3, 3, 2.5),
            resolved(4, 1, 3.0),
        ]
    }

    #[test]
    fn eager_build_fills_every_lane() {
        let (arena, queues) = NoteArena::build(chart(), 0, &accumulator(0.1));
        assert_eq!(arena.slots(), 5);
        assert_eq!(arena.pending(), 0);
        assert_eq!(queues.lane(Lane::new(1).unwrap()).len(), 3);
        assert_eq!(queues.lane(Lane::new(2).unwrap()).len(), 1);
        assert_eq!(queues.lane(Lane::new(3).unwrap()).len(), 1);
        assert!(queues.all_sorted());

        let first = arena.get(NoteId(0)).unwrap();
        assert!((first.corrected_time - 1.42).abs() < 1e-12);
    }

    #[test]
    fn reapplying_offsets_is_idempotent() {
        let (mut arena, _) = NoteArena::build(chart(), 0, &accumulator(0.1));
        arena.apply_offsets(&accumulator(0.2));
        arena.apply_offsets(&accumulator(0.2));
        let note = arena.get(NoteId(2)).unwrap();
        assert!((note.corrected_time - 2.52).abs() < 1e-12);
    }

    #[test]
    fn pooled_build_recycles_resolved_slots() {
        let acc = accumulator(0.0);
        let (mut arena, mut queues) = NoteArena::build(chart(), 2, &acc);
        assert_eq!(arena.slots(), 2);
        assert_eq!(arena.pending(), 3);
        assert_eq!(arena.total(), 5);

        assert!(!arena.recycle(NoteId(0), &acc, &mut queues));

        let lane1 = Lane::new(1).unwrap();
        let id = queues.lane_mut(lane1).pop_front().unwrap();
        arena.get_mut(id).unwrap().resolve(Judgement::Perfect);
        assert!(arena.recycle(id, &acc, &mut queues));

        let rebuilt = arena.get(id).unwrap();
        assert_eq!(rebuilt.def.id, 2);
        assert!(!rebuilt.is_hit);
        assert_eq!(queues.front(lane1), Some(id));
        assert_eq!(arena.pending(), 2);
        assert!(queues.all_sorted());
    }
}
