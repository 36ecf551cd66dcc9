//! Lane identifiers and the per-lane note queues.

use super::constants::{LANE_REMAP, NUM_LANES};
use super::note::NoteId;
use std::collections::VecDeque;
use std::fmt;

/// One of the three playable lanes, numbered 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lane(u8);

impl Lane {
    pub const ALL: [Lane; NUM_LANES] = [Lane(1), Lane(2), Lane(3)];

    pub fn new(number: u8) -> Option<Self> {
        (1..=NUM_LANES as u8).contains(&number).then_some(Lane(number))
    }

    /// Maps a raw chart lane (0-2) to its engine lane.
    pub fn from_chart(raw: i64) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|idx| LANE_REMAP.get(idx))
            .map(|&number| Lane(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based index for per-lane arrays.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane {}", self.0)
    }
}

/// Ordered queue of live notes for one lane. The front is the note that is
/// currently judgeable.
#[derive(Debug, Clone, Default)]
pub struct LaneQueue {
    entries: VecDeque<(f64, NoteId)>,
}

impl LaneQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a queue from unordered entries, sorting once by absolute time.
    /// Ties keep their input order.
    pub fn from_unsorted(mut entries: Vec<(f64, NoteId)>) -> Self {
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            entries: entries.into(),
        }
    }

    pub fn front(&self) -> Option<NoteId> {
        self.entries.front().map(|&(_, id)| id)
    }

    pub fn pop_front(&mut self) -> Option<NoteId> {
        self.entries.pop_front().map(|(_, id)| id)
    }

    /// Inserts a recycled note at its sorted position, after any entries with
    /// the same time.
    pub fn insert_sorted(&mut self, absolute_time: f64, id: NoteId) {
        let pos = self
            .entries
            .partition_point(|&(time, _)| time <= absolute_time);
        self.entries.insert(pos, (absolute_time, id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.entries.iter().map(|&(_, id)| id)
    }

    pub fn is_sorted(&self) -> bool {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(a, b)| a.0 <= b.0)
    }
}

/// The three lane queues, addressed by [`Lane`].
#[derive(Debug, Clone, Default)]
pub struct LaneQueues {
    queues: [LaneQueue; NUM_LANES],
}

impl LaneQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lanes(queues: [LaneQueue; NUM_LANES]) -> Self {
        Self { queues }
    }

    pub fn lane(&self, lane: Lane) -> &LaneQueue {
        &self.queues[lane.index()]
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut LaneQueue {
        &mut self.queues[lane.index()]
    }

    pub fn front(&self, lane: Lane) -> Option<NoteId> {
        self.lane(lane).front()
    }

    pub fn total_len(&self) -> usize {
        self.queues.iter().map(LaneQueue::len).sum()
    }

    pub fn all_sorted(&self) -> bool {
        self.queues.iter().all(LaneQueue::is_sorted)
    }
}
