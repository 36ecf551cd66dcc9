//! Gameplay session: the timing and judgement core.
//!
//! A `GameSession` owns the note arena, the lane queues and the per-phase
//! state. It is driven from two cadences:
//! - [`GameSession::frame`] once per rendered frame: one clock read, input
//!   sampling, the press pass, the hold pass, then the scroll position.
//! - [`GameSession::fixed_tick`] at a fixed rate while audio plays: the miss
//!   sweep, then the activation sweep.
//!
//! Collaborators arrive through a [`PhaseContext`]; a phase missing one it
//! needs logs and skips that tick.

mod input;
mod judgement;
mod snapshot;
mod sweep;

pub mod clock;

pub use clock::{ClockMode, ClockReading, ScrollMapper, TrackClock};
pub use input::{AvatarFocus, InputSampler, LaneInput};

use crate::input::events::InputFrame;
use crate::models::engine::{
    ChartMeta, HitWindow, Lane, LaneQueues, NoteArena, NoteId, OffsetAccumulator, OffsetSet,
    ResolvedChart, TrackGeometry, TrackLayout,
};
use crate::models::settings::Settings;
use crate::models::stats::Judgement;
use crate::state::traits::{NoteVisuals, PhaseContext, ScoreSink};
use std::collections::HashSet;

/// Main gameplay engine handling note timing, judgement and track scroll.
pub struct GameSession {
    /// Song-level chart data.
    pub meta: ChartMeta,
    pub(crate) arena: NoteArena,
    pub(crate) queues: LaneQueues,

    pub(crate) hit_window: HitWindow,
    pub(crate) offsets: OffsetAccumulator,
    pub(crate) layout: TrackLayout,

    pub(crate) clock: TrackClock,
    pub(crate) scroll: ScrollMapper,
    pub(crate) input: InputSampler,

    /// Visibility lookahead in seconds.
    pub(crate) note_activate_time: f64,
    /// Notes stamped at or before this time can never be played.
    pub(crate) start_time: f64,
    pub(crate) speed: f64,
    pub(crate) pooled: bool,

    /// Number of notes resolved so far.
    pub(crate) resolved: usize,
    pub(crate) last_scroll_x: Option<f64>,
    /// Missing collaborators already reported.
    warned: HashSet<(&'static str, &'static str)>,
}

impl GameSession {
    /// Builds a session from a resolved chart. Nothing here can fail: load
    /// errors are reported before a chart becomes a `ResolvedChart`.
    pub fn new(chart: ResolvedChart, settings: &Settings) -> Self {
        let offsets = OffsetAccumulator::new(OffsetSet::from_settings(settings));
        let geometry = TrackGeometry::new(
            settings.track.origin_x,
            settings.track.speed,
            chart.meta.duration,
        );
        let layout = offsets.layout(geometry);

        let (arena, queues) = NoteArena::build(chart.notes, settings.track.pool_size, &offsets);
        log::info!(
            "ENGINE: Session ready ({} notes, {} slots, judgement line at {:.2})",
            arena.total(),
            arena.slots(),
            layout.judgement_x
        );

        let c = &settings.calibration;
        Self {
            meta: chart.meta,
            arena,
            queues,
            hit_window: settings.hit_window(),
            offsets,
            layout,
            clock: TrackClock::new(settings.pre_roll_time(), c.start_time, c.custom_audio_offset),
            scroll: ScrollMapper::new(layout),
            input: InputSampler::new(c.press_threshold),
            note_activate_time: c.note_activate_time,
            start_time: c.start_time,
            speed: settings.track.speed,
            pooled: settings.track.pool_size > 0,
            resolved: 0,
            last_scroll_x: None,
            warned: HashSet::new(),
        }
    }

    /// Re-applies calibration offsets. Corrected times are recomputed from
    /// absolute times, so calling this repeatedly never drifts. The judgement
    /// clock picks up the new audio offset and start time on its next read.
    pub fn apply_offsets(&mut self, offsets: OffsetSet) {
        self.start_time = offsets.start_time;
        self.clock.set_offsets(offsets.start_time, offsets.custom_audio_offset);
        self.offsets = OffsetAccumulator::new(offsets);
        self.layout = self.offsets.layout(self.layout.geometry);
        self.scroll = ScrollMapper::new(self.layout);
        self.arena.apply_offsets(&self.offsets);
    }

    /// Variable-rate phase, once per rendered frame.
    pub fn frame(
        &mut self,
        dt: f64,
        frame: &InputFrame,
        ctx: &mut PhaseContext,
    ) -> Option<ClockReading> {
        let Some(audio) = ctx.audio.as_deref_mut() else {
            self.note_missing("frame", "audio clock");
            return None;
        };
        let reading = self.clock.update(dt, audio);

        self.input.sample(frame, dt);

        if reading.mode != ClockMode::Ended {
            self.press_pass(&reading, ctx);
            self.hold_pass(&reading, ctx);
        }

        self.update_scroll(&reading, ctx);
        Some(reading)
    }

    /// Fixed-rate phase. Does nothing unless the device is playing.
    pub fn fixed_tick(&mut self, ctx: &mut PhaseContext) {
        let Some(audio) = ctx.audio.as_deref() else {
            self.note_missing("fixed tick", "audio clock");
            return;
        };
        if !audio.is_playing() || self.clock.mode() != ClockMode::Playing {
            return;
        }
        let reading = self.clock.sample(audio);

        self.miss_sweep(&reading, ctx);
        self.activation_sweep(&reading, ctx);
    }

    fn update_scroll(&mut self, reading: &ClockReading, ctx: &mut PhaseContext) {
        let Some(x) = self.scroll.position(reading) else {
            return;
        };
        self.last_scroll_x = Some(x);
        match ctx.visuals.as_deref_mut() {
            Some(visuals) => visuals.set_track_position(x),
            None => self.note_missing("scroll", "note visuals"),
        }
    }

    /// The external track-state machine reached its end.
    pub fn signal_ended(&mut self) {
        self.clock.signal_ended();
    }

    /// Pops the lane's front note and resolves it.
    ///
    /// This is the only place a note reaches `Resolved` and the only caller
    /// of the score sink. A note already hit is popped but not re-scored.
    pub(crate) fn resolve_front<'v>(
        &mut self,
        lane: Lane,
        judgement: Judgement,
        score: &mut dyn ScoreSink,
        mut visuals: Option<&mut (dyn NoteVisuals + 'v)>,
    ) -> Option<NoteId> {
        let id = self.queues.lane_mut(lane).pop_front()?;
        let Some(note) = self.arena.get_mut(id) else {
            log::error!("ENGINE: {} queued unknown note {}", lane, id);
            return None;
        };

        if !note.resolve(judgement) {
            log::trace!("ENGINE: Note {} already resolved", id);
            return Some(id);
        }
        let rainbow = note.def.rainbow;
        let is_hold = note.kind().is_hold();
        log::debug!(
            "ENGINE: {} note {} -> {:?} at {:.3}s",
            lane,
            note.def.id,
            judgement,
            self.clock.current_track_time()
        );

        score.update_score(judgement, rainbow);
        self.resolved += 1;

        if is_hold {
            let state = self.input.lane_mut(lane);
            state.on_hold_note = false;
            if let Some(v) = visuals.as_deref_mut() {
                v.set_hold_feedback(lane, false);
            }
        }
        if let Some(v) = visuals.as_deref_mut() {
            v.set_active(id, false);
        }

        if self.pooled {
            self.arena.recycle(id, &self.offsets, &mut self.queues);
        }
        Some(id)
    }

    /// Logs a missing collaborator once per phase, then only at trace level.
    pub(crate) fn note_missing(&mut self, phase: &'static str, what: &'static str) {
        if self.warned.insert((phase, what)) {
            log::warn!("ENGINE: {} skipped, no {} attached", phase, what);
        } else {
            log::trace!("ENGINE: {} skipped, no {} attached", phase, what);
        }
    }

    pub fn clock(&self) -> &TrackClock {
        &self.clock
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn queues(&self) -> &LaneQueues {
        &self.queues
    }

    pub fn arena(&self) -> &NoteArena {
        &self.arena
    }

    pub fn input(&self) -> &InputSampler {
        &self.input
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// True once every chart note has been resolved or the track ended.
    pub fn is_finished(&self) -> bool {
        self.resolved >= self.arena.total() || self.clock.mode() == ClockMode::Ended
    }
}
