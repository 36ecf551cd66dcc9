//! Fixed-tick sweeps: retire expired notes, then reveal upcoming ones.
//!
//! Misses run first so a note can never be missed and newly shown within the
//! same tick.

use super::GameSession;
use super::clock::ClockReading;
use crate::models::engine::{Lane, NoteState};
use crate::models::stats::Judgement;
use crate::state::traits::PhaseContext;

impl GameSession {
    pub(crate) fn miss_sweep(&mut self, reading: &ClockReading, ctx: &mut PhaseContext) {
        let Some(score) = ctx.score.as_deref_mut() else {
            self.note_missing("miss sweep", "score sink");
            return;
        };
        let mut visuals = ctx.visuals.as_deref_mut();

        for lane in Lane::ALL {
            while let Some(note) = self.queues.front(lane).and_then(|id| self.arena.get(id)) {
                if note.kind().is_hold() && self.input.lane(lane).on_hold_note {
                    break;
                }

                let before_start = note.corrected_time <= self.start_time;
                let expired = self
                    .hit_window
                    .is_expired(note.corrected_time, reading.track_time);
                if !(expired || before_start) {
                    break;
                }

                self.resolve_front(lane, Judgement::Miss, score, visuals.as_deref_mut());
            }
        }
    }

    pub(crate) fn activation_sweep(&mut self, reading: &ClockReading, ctx: &mut PhaseContext) {
        let Some(visuals) = ctx.visuals.as_deref_mut() else {
            self.note_missing("activation sweep", "note visuals");
            return;
        };

        for note in self.arena.iter_mut() {
            if note.state != NoteState::Scheduled || note.is_hit {
                continue;
            }
            if note.corrected_time - reading.audio_time < self.note_activate_time && note.activate()
            {
                visuals.set_active(note.id, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::input::events::InputFrame;
    use crate::models::engine::{Lane, NoteId, NoteState, parse_chart};
    use crate::models::settings::Settings;
    use crate::models::stats::Judgement;
    use crate::state::game::GameSession;
    use crate::state::game::clock::tests::ManualAudio;
    use crate::state::traits::{NoteVisuals, PhaseContext, ScoreSink};

    #[derive(Default)]
    struct Recorder {
        scores: Vec<Judgement>,
    }

    impl ScoreSink for Recorder {
        fn update_score(&mut self, judgement: Judgement, _rainbow: bool) {
            self.scores.push(judgement);
        }
    }

    #[derive(Default)]
    struct Shown(Vec<NoteId>);

    impl NoteVisuals for Shown {
        fn set_active(&mut self, note: NoteId, active: bool) {
            if active {
                self.0.push(note);
            }
        }
        fn set_hold_span(&mut self, _note: NoteId, _anchor_x: f64, _span: f64) {}
        fn set_track_position(&mut self, _x: f64) {}
        fn set_hold_feedback(&mut self, _lane: Lane, _active: bool) {}
    }

    const NOTES: &str = r#"{"bpm": 60, "timesignaturetop": 4, "timesignaturebottom": 4,
        "duration": 60, "notes": [
            {"id": 1, "bar": 1, "beat": 0, "lane": 2, "notetype": 0},
            {"id": 2, "bar": 1, "beat": 1, "lane": 2, "notetype": 1, "beatlength": 4},
            {"id": 3, "bar": 3, "beat": 0, "lane": 1, "notetype": 0}
        ]}"#;

    fn session(pool_size: usize) -> GameSession {
        let mut settings = Settings::default();
        settings.calibration.base_offset = 0.0;
        settings.calibration.music_delay = 0.0;
        settings.calibration.note_activate_time = 2.0;
        settings.track.pool_size = pool_size;
        GameSession::new(parse_chart(NOTES, None).unwrap(), &settings)
    }

    fn start(session: &mut GameSession, audio: &mut ManualAudio) {
        let mut ctx = PhaseContext {
            audio: Some(audio),
            ..Default::default()
        };
        session.frame(0.0, &InputFrame::default(), &mut ctx);
    }

    fn tick(
        session: &mut GameSession,
        audio: &mut ManualAudio,
        rec: &mut Recorder,
        shown: &mut Shown,
    ) {
        let mut ctx = PhaseContext {
            audio: Some(audio),
            visuals: Some(shown),
            score: Some(rec),
            ..Default::default()
        };
        session.fixed_tick(&mut ctx);
    }

    fn lane(n: u8) -> Lane {
        Lane::new(n).unwrap()
    }

    #[test]
    fn unpressed_tap_is_missed_after_window() {
        let mut s = session(0);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);

        audio.time = 4.25;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert!(rec.scores.is_empty());

        audio.time = 4.31;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores, vec![Judgement::Miss]);
        assert_eq!(s.queues().lane(lane(1)).len(), 1);
        assert_eq!(
            s.arena().get(NoteId(0)).unwrap().state,
            NoteState::Resolved(Judgement::Miss)
        );
    }

    #[test]
    fn engaged_hold_is_immune_to_misses() {
        let mut s = session(0);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);

        audio.time = 4.4;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores.len(), 1);

        s.input.lane_mut(lane(1)).on_hold_note = true;
        audio.time = 6.0;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores.len(), 1);
        assert_eq!(s.queues().lane(lane(1)).len(), 1);

        s.input.lane_mut(lane(1)).on_hold_note = false;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores, vec![Judgement::Miss, Judgement::Miss]);
    }

    #[test]
    fn sweeps_wait_for_playing_audio() {
        let mut s = session(0);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);

        audio.playing = false;
        audio.time = 30.0;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert!(rec.scores.is_empty());
        assert!(shown.0.is_empty());
    }

    #[test]
    fn notes_activate_inside_lookahead_once() {
        let mut s = session(0);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);

        audio.time = 2.1;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(shown.0, vec![NoteId(0)]);

        audio.time = 3.5;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(shown.0, vec![NoteId(0), NoteId(1)]);
        assert_eq!(s.arena().get(NoteId(2)).unwrap().state, NoteState::Scheduled);
    }

    #[test]
    fn missed_notes_are_not_activated_in_the_same_tick() {
        let mut s = session(0);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);

        audio.time = 4.5;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores, vec![Judgement::Miss]);
        assert!(!shown.0.contains(&NoteId(0)));
    }

    #[test]
    fn pooled_slots_are_recycled_on_miss() {
        let mut s = session(1);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);
        assert_eq!(s.arena().slots(), 1);

        audio.time = 4.31;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores, vec![Judgement::Miss]);
        let rebuilt = s.arena().get(NoteId(0)).unwrap();
        assert_eq!(rebuilt.def.id, 2);
        assert_eq!(s.queues().front(lane(1)), Some(NoteId(0)));
        assert!(s.queues().all_sorted());
    }

    #[test]
    fn notes_before_start_time_are_missed_immediately() {
        let mut settings = Settings::default();
        settings.calibration.base_offset = 0.0;
        settings.calibration.music_delay = 0.0;
        settings.calibration.start_time = 5.0;
        let mut s = GameSession::new(parse_chart(NOTES, None).unwrap(), &settings);
        let mut audio = ManualAudio::default();
        let (mut rec, mut shown) = (Recorder::default(), Shown::default());
        start(&mut s, &mut audio);

        audio.time = 0.5;
        tick(&mut s, &mut audio, &mut rec, &mut shown);
        assert_eq!(rec.scores, vec![Judgement::Miss, Judgement::Miss]);
        assert_eq!(s.queues().total_len(), 1);
    }
}
