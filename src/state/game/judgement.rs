//! Press and hold passes.
//!
//! Both passes judge every lane against the same clock reading. The press
//! pass runs first so a hold engaged this frame is tracked by the hold pass
//! in the same frame.

use super::GameSession;
use super::clock::ClockReading;
use crate::models::engine::{Direction, Lane, NoteKind, PressRule};
use crate::models::stats::Judgement;
use crate::state::traits::{AvatarController, HitKind, PhaseContext};

/// True when moving from the avatar's current height to the lane's
/// reference height goes in `direction`. Staying level matches neither.
fn moves_in(direction: Direction, avatar: &dyn AvatarController, lane: Lane) -> bool {
    let from = avatar.height();
    let to = avatar.lane_height(lane);
    match direction {
        Direction::Up => to > from,
        Direction::Down => to < from,
    }
}

impl GameSession {
    pub(crate) fn press_pass(&mut self, reading: &ClockReading, ctx: &mut PhaseContext) {
        let (Some(score), Some(avatar)) = (ctx.score.as_deref_mut(), ctx.avatar.as_deref_mut())
        else {
            self.note_missing("press pass", "score sink or avatar");
            return;
        };
        let mut visuals = ctx.visuals.as_deref_mut();

        for lane in Lane::ALL {
            let state = *self.input.lane(lane);
            if !state.press_latched {
                continue;
            }

            let Some(id) = self.queues.front(lane) else {
                if !state.idle_announced {
                    avatar.move_to(lane, HitKind::IdlePress);
                }
                self.input.consume_press(lane);
                continue;
            };
            let Some(note) = self.arena.get(id) else {
                self.input.consume_press(lane);
                continue;
            };

            // Re-pressing during an engaged hold must not re-judge its head.
            if note.kind() == NoteKind::Hold && state.on_hold_note {
                self.input.consume_press(lane);
                continue;
            }

            let delta = note.corrected_time - reading.track_time;
            let Some(mut judgement) = self.hit_window.judge(delta) else {
                // Not due yet: keep the latch, move the avatar once.
                if !state.idle_announced {
                    avatar.move_to(lane, HitKind::IdlePress);
                    self.input.lane_mut(lane).idle_announced = true;
                }
                continue;
            };

            match note.kind().press_rule() {
                PressRule::Resolve => {
                    self.resolve_front(lane, judgement, score, visuals.as_deref_mut());
                    avatar.move_to(lane, HitKind::TapHit);
                }
                PressRule::Engage => {
                    if let Some(note) = self.arena.get_mut(id) {
                        note.engage(judgement);
                    }
                    self.input.lane_mut(lane).on_hold_note = true;
                    avatar.move_to(lane, HitKind::HoldEngage);
                    if let Some(v) = visuals.as_deref_mut() {
                        v.set_hold_feedback(lane, true);
                    }
                    log::debug!("ENGINE: {} hold engaged ({:?})", lane, judgement);
                }
                PressRule::ResolveDirectional(direction) => {
                    if !moves_in(direction, avatar, lane) {
                        judgement = judgement.min(Judgement::Meh);
                    }
                    self.resolve_front(lane, judgement, score, visuals.as_deref_mut());
                    avatar.move_to(lane, HitKind::TapHit);
                }
            }

            self.input.consume_press(lane);
        }
    }

    pub(crate) fn hold_pass(&mut self, reading: &ClockReading, ctx: &mut PhaseContext) {
        let Some(score) = ctx.score.as_deref_mut() else {
            self.note_missing("hold pass", "score sink");
            return;
        };
        let mut visuals = ctx.visuals.as_deref_mut();

        for lane in Lane::ALL {
            let state = *self.input.lane(lane);
            if !state.on_hold_note {
                continue;
            }

            let front = self.queues.front(lane).and_then(|id| self.arena.get(id));
            let Some(note) = front.filter(|n| n.kind() == NoteKind::Hold) else {
                self.input.lane_mut(lane).on_hold_note = false;
                continue;
            };
            let id = note.id;
            let pressed = note.judgement;

            if state.hold_level {
                let remaining =
                    self.speed * (note.length + note.corrected_time - reading.audio_time);
                if let Some(v) = visuals.as_deref_mut() {
                    v.set_hold_span(id, self.layout.judgement_x, remaining);
                }
                if remaining < -self.hit_window.perfect_s {
                    log::debug!("ENGINE: {} hold ran out", lane);
                    self.resolve_front(lane, pressed, score, visuals.as_deref_mut());
                }
            } else {
                let release = self.hit_window.judge(note.tail_time() - reading.track_time);
                let judgement = self.hit_window.combine_release(pressed, release);
                log::debug!(
                    "ENGINE: {} hold released ({:?} + {:?} -> {:?})",
                    lane,
                    pressed,
                    release,
                    judgement
                );
                self.resolve_front(lane, judgement, score, visuals.as_deref_mut());
            }
        }
    }
}
