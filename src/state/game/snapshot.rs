use super::GameSession;
use crate::models::engine::Lane;
use crate::shared::snapshot::{GameplaySnapshot, LaneSnapshot};
use crate::state::traits::Snapshot;

impl Snapshot for GameSession {
    type Output = GameplaySnapshot;

    fn create_snapshot(&self) -> GameplaySnapshot {
        let reading = self.clock.last();
        let lanes = Lane::ALL.map(|lane| LaneSnapshot {
            queued: self.queues.lane(lane).len(),
            front_time: self
                .queues
                .front(lane)
                .and_then(|id| self.arena.get(id))
                .map(|note| note.corrected_time),
        });

        GameplaySnapshot {
            track_time: reading.track_time,
            mode: reading.mode,
            scroll_x: self.last_scroll_x,
            lanes,
            avatar_lane: self.input.avatar_focus().map(|focus| focus.lane),
            resolved: self.resolved,
            total: self.arena.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::InputFrame;
    use crate::models::engine::parse_chart;
    use crate::models::settings::Settings;
    use crate::state::game::ClockMode;
    use crate::state::game::clock::tests::ManualAudio;
    use crate::state::traits::PhaseContext;

    #[test]
    fn snapshot_reports_queues_and_progress() {
        let chart = parse_chart(
            r#"{"bpm": 120, "timesignaturetop": 4, "timesignaturebottom": 4, "notes": [
                {"id": 1, "bar": 1, "beat": 0, "lane": 0, "notetype": 0},
                {"id": 2, "bar": 1, "beat": 2, "lane": 0, "notetype": 0},
                {"id": 3, "bar": 2, "beat": 0, "lane": 1, "notetype": 0}
            ]}"#,
            None,
        )
        .unwrap();
        let mut session = GameSession::new(chart, &Settings::default());

        let snap = session.create_snapshot();
        assert_eq!(snap.mode, ClockMode::PreRoll);
        assert_eq!(snap.scroll_x, None);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.remaining(), 3);
        let lane3 = snap.lane(Lane::new(3).unwrap());
        assert_eq!(lane3.queued, 2);
        assert!((lane3.front_time.unwrap() - 2.32).abs() < 1e-12);
        assert_eq!(snap.lane(Lane::new(1).unwrap()).front_time, None);

        let mut audio = ManualAudio::default();
        let mut frame = InputFrame::default();
        frame.held[1] = true;
        let mut ctx = PhaseContext {
            audio: Some(&mut audio),
            ..Default::default()
        };
        session.frame(0.5, &frame, &mut ctx);

        let snap = session.create_snapshot();
        assert!((snap.track_time + 2.5).abs() < 1e-12);
        assert_eq!(snap.avatar_lane, Lane::new(2));
    }
}
