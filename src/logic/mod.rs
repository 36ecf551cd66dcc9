//! Logic thread: drives a gameplay session.
//!
//! The loop runs the session's two cadences against wall time: fixed ticks
//! through an accumulator (sweeps), and one frame per render interval (clock,
//! input, judgement, scroll). Each frame ends with a snapshot on the bus.

pub mod audio;
pub mod audio_thread;
pub mod headless;

use crate::input::events::KeyState;
use crate::logic::audio::AudioManager;
use crate::logic::headless::{BusScoreSink, HeadlessVisuals, LaneAvatar};
use crate::models::settings::Settings;
use crate::shared::snapshot::GameplaySnapshot;
use crate::state::game::GameSession;
use crate::state::traits::{AudioClock, PhaseContext, Snapshot};
use crate::system::bus::{SystemBus, SystemEvent};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Upper bound on fixed ticks caught up in one pass.
const MAX_CATCH_UP: u32 = 10;

/// Final state of a session, returned when the logic thread exits.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub snapshot: GameplaySnapshot,
    /// False when the loop was stopped by a quit event.
    pub completed: bool,
}

struct LogicLoop {
    bus: SystemBus,
    session: GameSession,
    audio: AudioManager,
    visuals: HeadlessVisuals,
    scores: BusScoreSink,
    avatar: LaneAvatar,
    keys: KeyState,
    tick_dt: Duration,
    frame_dt: Duration,
}

impl LogicLoop {
    fn new(bus: SystemBus, session: GameSession, settings: &Settings) -> Self {
        let mut audio = AudioManager::new(&bus);
        audio.load_music(session.meta.audio_path.as_deref(), session.meta.duration);

        Self {
            scores: BusScoreSink::new(bus.score_tx.clone()),
            bus,
            session,
            audio,
            visuals: HeadlessVisuals::default(),
            avatar: LaneAvatar::default(),
            keys: KeyState::new(),
            tick_dt: Duration::from_secs_f64(1.0 / settings.track.fixed_tick_rate.max(1) as f64),
            frame_dt: Duration::from_secs_f64(1.0 / settings.track.frame_rate.max(1) as f64),
        }
    }

    fn run(&mut self) -> bool {
        let mut accumulator = Duration::ZERO;
        let mut last_time = Instant::now();
        let mut last_frame = last_time;
        let mut next_frame = last_time;

        loop {
            // 1. Fold input actions into this frame's key state
            while let Ok(action) = self.bus.action_rx.try_recv() {
                self.keys.apply(action);
            }

            // 2. Handle system events
            while let Ok(sys_evt) = self.bus.sys_rx.try_recv() {
                match sys_evt {
                    SystemEvent::Quit => {
                        log::info!("LOGIC: Quit received...");
                        return false;
                    }
                }
            }

            let now = Instant::now();
            accumulator += now - last_time;
            last_time = now;

            let mut ctx = PhaseContext {
                audio: Some(&mut self.audio),
                visuals: Some(&mut self.visuals),
                score: Some(&mut self.scores),
                avatar: Some(&mut self.avatar),
            };

            // 3. Fixed-timestep sweeps
            let mut loops = 0;
            while accumulator >= self.tick_dt && loops < MAX_CATCH_UP {
                self.session.fixed_tick(&mut ctx);
                accumulator -= self.tick_dt;
                loops += 1;
            }
            if loops == MAX_CATCH_UP {
                accumulator = Duration::ZERO;
            }

            // 4. Frame phase, then a snapshot for observers
            let framed = now >= next_frame;
            if framed {
                let dt = (now - last_frame).as_secs_f64();
                last_frame = now;
                next_frame = (next_frame + self.frame_dt).max(now);

                let frame = self.keys.take_frame();
                self.session.frame(dt, &frame, &mut ctx);
                let _ = self.bus.snapshot_tx.try_send(self.session.create_snapshot());
            }

            if self.audio.reached_end() || self.session.is_finished() {
                self.session.signal_ended();
                log::info!(
                    "LOGIC: Session over, {}/{} notes resolved",
                    self.session.resolved_count(),
                    self.session.arena().total()
                );
                return true;
            }

            if !framed && loops == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    fn shutdown(mut self, completed: bool) -> SessionOutcome {
        self.audio.stop();
        self.audio.shutdown();
        SessionOutcome {
            snapshot: self.session.create_snapshot(),
            completed,
        }
    }
}

/// Spawns the logic thread for `session`, together with its audio worker.
///
/// Scores are published as `ScoreEvent`s on the bus; the returned handle
/// yields the final snapshot once the track ends or a quit arrives.
pub fn start_thread(
    bus: SystemBus,
    session: GameSession,
    settings: &Settings,
) -> io::Result<JoinHandle<SessionOutcome>> {
    audio_thread::start_audio_thread(bus.clone())?;

    let mut logic = LogicLoop::new(bus, session, settings);
    thread::Builder::new()
        .name("Logic Thread".to_string())
        .spawn(move || {
            log::info!("LOGIC: Thread started");
            let completed = logic.run();
            logic.shutdown(completed)
        })
}
