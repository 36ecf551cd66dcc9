//! Dedicated audio thread.
//!
//! The shipped worker is a silent device: it does not decode anything and
//! advances the shared position by wall time while playing. It publishes the
//! same atomics a decoding backend would, so the logic side cannot tell the
//! difference.

use crate::system::bus::{AudioCommand, SystemBus};
use crossbeam_channel::RecvTimeoutError;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often the position is republished while no command arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

struct AudioWorker {
    current_path: Option<PathBuf>,
    length: f64,
    sample_rate: u64,
    channels: u64,
    /// Position at the last play, pause or seek.
    base_position: f64,
    started_at: Option<Instant>,
    position_counter: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    shared_length: Arc<AtomicU64>,
}

impl AudioWorker {
    fn new(bus: &SystemBus) -> Self {
        log::info!("AUDIO: No output backend, running in silent mode");
        Self {
            current_path: None,
            length: 0.0,
            sample_rate: bus.audio_sample_rate.load(Ordering::Relaxed).max(1),
            channels: bus.audio_channels.load(Ordering::Relaxed).max(1),
            base_position: 0.0,
            started_at: None,
            position_counter: bus.audio_position.clone(),
            playing: bus.audio_playing.clone(),
            shared_length: bus.audio_length.clone(),
        }
    }

    /// Returns false when the worker should exit.
    fn handle_command(&mut self, cmd: AudioCommand, now: Instant) -> bool {
        match cmd {
            AudioCommand::Load { path, length_secs } => {
                self.load_music(path, length_secs);
            }
            AudioCommand::Play => {
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                    self.playing.store(true, Ordering::Release);
                    log::info!("AUDIO: Playing from {:.2}s", self.base_position);
                }
            }
            AudioCommand::Pause => {
                self.base_position = self.position_at(now);
                self.started_at = None;
                self.playing.store(false, Ordering::Release);
            }
            AudioCommand::Stop => {
                self.started_at = None;
                self.base_position = 0.0;
                self.playing.store(false, Ordering::Release);
            }
            AudioCommand::Seek { position_secs } => {
                self.base_position = self.clamp(position_secs);
                if self.started_at.is_some() {
                    self.started_at = Some(now);
                }
                log::info!("AUDIO: Seeked to {:.1}s", self.base_position);
            }
            AudioCommand::Shutdown => return false,
        }
        self.publish(now);
        true
    }

    fn load_music(&mut self, path: Option<PathBuf>, length_secs: f64) {
        match &path {
            Some(p) if !p.exists() => log::warn!("AUDIO: {:?} not found, timing only", p),
            Some(p) => log::info!("AUDIO: Loaded {:?} ({:.1}s)", p, length_secs),
            None => log::info!("AUDIO: No audio file, timing only ({:.1}s)", length_secs),
        }
        self.current_path = path;
        self.length = length_secs.max(0.0);
        self.base_position = 0.0;
        self.started_at = None;
        self.playing.store(false, Ordering::Release);
        self.shared_length
            .store(self.length.to_bits(), Ordering::Relaxed);
    }

    fn clamp(&self, position: f64) -> f64 {
        if self.length > 0.0 {
            position.clamp(0.0, self.length)
        } else {
            position.max(0.0)
        }
    }

    fn position_at(&self, now: Instant) -> f64 {
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0);
        self.clamp(self.base_position + elapsed)
    }

    /// Republishes the position, stopping at the end of the track.
    fn publish(&mut self, now: Instant) {
        let position = self.position_at(now);
        if self.started_at.is_some() && self.length > 0.0 && position >= self.length {
            self.started_at = None;
            self.base_position = self.length;
            self.playing.store(false, Ordering::Release);
            log::info!("AUDIO: Reached end of {:?}", self.current_path);
        }

        let samples = (position * (self.sample_rate * self.channels) as f64) as u64;
        self.position_counter.store(samples, Ordering::Relaxed);
    }
}

/// Starts the dedicated audio thread.
pub fn start_audio_thread(bus: SystemBus) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("Audio Thread".to_string())
        .spawn(move || {
            log::info!("AUDIO: Thread started");

            let mut worker = AudioWorker::new(&bus);
            loop {
                match bus.audio_cmd_rx.recv_timeout(POLL_INTERVAL) {
                    Ok(cmd) => {
                        if !worker.handle_command(cmd, Instant::now()) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => worker.publish(Instant::now()),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            worker.playing.store(false, Ordering::Release);
            log::info!("AUDIO: Thread stopped");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(bus: &SystemBus) -> f64 {
        bus.audio_position.load(Ordering::Relaxed) as f64 / (44100.0 * 2.0)
    }

    #[test]
    fn position_follows_wall_time_while_playing() {
        let bus = SystemBus::new();
        let mut worker = AudioWorker::new(&bus);
        let t0 = Instant::now();

        worker.handle_command(
            AudioCommand::Load {
                path: None,
                length_secs: 10.0,
            },
            t0,
        );
        worker.handle_command(AudioCommand::Play, t0);
        assert!(bus.audio_playing.load(Ordering::Acquire));

        worker.publish(t0 + Duration::from_millis(1500));
        assert!((position(&bus) - 1.5).abs() < 1e-3);

        worker.handle_command(AudioCommand::Pause, t0 + Duration::from_secs(2));
        worker.publish(t0 + Duration::from_secs(5));
        assert!((position(&bus) - 2.0).abs() < 1e-3);
        assert!(!bus.audio_playing.load(Ordering::Acquire));
    }

    #[test]
    fn playback_stops_at_track_end() {
        let bus = SystemBus::new();
        let mut worker = AudioWorker::new(&bus);
        let t0 = Instant::now();
        worker.handle_command(
            AudioCommand::Load {
                path: None,
                length_secs: 1.0,
            },
            t0,
        );
        worker.handle_command(AudioCommand::Play, t0);

        worker.publish(t0 + Duration::from_secs(3));
        assert!(!bus.audio_playing.load(Ordering::Acquire));
        assert!((position(&bus) - 1.0).abs() < 1e-3);
        assert_eq!(f64::from_bits(bus.audio_length.load(Ordering::Relaxed)), 1.0);
    }

    #[test]
    fn seek_and_stop_move_the_position() {
        let bus = SystemBus::new();
        let mut worker = AudioWorker::new(&bus);
        let t0 = Instant::now();
        worker.handle_command(
            AudioCommand::Load {
                path: None,
                length_secs: 10.0,
            },
            t0,
        );
        worker.handle_command(AudioCommand::Seek { position_secs: 4.0 }, t0);
        assert!((position(&bus) - 4.0).abs() < 1e-3);

        worker.handle_command(AudioCommand::Stop, t0);
        assert_eq!(bus.audio_position.load(Ordering::Relaxed), 0);
        assert!(!worker.handle_command(AudioCommand::Shutdown, t0));
    }
}
