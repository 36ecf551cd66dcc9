//! Audio manager that sends commands to the dedicated audio thread.
//!
//! Control calls never block: they only enqueue a command. The position is
//! read back from the sample counter the worker shares on the bus.

use crate::state::traits::AudioClock;
use crate::system::bus::{AudioCommand, SystemBus};
use crossbeam_channel::Sender;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct AudioManager {
    cmd_tx: Sender<AudioCommand>,
    position: Arc<AtomicU64>,
    sample_rate: Arc<AtomicU64>,
    channels: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    length: Arc<AtomicU64>,
}

impl AudioManager {
    /// Creates a new audio manager connected to the system bus.
    pub fn new(bus: &SystemBus) -> Self {
        Self {
            cmd_tx: bus.audio_cmd_tx.clone(),
            position: bus.audio_position.clone(),
            sample_rate: bus.audio_sample_rate.clone(),
            channels: bus.audio_channels.clone(),
            playing: bus.audio_playing.clone(),
            length: bus.audio_length.clone(),
        }
    }

    fn send(&self, cmd: AudioCommand) {
        if let Err(e) = self.cmd_tx.send(cmd) {
            log::error!("AUDIO: Worker unreachable, dropped {:?}", e.0);
        }
    }

    pub fn load_music(&mut self, path: Option<&Path>, length_secs: f64) {
        self.send(AudioCommand::Load {
            path: path.map(Path::to_path_buf),
            length_secs,
        });
    }

    /// Seeks to a position in seconds.
    pub fn seek(&mut self, position_secs: f64) {
        self.send(AudioCommand::Seek { position_secs });
    }

    pub fn shutdown(&self) {
        self.send(AudioCommand::Shutdown);
    }

    /// Returns the current playback position in seconds.
    pub fn get_position_seconds(&self) -> f64 {
        let samples = self.position.load(Ordering::Relaxed) as f64;
        let sample_rate = self.sample_rate.load(Ordering::Relaxed).max(1) as f64;
        let channels = self.channels.load(Ordering::Relaxed).max(1) as f64;

        samples / (sample_rate * channels)
    }

    /// True once playback ran to the end of the track.
    pub fn reached_end(&self) -> bool {
        let length = self.length();
        length > 0.0 && !self.is_playing() && self.get_position_seconds() >= length
    }
}

impl AudioClock for AudioManager {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn current_time(&self) -> f64 {
        self.get_position_seconds()
    }

    fn length(&self) -> f64 {
        f64::from_bits(self.length.load(Ordering::Relaxed))
    }

    fn play(&mut self) {
        self.send(AudioCommand::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn stop(&mut self) {
        self.send(AudioCommand::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_reach_the_worker_channel() {
        let bus = SystemBus::new();
        let mut audio = AudioManager::new(&bus);
        audio.load_music(None, 12.0);
        audio.play();
        audio.seek(1.5);

        let received: Vec<_> = bus.audio_cmd_rx.try_iter().collect();
        assert!(matches!(
            received[0],
            AudioCommand::Load { path: None, length_secs } if length_secs == 12.0
        ));
        assert!(matches!(received[1], AudioCommand::Play));
        assert!(matches!(received[2], AudioCommand::Seek { position_secs } if position_secs == 1.5));
    }

    #[test]
    fn position_is_read_from_shared_samples() {
        let bus = SystemBus::new();
        let audio = AudioManager::new(&bus);
        bus.audio_position.store(44100 * 2 * 3, Ordering::Relaxed);
        bus.audio_length.store(3.0f64.to_bits(), Ordering::Relaxed);

        assert_eq!(audio.current_time(), 3.0);
        assert_eq!(audio.length(), 3.0);
        assert!(audio.reached_end());

        bus.audio_playing.store(true, Ordering::Release);
        assert!(!audio.reached_end());
    }
}
