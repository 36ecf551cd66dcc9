//! Shared channel infrastructure between system threads.
//!
//! The `SystemBus` connects the input source, the logic loop and the audio
//! worker with lock-free channels and a few shared atomics.

use crate::input::events::GameAction;
use crate::models::stats::Judgement;
use crate::shared::snapshot::GameplaySnapshot;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};

/// System-level events broadcast to the logic loop.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Shutdown requested.
    Quit,
}

/// Commands sent to the dedicated audio thread.
#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// Prepares a track. `length_secs` is the chart duration, used when the
    /// device cannot report one.
    Load {
        path: Option<PathBuf>,
        length_secs: f64,
    },
    Play,
    Pause,
    /// Stop and reset playback position.
    Stop,
    /// Seek to a position (in seconds).
    Seek { position_secs: f64 },
    /// Ends the worker.
    Shutdown,
}

/// One resolved note, as reported to the score sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEvent {
    pub judgement: Judgement,
    pub rainbow: bool,
}

/// Aggregates the cross-thread communication channels.
#[derive(Clone)]
pub struct SystemBus {
    /// Input → Logic: gameplay actions.
    pub action_tx: Sender<GameAction>,
    pub action_rx: Receiver<GameAction>,

    /// Logic → Main: one event per resolved note.
    pub score_tx: Sender<ScoreEvent>,
    pub score_rx: Receiver<ScoreEvent>,

    /// Logic → Main: gameplay snapshots.
    pub snapshot_tx: Sender<GameplaySnapshot>,
    pub snapshot_rx: Receiver<GameplaySnapshot>,

    /// Main → Logic: system events.
    pub sys_tx: Sender<SystemEvent>,
    pub sys_rx: Receiver<SystemEvent>,

    /// Logic → Audio: audio commands.
    pub audio_cmd_tx: Sender<AudioCommand>,
    pub audio_cmd_rx: Receiver<AudioCommand>,

    /// Shared audio position in samples.
    /// Written by the audio thread, read by the logic thread.
    pub audio_position: Arc<AtomicU64>,
    pub audio_sample_rate: Arc<AtomicU64>,
    pub audio_channels: Arc<AtomicU64>,
    pub audio_playing: Arc<AtomicBool>,
    /// Track length in seconds, stored as `f64` bits.
    pub audio_length: Arc<AtomicU64>,
}

impl SystemBus {
    /// Creates a new system bus with all channels initialized.
    pub fn new() -> Self {
        let (action_tx, action_rx) = unbounded();
        let (score_tx, score_rx) = unbounded();

        // Bounded snapshot channel: stale snapshots are dropped
        let (snapshot_tx, snapshot_rx) = bounded(2);

        let (sys_tx, sys_rx) = unbounded();
        let (audio_cmd_tx, audio_cmd_rx) = unbounded();

        Self {
            action_tx,
            action_rx,
            score_tx,
            score_rx,
            snapshot_tx,
            snapshot_rx,
            sys_tx,
            sys_rx,
            audio_cmd_tx,
            audio_cmd_rx,
            audio_position: Arc::new(AtomicU64::new(0)),
            audio_sample_rate: Arc::new(AtomicU64::new(44100)),
            audio_channels: Arc::new(AtomicU64::new(2)),
            audio_playing: Arc::new(AtomicBool::new(false)),
            audio_length: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}
