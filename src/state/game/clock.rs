//! Track clock and scroll mapping.
//!
//! Before playback the clock counts down a synthetic pre-roll; once the audio
//! device reports playing, track time is read from the device every frame
//! instead of being integrated, so it cannot drift.

use crate::models::engine::TrackLayout;
use crate::state::traits::AudioClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    PreRoll,
    Playing,
    Ended,
}

/// One read of the clock, shared by every lane within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    pub mode: ClockMode,
    /// Judgement time: device position shifted by the audio calibration.
    pub track_time: f64,
    /// Raw device position.
    pub audio_time: f64,
    pub audio_length: f64,
    pub audio_playing: bool,
    /// Fraction of the pre-roll still to run (1 at start, 0 when done).
    pub pre_roll_fraction: f64,
}

#[derive(Debug, Clone)]
pub struct TrackClock {
    mode: ClockMode,
    pre_roll_total: f64,
    pre_roll_remaining: f64,
    started_audio: bool,
    audio_offset: f64,
    start_time: f64,
    last: ClockReading,
}

impl TrackClock {
    pub fn new(pre_roll: f64, start_time: f64, audio_offset: f64) -> Self {
        let pre_roll = pre_roll.max(0.0);
        Self {
            mode: ClockMode::PreRoll,
            pre_roll_total: pre_roll,
            pre_roll_remaining: pre_roll,
            started_audio: false,
            audio_offset,
            start_time,
            last: ClockReading {
                mode: ClockMode::PreRoll,
                track_time: start_time - pre_roll,
                audio_time: 0.0,
                audio_length: 0.0,
                audio_playing: false,
                pre_roll_fraction: 1.0,
            },
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Most recent reading.
    pub fn last(&self) -> ClockReading {
        self.last
    }

    pub fn current_track_time(&self) -> f64 {
        self.last.track_time
    }

    /// The track-state machine reached its end. Freezes the clock.
    pub fn signal_ended(&mut self) {
        if self.mode != ClockMode::Ended {
            log::info!("ENGINE: Track ended at {:.3}s", self.last.track_time);
        }
        self.mode = ClockMode::Ended;
        self.last.mode = ClockMode::Ended;
    }

    /// Replaces the audio calibration and playable start. Takes effect from
    /// the next read.
    pub fn set_offsets(&mut self, start_time: f64, audio_offset: f64) {
        self.start_time = start_time;
        self.audio_offset = audio_offset;
    }

    fn pre_roll_fraction(&self) -> f64 {
        if self.pre_roll_total > 0.0 {
            (self.pre_roll_remaining / self.pre_roll_total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advances the clock by `dt` and takes this frame's single audio read.
    pub fn update(&mut self, dt: f64, audio: &mut dyn AudioClock) -> ClockReading {
        if self.mode == ClockMode::Ended {
            return self.last;
        }

        if self.mode == ClockMode::PreRoll {
            self.pre_roll_remaining = (self.pre_roll_remaining - dt).max(0.0);
            if self.pre_roll_remaining <= 0.0 {
                if !self.started_audio {
                    audio.play();
                    self.started_audio = true;
                    log::info!("ENGINE: Pre-roll finished, starting audio");
                }
                if audio.is_playing() {
                    self.mode = ClockMode::Playing;
                }
            }
        }

        let audio_playing = audio.is_playing();
        let audio_time = audio.current_time();
        let track_time = match self.mode {
            ClockMode::PreRoll => self.start_time - self.pre_roll_remaining,
            _ => audio_time + self.audio_offset,
        };

        self.last = ClockReading {
            mode: self.mode,
            track_time,
            audio_time,
            audio_length: audio.length(),
            audio_playing,
            pre_roll_fraction: self.pre_roll_fraction(),
        };
        self.last
    }

    /// Takes a fresh audio read for a fixed tick without advancing pre-roll.
    pub fn sample(&self, audio: &dyn AudioClock) -> ClockReading {
        if self.mode != ClockMode::Playing {
            return self.last;
        }
        let audio_time = audio.current_time();
        ClockReading {
            track_time: audio_time + self.audio_offset,
            audio_time,
            audio_length: audio.length(),
            audio_playing: audio.is_playing(),
            ..self.last
        }
    }
}

/// Maps clock readings to the track's scroll position.
#[derive(Debug, Clone, Copy)]
pub struct ScrollMapper {
    pub layout: TrackLayout,
}

impl ScrollMapper {
    pub fn new(layout: TrackLayout) -> Self {
        Self { layout }
    }

    /// Scroll position for this frame, or `None` once the track has ended.
    ///
    /// A playing clock whose device stalls falls back to the pre-roll formula
    /// until the device resumes.
    pub fn position(&self, reading: &ClockReading) -> Option<f64> {
        match reading.mode {
            ClockMode::Ended => None,
            ClockMode::Playing if reading.audio_playing => Some(self.playing_position(reading)),
            _ => Some(self.pre_roll_position(reading.pre_roll_fraction)),
        }
    }

    fn pre_roll_position(&self, fraction: f64) -> f64 {
        let l = &self.layout;
        l.judgement_x + fraction * (l.note_start_x - l.judgement_x)
    }

    fn playing_position(&self, reading: &ClockReading) -> f64 {
        let l = &self.layout;
        if reading.audio_length > 0.0 {
            l.judgement_x - (reading.audio_time / reading.audio_length) * l.geometry.track_length
        } else {
            l.judgement_x - reading.audio_time * l.geometry.speed
        }
    }
}
