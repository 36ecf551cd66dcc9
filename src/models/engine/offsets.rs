//! Calibration offsets and the track layout they produce.
//!
//! All offsets are seconds and additive. They are folded in one place, once
//! per chart initialisation, always starting again from the absolute times so
//! that re-applying with new values never accumulates.

use crate::models::settings::Settings;

/// The independent timing offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetSet {
    pub music_delay: f64,
    /// Playable start; enters the scroll origin negated.
    pub start_time: f64,
    pub base_offset: f64,
    /// Visual calibration, stamped into every note.
    pub custom_offset: f64,
    /// Audio calibration, applied to the judgement clock read.
    pub custom_audio_offset: f64,
}

impl OffsetSet {
    pub fn from_settings(settings: &Settings) -> Self {
        let c = &settings.calibration;
        Self {
            music_delay: c.music_delay,
            start_time: c.start_time,
            base_offset: c.base_offset,
            custom_offset: c.custom_offset,
            custom_audio_offset: c.custom_audio_offset,
        }
    }

    /// Offset added to a note's absolute time.
    pub fn note_offset(&self) -> f64 {
        self.custom_offset + self.base_offset
    }
}

/// Screen-space description of the scrolling track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub origin_x: f64,
    /// Screen units per second of track time.
    pub speed: f64,
    /// Full track length in screen units.
    pub track_length: f64,
    /// Track duration in seconds.
    pub duration: f64,
}

impl TrackGeometry {
    /// Builds the geometry for a chart; the track length follows from the
    /// duration at the configured speed.
    pub fn new(origin_x: f64, speed: f64, duration: f64) -> Self {
        Self {
            origin_x,
            speed,
            track_length: speed * duration,
            duration,
        }
    }
}

/// Positions derived from geometry plus offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    /// X of the judgement line.
    pub judgement_x: f64,
    /// Track scroll position before playback starts.
    pub note_start_x: f64,
    pub geometry: TrackGeometry,
}

/// Folds the offsets into the layout and into each note's stamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetAccumulator {
    pub offsets: OffsetSet,
}

impl OffsetAccumulator {
    pub fn new(offsets: OffsetSet) -> Self {
        Self { offsets }
    }

    pub fn layout(&self, geometry: TrackGeometry) -> TrackLayout {
        let o = &self.offsets;
        let judgement_x = geometry.origin_x + o.base_offset * geometry.speed;
        let lead_in = -o.start_time + o.music_delay + o.base_offset;
        let note_start_x = if geometry.duration > 0.0 {
            judgement_x + (lead_in / geometry.duration) * geometry.track_length
        } else {
            judgement_x
        };

        TrackLayout {
            judgement_x,
            note_start_x,
            geometry,
        }
    }

    /// Corrected time for a note stamped at `absolute_time`.
    pub fn corrected_time(&self, absolute_time: f64) -> f64 {
        absolute_time + self.offsets.note_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets() -> OffsetSet {
        OffsetSet {
            music_delay: 3.0,
            start_time: 0.0,
            base_offset: 0.32,
            custom_offset: 0.1,
            custom_audio_offset: 0.05,
        }
    }

    #[test]
    fn corrected_time_uses_visual_and_base_offsets_only() {
        let acc = OffsetAccumulator::new(offsets());
        assert!((acc.corrected_time(2.0) - 2.42).abs() < 1e-12);
    }

    #[test]
    fn corrected_time_does_not_accumulate() {
        let acc = OffsetAccumulator::new(offsets());
        let first = acc.corrected_time(2.0);
        let second = acc.corrected_time(2.0);
        assert_eq!(first, second);
    }

    #[test]
    fn layout_places_judgement_line_and_scroll_origin() {
        let acc = OffsetAccumulator::new(offsets());
        let layout = acc.layout(TrackGeometry::new(1.0, 10.0, 100.0));
        assert!((layout.judgement_x - 4.2).abs() < 1e-12);
        // (3.0 + 0.32) / 100 of a 1000-unit track
        assert!((layout.note_start_x - (4.2 + 33.2)).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_keeps_origin_on_judgement_line() {
        let acc = OffsetAccumulator::new(offsets());
        let layout = acc.layout(TrackGeometry::new(0.0, 10.0, 0.0));
        assert_eq!(layout.note_start_x, layout.judgement_x);
    }
}
