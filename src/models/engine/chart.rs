//! Chart loading and beat-to-seconds resolution.
//!
//! Charts are JSON documents. Numeric fields may be written as numbers or as
//! numeric strings; anything else fails the whole load.

use super::constants::SECONDS_PER_MINUTE;
use super::lanes::Lane;
use super::note::{ChartNoteDef, NoteKind, ResolvedNote};
use crate::error::ChartError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Tail room after the last note when the chart declares no duration.
const END_PADDING_S: f64 = 2.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Default for RawNumber {
    fn default() -> Self {
        RawNumber::Int(0)
    }
}

impl RawNumber {
    fn as_f64(&self, note: Option<usize>, field: &'static str) -> Result<f64, ChartError> {
        let value = match self {
            RawNumber::Int(v) => Some(*v as f64),
            RawNumber::Float(v) => Some(*v),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(note, field))
    }

    fn as_i64(&self, note: Option<usize>, field: &'static str) -> Result<i64, ChartError> {
        let value = match self {
            RawNumber::Int(v) => Some(*v),
            RawNumber::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            RawNumber::Float(_) => None,
            RawNumber::Text(s) => s.trim().parse::<i64>().ok(),
        };
        value.ok_or_else(|| self.invalid(note, field))
    }

    /// `note` is the note's position in the file, `None` for chart-level fields.
    fn invalid(&self, note: Option<usize>, field: &'static str) -> ChartError {
        let value = match self {
            RawNumber::Int(v) => v.to_string(),
            RawNumber::Float(v) => v.to_string(),
            RawNumber::Text(s) => s.clone(),
        };
        match note {
            Some(note) => ChartError::InvalidNumber { note, field, value },
            None => ChartError::InvalidChartField { field, value },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(RawNumber),
}

impl Default for RawFlag {
    fn default() -> Self {
        RawFlag::Bool(false)
    }
}

impl RawFlag {
    fn as_bool(&self, note: Option<usize>, field: &'static str) -> Result<bool, ChartError> {
        match self {
            RawFlag::Bool(b) => Ok(*b),
            RawFlag::Number(n) => Ok(n.as_i64(note, field)? != 0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNote {
    id: RawNumber,
    bar: RawNumber,
    beat: RawNumber,
    #[serde(default)]
    beatfractiontop: RawNumber,
    #[serde(default)]
    beatfractionbottom: RawNumber,
    #[serde(default)]
    beatlength: RawNumber,
    #[serde(default)]
    beatlengthfractiontop: RawNumber,
    #[serde(default)]
    beatlengthfractionbottom: RawNumber,
    lane: RawNumber,
    notetype: RawNumber,
    #[serde(default)]
    rainbow: RawFlag,
}

#[derive(Debug, Deserialize)]
struct RawChart {
    bpm: RawNumber,
    timesignaturetop: RawNumber,
    timesignaturebottom: RawNumber,
    #[serde(default)]
    duration: Option<RawNumber>,
    #[serde(default)]
    audiofile: Option<String>,
    #[serde(default)]
    notes: Vec<RawNote>,
}

impl RawNote {
    fn parse(&self, idx: usize) -> Result<ChartNoteDef, ChartError> {
        let idx = Some(idx);
        let id = self.id.as_i64(idx, "id")?;
        let bar = self.bar.as_i64(idx, "bar")?;
        let beat = self.beat.as_i64(idx, "beat")?;
        if bar < 0 || beat < 0 {
            return Err(ChartError::NegativePosition { note: id, bar, beat });
        }

        let beat_fraction = (
            self.beatfractiontop.as_i64(idx, "beatfractiontop")?,
            self.beatfractionbottom.as_i64(idx, "beatfractionbottom")?,
        );
        check_fraction(id, beat_fraction)?;

        let beat_length = self.beatlength.as_i64(idx, "beatlength")?;
        let beat_length_fraction = (
            self.beatlengthfractiontop.as_i64(idx, "beatlengthfractiontop")?,
            self.beatlengthfractionbottom.as_i64(idx, "beatlengthfractionbottom")?,
        );
        check_fraction(id, beat_length_fraction)?;

        let raw_lane = self.lane.as_i64(idx, "lane")?;
        let lane = Lane::from_chart(raw_lane).ok_or(ChartError::UnknownLane {
            note: id,
            lane: raw_lane,
        })?;

        let raw_kind = self.notetype.as_i64(idx, "notetype")?;
        let kind = NoteKind::from_chart(raw_kind).ok_or(ChartError::UnknownNoteType {
            note: id,
            kind: raw_kind,
        })?;

        Ok(ChartNoteDef {
            id,
            bar,
            beat,
            beat_fraction,
            beat_length: beat_length.max(0),
            beat_length_fraction,
            lane,
            kind,
            rainbow: self.rainbow.as_bool(idx, "rainbow")?,
        })
    }
}

fn check_fraction(note: i64, (top, bottom): (i64, i64)) -> Result<(), ChartError> {
    if top < 0 || bottom < 0 {
        return Err(ChartError::InvalidFraction { note, top, bottom });
    }
    Ok(())
}

/// Converts bar/beat positions into seconds for a fixed bpm and meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTimeResolver {
    pub bpm: f64,
    pub time_signature: (i64, i64),
}

impl ChartTimeResolver {
    pub fn new(bpm: f64, top: i64, bottom: i64) -> Result<Self, ChartError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(ChartError::InvalidBpm(bpm));
        }
        if top <= 0 || bottom <= 0 {
            return Err(ChartError::InvalidTimeSignature { top, bottom });
        }
        Ok(Self {
            bpm,
            time_signature: (top, bottom),
        })
    }

    pub fn seconds_per_beat(&self) -> f64 {
        SECONDS_PER_MINUTE / self.bpm
    }

    fn fraction_seconds(&self, (top, bottom): (i64, i64)) -> f64 {
        if top > 0 && bottom > 0 {
            self.seconds_per_beat() * (top as f64 / bottom as f64)
        } else {
            0.0
        }
    }

    /// Seconds from track start. Beats per bar is the signature's top.
    pub fn absolute_time(&self, def: &ChartNoteDef) -> Result<f64, ChartError> {
        let beats = def
            .bar
            .checked_mul(self.time_signature.0)
            .and_then(|b| b.checked_add(def.beat))
            .ok_or(ChartError::PositionOverflow {
                note: def.id,
                bar: def.bar,
                beat: def.beat,
            })?;
        Ok(self.seconds_per_beat() * beats as f64 + self.fraction_seconds(def.beat_fraction))
    }

    /// Hold length in seconds; zero for every other kind. Track speed is
    /// applied when the span is drawn, not here.
    pub fn hold_length(&self, def: &ChartNoteDef) -> f64 {
        if !def.kind.is_hold() {
            return 0.0;
        }
        self.seconds_per_beat() * def.beat_length as f64
            + self.fraction_seconds(def.beat_length_fraction)
    }

    /// Resolves every definition, ordered by absolute time (stable on ties).
    pub fn resolve(&self, defs: Vec<ChartNoteDef>) -> Result<Vec<ResolvedNote>, ChartError> {
        let mut notes = defs
            .into_iter()
            .map(|def| {
                Ok(ResolvedNote {
                    absolute_time: self.absolute_time(&def)?,
                    length: self.hold_length(&def),
                    def,
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;
        notes.sort_by(|a, b| a.absolute_time.total_cmp(&b.absolute_time));
        Ok(notes)
    }
}

/// Song-level chart data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMeta {
    pub bpm: f64,
    pub time_signature: (i64, i64),
    /// Track duration in seconds.
    pub duration: f64,
    pub audio_path: Option<PathBuf>,
}

/// A fully parsed and resolved chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChart {
    pub meta: ChartMeta,
    pub notes: Vec<ResolvedNote>,
}

impl ResolvedChart {
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
}

/// Loads and resolves a chart file. The audio path is taken relative to the
/// chart's directory.
pub fn load_chart(path: &Path) -> Result<ResolvedChart, ChartError> {
    let content = fs::read_to_string(path).map_err(|source| ChartError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let chart = parse_chart(&content, path.parent())?;
    log::info!(
        "CHART: Loaded {:?} ({} notes, {:.1} bpm, {:.1}s)",
        path,
        chart.note_count(),
        chart.meta.bpm,
        chart.meta.duration
    );
    Ok(chart)
}

/// Parses chart JSON. Either every note resolves or nothing is returned.
pub fn parse_chart(content: &str, base_dir: Option<&Path>) -> Result<ResolvedChart, ChartError> {
    let raw: RawChart = serde_json::from_str(content)?;

    let bpm = raw.bpm.as_f64(None, "bpm")?;
    let top = raw.timesignaturetop.as_i64(None, "timesignaturetop")?;
    let bottom = raw.timesignaturebottom.as_i64(None, "timesignaturebottom")?;
    let resolver = ChartTimeResolver::new(bpm, top, bottom)?;

    let defs = raw
        .notes
        .iter()
        .enumerate()
        .map(|(idx, note)| note.parse(idx))
        .collect::<Result<Vec<_>, _>>()?;
    let notes = resolver.resolve(defs)?;

    let declared = match &raw.duration {
        Some(d) => d.as_f64(None, "duration")?,
        None => 0.0,
    };
    let duration = if declared > 0.0 {
        declared
    } else {
        let last_end = notes
            .iter()
            .map(|n| n.absolute_time + n.length)
            .fold(0.0, f64::max);
        last_end + END_PADDING_S
    };

    let audio_path = raw.audiofile.as_ref().map(|file| match base_dir {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    });

    Ok(ResolvedChart {
        meta: ChartMeta {
            bpm,
            time_signature: (top, bottom),
            duration,
            audio_path,
        },
        notes,
    })
}
