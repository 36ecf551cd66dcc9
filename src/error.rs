//! Error types for chart and settings loading.
//!
//! Only loading can fail. The per-frame phases recover locally and never
//! surface errors to the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to read chart {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed chart JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Note {note}: field `{field}` is not a number ({value:?})")]
    InvalidNumber {
        note: usize,
        field: &'static str,
        value: String,
    },

    #[error("Chart field `{field}` is not a number ({value:?})")]
    InvalidChartField { field: &'static str, value: String },

    #[error("Invalid bpm {0}")]
    InvalidBpm(f64),

    #[error("Invalid time signature {top}/{bottom}")]
    InvalidTimeSignature { top: i64, bottom: i64 },

    #[error("Note {note}: unknown lane {lane}")]
    UnknownLane { note: i64, lane: i64 },

    #[error("Note {note}: unknown note type {kind}")]
    UnknownNoteType { note: i64, kind: i64 },

    #[error("Note {note}: negative position (bar {bar}, beat {beat})")]
    NegativePosition { note: i64, bar: i64, beat: i64 },

    #[error("Note {note}: position out of range (bar {bar}, beat {beat})")]
    PositionOverflow { note: i64, bar: i64, beat: i64 },

    #[error("Note {note}: invalid beat fraction {top}/{bottom}")]
    InvalidFraction { note: i64, top: i64, bottom: i64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Hit windows must satisfy 0 < perfect < great < meh (got {perfect}, {great}, {meh})")]
    ThresholdOrder { perfect: f64, great: f64, meh: f64 },

    #[error("`{field}` must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
}
