pub mod arena;
pub mod chart;
pub mod constants;
pub mod hit_window;
pub mod lanes;
pub mod note;
pub mod offsets;

pub use arena::NoteArena;
pub use chart::{ChartMeta, ChartTimeResolver, ResolvedChart, load_chart, parse_chart};
pub use constants::*;
pub use hit_window::HitWindow;
pub use lanes::{Lane, LaneQueue, LaneQueues};
pub use note::{
    ChartNoteDef, Direction, Note, NoteId, NoteKind, NoteState, PressRule, ResolvedNote,
};
pub use offsets::{OffsetAccumulator, OffsetSet, TrackGeometry, TrackLayout};
