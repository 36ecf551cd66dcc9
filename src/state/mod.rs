//! Gameplay state and the seams it drives.
//!
//! - `game` - the session: clock, input sampling, judgement and sweeps
//! - `traits` - collaborator seams and the snapshot trait

pub mod game;
pub mod traits;

pub use game::GameSession;
pub use traits::{AudioClock, AvatarController, NoteVisuals, PhaseContext, ScoreSink, Snapshot};
