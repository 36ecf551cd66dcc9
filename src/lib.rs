//! Timing and judgement core for a three-lane rhythm game.
//!
//! Charts are resolved to absolute note times once at load. A
//! [`GameSession`](state::game::GameSession) then judges presses and holds
//! against an audio-driven clock, sweeps expired notes as misses and reports
//! one judgement per note to a score sink.

pub mod error;
pub mod input;
pub mod logic;
pub mod models;
pub mod shared;
pub mod state;
pub mod system;
