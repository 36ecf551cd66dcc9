//! Gameplay input: action types and the autoplay source.
//!
//! Actions go out on the same bus channel a keyboard thread would use, so the
//! logic loop cannot tell autoplay from a player.

pub mod autoplay;
pub mod events;

use crate::input::autoplay::AutoplayPlan;
use crate::logic::audio::AudioManager;
use crate::state::traits::AudioClock;
use crate::system::bus::SystemBus;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Feeds `plan` into the action channel, following the audio position.
pub fn start_thread(
    bus: SystemBus,
    mut plan: AutoplayPlan,
    audio: AudioManager,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("Autoplay Thread".to_string())
        .spawn(move || {
            log::info!("INPUT: Autoplay started ({} steps)", plan.len());

            while !plan.is_empty() && !audio.reached_end() {
                if audio.is_playing() {
                    for action in plan.due(audio.current_time()) {
                        if let Err(e) = bus.action_tx.send(action) {
                            log::error!("INPUT: Failed to send action (Logic thread died?): {}", e);
                            return;
                        }
                    }
                }
                thread::sleep(Duration::from_millis(1));
            }

            log::info!("INPUT: Autoplay stopped");
        })
}
