//! Headless runner: plays a chart with autoplay and prints the result.

use crossbeam_channel::select;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use trilane::input::{self, autoplay::AutoplayPlan};
use trilane::logic::{self, audio::AudioManager};
use trilane::models::engine::{OffsetAccumulator, OffsetSet, load_chart};
use trilane::models::settings::Settings;
use trilane::models::stats::ScoreBoard;
use trilane::state::GameSession;
use trilane::system::bus::SystemBus;

/// Largest autoplay timing error, in seconds.
const AUTOPLAY_JITTER: f64 = 0.015;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("MAIN: Booting trilane...");

    let mut args = std::env::args().skip(1);
    let Some(chart_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: trilane <chart.json> [settings.toml]");
        return ExitCode::from(2);
    };
    let settings_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.toml"));

    match run(&chart_path, &settings_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("MAIN: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(chart_path: &Path, settings_path: &Path) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(settings_path)?;
    let chart = load_chart(chart_path)?;

    let offsets = OffsetAccumulator::new(OffsetSet::from_settings(&settings));
    let plan = AutoplayPlan::new(
        &chart.notes,
        &offsets,
        settings.calibration.custom_audio_offset,
        AUTOPLAY_JITTER,
        &mut rand::rng(),
    );

    let bus = SystemBus::new();
    let session = GameSession::new(chart, &settings);
    let logic_handle = logic::start_thread(bus.clone(), session, &settings)?;
    input::start_thread(bus.clone(), plan, AudioManager::new(&bus))?;

    let mut board = ScoreBoard::new();
    while !logic_handle.is_finished() {
        select! {
            recv(bus.score_rx) -> event => {
                if let Ok(event) = event {
                    board.apply(event.judgement, event.rainbow);
                }
            }
            recv(bus.snapshot_rx) -> snapshot => {
                if let Ok(snapshot) = snapshot {
                    log::trace!(
                        "MAIN: {:.3}s {:?}, {} notes left",
                        snapshot.track_time,
                        snapshot.mode,
                        snapshot.remaining()
                    );
                }
            }
            default(Duration::from_millis(20)) => {}
        }
    }

    let outcome = logic_handle
        .join()
        .map_err(|_| "logic thread panicked")?;
    for event in bus.score_rx.try_iter() {
        board.apply(event.judgement, event.rainbow);
    }

    let stats = &board.hit_stats;
    println!(
        "{} {}/{} notes",
        if outcome.completed { "Finished" } else { "Stopped" },
        outcome.snapshot.resolved,
        outcome.snapshot.total
    );
    println!(
        "Perfect {}  Great {}  Meh {}  Miss {}",
        stats.perfect, stats.great, stats.meh, stats.miss
    );
    println!(
        "Score {}  Accuracy {:.2}%  Max combo {}",
        board.score,
        board.accuracy(),
        board.max_combo
    );
    Ok(())
}
