//! Knife Spin entry point
//!
//! Runs a headless, seeded game with an automatic thrower and logs how far it
//! gets. Usage: `knife-spin [campaign.json]`, with `KNIFE_SPIN_SEED` and
//! `KNIFE_SPIN_MODE` (story | infinite) read from the environment.

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use knife_spin::consts::*;
#[cfg(not(target_arch = "wasm32"))]
use knife_spin::settings::GameMode;
#[cfg(not(target_arch = "wasm32"))]
use knife_spin::sim::{Campaign, GameEvent, GamePhase, GameState, TickInput, tick};
#[cfg(not(target_arch = "wasm32"))]
use knife_spin::{Settings, angular_distance, normalize_degrees};

/// Simulated frame length for the demo loop (60 fps)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this much simulated time
#[cfg(not(target_arch = "wasm32"))]
const MAX_RUN_SECONDS: f32 = 600.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Knife Spin (headless) starting...");

    let campaign = match std::env::args().nth(1) {
        Some(path) => match load_campaign(&path) {
            Ok(campaign) => campaign,
            Err(err) => {
                log::error!("Failed to load campaign {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => Campaign::builtin(),
    };

    let seed = std::env::var("KNIFE_SPIN_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    let mode = std::env::var("KNIFE_SPIN_MODE")
        .ok()
        .and_then(|s| GameMode::from_str(&s))
        .unwrap_or_default();

    let mut state = GameState::new(campaign, Settings::default(), mode, seed);
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;

    while elapsed < MAX_RUN_SECONDS {
        accumulator += FRAME_DT;
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                throw: should_throw(&state),
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in state.drain_events() {
            report(&state, &event);
        }

        if matches!(state.phase, GamePhase::GameOver | GamePhase::Cleared) {
            break;
        }
    }

    match state.mode {
        GameMode::Story => println!(
            "Reached stage {}/{} in {:.1}s ({:?})",
            (state.stage_index + 1).min(state.campaign.total_stages()),
            state.campaign.total_stages(),
            elapsed,
            state.phase
        ),
        GameMode::Infinite => println!(
            "Stuck {} knives in {:.1}s ({:?})",
            state.infinite_count, elapsed, state.phase
        ),
    }
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on the web
}

#[cfg(not(target_arch = "wasm32"))]
fn load_campaign(path: &str) -> Result<Campaign, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(Campaign::from_json(&json)?)
}

/// Throw when the predicted landing spot is clear, holding the last knife of
/// the quota for a target-point
#[cfg(not(target_arch = "wasm32"))]
fn should_throw(state: &GameState) -> bool {
    if state.phase != GamePhase::Playing || state.ready_knife.is_none() || !state.flying.is_empty() {
        return false;
    }

    let settings = &state.settings;
    let travel = state.rotation.angular_velocity() * settings.throw_flight_time;
    let landing = normalize_degrees(IMPACT_ANGLE - (state.target_angle + travel));

    let margin = settings.knife_contact_gap * 1.5;
    if state
        .knives
        .iter()
        .any(|k| angular_distance(k.angle, landing) < margin)
    {
        return false;
    }

    let last_of_quota = state.stuck_count + 1 >= state.required_knives;
    if state.mode == GameMode::Story && last_of_quota && !state.all_points_completed() {
        return state
            .points
            .iter()
            .any(|p| !p.completed && angular_distance(p.angle, landing) < settings.point_hit_gap * 0.5);
    }
    true
}

#[cfg(not(target_arch = "wasm32"))]
fn report(state: &GameState, event: &GameEvent) {
    match event {
        GameEvent::StageStarted { stage } => {
            let chapter = state
                .campaign
                .chapter_of(*stage)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            log::info!("[{}] stage {} started", chapter, stage + 1);
        }
        GameEvent::StageCleared { stage } => log::info!("stage {} cleared", stage + 1),
        GameEvent::KnifeCollision { angle, .. } => {
            log::info!("knife collision at {:.1}°", angle)
        }
        GameEvent::TargetPointCompleted { remaining, .. } => {
            log::info!("target point hit ({} left)", remaining)
        }
        other => log::debug!("{:?}", other),
    }
}
