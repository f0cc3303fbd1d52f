//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::state::{FlyingKnife, GameEvent, GamePhase, GameState, StuckKnife};
use crate::angular_distance;
use crate::consts::IMPACT_ANGLE;
use crate::settings::GameMode;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Throw the ready knife (click/tap/space)
    pub throw: bool,
    /// Pause toggle
    pub pause: bool,
    /// Skip to next stage (debug/testing)
    pub skip_stage: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Transition | GamePhase::Dying => {
                state.paused_from = state.phase;
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = state.paused_from;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Don't tick if paused or the run is over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver | GamePhase::Cleared => return,
        _ => {}
    }

    // Debug: skip to next stage
    if input.skip_stage && state.phase == GamePhase::Playing && state.mode == GameMode::Story {
        log::info!("Skipping stage {}", state.stage_index + 1);
        complete_stage(state);
        return;
    }

    state.time_ticks += 1;

    // Spin the target; a stopped controller reports zero
    let velocity = state.rotation.tick(dt, &mut state.rng);
    state.target_angle = crate::normalize_degrees(state.target_angle + velocity * dt);

    match state.phase {
        GamePhase::Playing => {
            if input.throw {
                throw_knife(state);
            }

            if let Some(timer) = state.respawn_timer.as_mut() {
                *timer -= dt;
                if *timer <= 0.0 {
                    state.respawn_timer = None;
                    state.spawn_knife();
                }
            }

            for knife in state.flying.iter_mut() {
                knife.time_left -= dt;
            }
            let (landed, still_flying): (Vec<FlyingKnife>, Vec<FlyingKnife>) = state
                .flying
                .drain(..)
                .partition(|k| k.time_left <= 0.0);
            state.flying = still_flying;

            for knife in landed {
                if state.phase != GamePhase::Playing {
                    break;
                }
                land_knife(state, knife.id);
            }
        }

        GamePhase::Dying => {
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 {
                game_over(state);
            }
        }

        GamePhase::Transition => {
            state.phase_timer -= dt;
            if state.phase_timer <= 0.0 {
                log::info!("Loading stage {}", state.stage_index + 1);
                state.reload_stage();
            }
        }

        _ => {}
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Send the ready knife toward the target and queue the next one
fn throw_knife(state: &mut GameState) {
    let Some(id) = state.ready_knife.take() else {
        return;
    };
    state.flying.push(FlyingKnife {
        id,
        time_left: state.settings.throw_flight_time,
    });
    state.respawn_timer = Some(state.settings.spawn_delay);
    state.events.push(GameEvent::KnifeThrown { id });
}

/// Resolve a knife reaching the target at the impact point
fn land_knife(state: &mut GameState, id: u32) {
    let angle = crate::normalize_degrees(IMPACT_ANGLE - state.target_angle);
    let contact_gap = state.settings.knife_contact_gap;

    if state
        .knives
        .iter()
        .any(|k| angular_distance(k.angle, angle) < contact_gap)
    {
        knife_collision(state, id, angle);
        return;
    }

    state.knives.push(StuckKnife {
        id,
        angle,
        obstacle: false,
    });
    state.events.push(GameEvent::KnifeStuck { id, angle });

    let hit_gap = state.settings.point_hit_gap;
    let mut completed = Vec::new();
    for point in state.points.iter_mut() {
        if !point.completed && angular_distance(point.angle, angle) < hit_gap {
            point.completed = true;
            completed.push(point.id);
        }
    }
    for point_id in completed {
        let remaining = state.points_remaining();
        log::debug!("Target point {} hit, {} remaining", point_id, remaining);
        state.events.push(GameEvent::TargetPointCompleted {
            id: point_id,
            remaining,
        });
    }

    match state.mode {
        GameMode::Infinite => {
            state.infinite_count += 1;
        }
        GameMode::Story => {
            state.stuck_count += 1;
            // Quota alone is not enough while points remain
            if state.stuck_count >= state.required_knives && state.all_points_completed() {
                complete_stage(state);
            }
        }
    }
}

/// Knife hit a stuck knife: freeze the target and end the run after a delay
fn knife_collision(state: &mut GameState, id: u32, angle: f32) {
    log::info!("Knife {} collided at {:.1}°", id, angle);
    state.rotation.stop();
    state.ready_knife = None;
    state.respawn_timer = None;
    state.flying.clear();
    state.phase = GamePhase::Dying;
    state.phase_timer = state.settings.game_over_delay;
    state.events.push(GameEvent::KnifeCollision { id, angle });
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    match state.mode {
        GameMode::Story => {
            state.records.record_stage(state.stage_index as u32 + 1);
        }
        GameMode::Infinite => {
            state.records.record_infinite(state.infinite_count);
        }
    }
    log::info!(
        "Game over at stage {} ({} knives)",
        state.stage_index + 1,
        state.stuck_count
    );
    state.events.push(GameEvent::GameOver);
}

/// Stage quota met: stop the target and move on
fn complete_stage(state: &mut GameState) {
    state.rotation.stop();
    state.ready_knife = None;
    state.respawn_timer = None;
    state.flying.clear();
    state.events.push(GameEvent::StageCleared {
        stage: state.stage_index,
    });
    log::info!("Stage {} cleared", state.stage_index + 1);

    state.stage_index += 1;
    if state.stage_index >= state.campaign.total_stages() {
        state.phase = GamePhase::Cleared;
        state.records.record_stage(state.campaign.total_stages() as u32);
        state.events.push(GameEvent::AllStagesCleared);
        log::info!("All {} stages cleared", state.campaign.total_stages());
        return;
    }

    state.phase = GamePhase::Transition;
    state.phase_timer = state.settings.stage_transition_delay;
}
